use alloc::{
    collections::{btree_map::Entry, BTreeMap, BTreeSet},
    sync::{Arc, Weak},
    vec::Vec,
};
use parking_lot::Mutex;
use tracing::{debug, error, info_span, warn};

use crate::{
    any::{RcAny, TypeInfo},
    binding::{Binding, Definition},
    config::ComponentConfig,
    context::{next_resolution, ResolutionContext},
    errors::{BindErrorKind, InstantiatorErrorKind, KeyPath, ResolveErrorKind},
    instance::Instance,
    jit::JitFactory,
    key::{Key, Qualifier},
    kind::Kind,
    module::Module,
    parameters::Parameters,
    scope::ScopeTag,
};

/// Resolution root: own bindings, ordered parents and JIT fallback factories.
///
/// Cloning is cheap and yields a handle to the same component.
/// A component doesn't keep its parents alive, dropping a parent while its children are in use is the caller's responsibility.
#[derive(Clone)]
pub struct Component {
    pub(crate) inner: Arc<ComponentInner>,
}

pub(crate) struct ComponentInner {
    pub(crate) scope_tags: BTreeSet<ScopeTag>,
    /// Most recently added parent first
    pub(crate) parents: Vec<Weak<ComponentInner>>,
    pub(crate) bindings: Mutex<BTreeMap<Key, Arc<Instance>>>,
    pub(crate) config: ComponentConfig,
}

impl Component {
    /// Creates a root component without scope tags, parents or JIT factories
    #[inline]
    #[must_use]
    pub fn new(module: Module) -> Self {
        Self::from_parts(BTreeSet::new(), Vec::new(), module, ComponentConfig::default())
    }

    #[inline]
    #[must_use]
    pub fn builder() -> ComponentBuilder {
        ComponentBuilder::default()
    }

    /// Creates a builder of a child component.
    ///
    /// The child has `self` as its first parent and inherits its config (JIT factories and logger).
    #[inline]
    #[must_use]
    pub fn child(&self) -> ComponentBuilder {
        ComponentBuilder {
            parents: alloc::vec![self.clone()],
            config: self.inner.config.clone(),
            ..ComponentBuilder::default()
        }
    }

    fn from_parts(scope_tags: BTreeSet<ScopeTag>, parents: Vec<Component>, module: Module, config: ComponentConfig) -> Self {
        let bindings = module
            .into_iter()
            .map(|binding| (binding.key().clone(), Arc::new(binding.into_instance())))
            .collect();

        Self {
            inner: Arc::new(ComponentInner {
                scope_tags,
                parents: parents.iter().rev().map(|parent| Arc::downgrade(&parent.inner)).collect(),
                bindings: Mutex::new(bindings),
                config,
            }),
        }
    }

    #[inline]
    pub fn scope_tags(&self) -> impl Iterator<Item = &ScopeTag> {
        self.inner.scope_tags.iter()
    }

    #[inline]
    #[must_use]
    pub fn has_scope_tag(&self, tag: &ScopeTag) -> bool {
        self.inner.scope_tags.contains(tag)
    }

    /// Alive parents in search order, most recently added first
    #[must_use]
    pub fn parents(&self) -> Vec<Component> {
        self.inner
            .parents
            .iter()
            .filter_map(Weak::upgrade)
            .map(|inner| Component { inner })
            .collect()
    }

    /// Nearest component carrying `tag`, searching `self` and then ancestors in parent order
    #[must_use]
    pub fn find_scope_owner(&self, tag: &ScopeTag) -> Option<Component> {
        if self.has_scope_tag(tag) {
            return Some(self.clone());
        }
        self.parents().into_iter().find_map(|parent| parent.find_scope_owner(tag))
    }

    /// Whether an explicit or memoized binding for `key` exists in `self` or an ancestor.
    /// Neither synthesizes nor instantiates anything.
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &Key) -> bool {
        self.lookup_explicit(key).is_some()
    }

    /// Keys of the bindings stored in this component, memoized JIT bindings included
    #[must_use]
    pub fn keys(&self) -> Vec<Key> {
        self.inner.bindings.lock().keys().cloned().collect()
    }

    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Component) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Gets a dependency from the component.
    ///
    /// The lifetime of the returned value depends on the kind of its binding:
    /// a new value for [`Kind::Factory`] and a shared one for [`Kind::Single`] and [`Kind::Multi`].
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::Unresolved`] if no binding is found or synthesized
    /// - Returns [`ResolveErrorKind::CyclicDependency`] if the dependency depends on itself
    /// - Returns [`ResolveErrorKind::Instantiator`] if the definition or one of its dependencies fails
    #[inline]
    pub fn get<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, ResolveErrorKind> {
        self.get_with(Parameters::new())
    }

    /// Gets a dependency passing positional parameters to its definition
    ///
    /// # Errors
    /// See [`Self::get`], [`ResolveErrorKind::MissingParameters`] is returned for a multi binding without parameters
    #[inline]
    pub fn get_with<T: Send + Sync + 'static>(&self, parameters: Parameters) -> Result<Arc<T>, ResolveErrorKind> {
        let key = Key::of::<T>();
        let value = self.resolve(&key, parameters)?;
        Self::downcast_required(key, value)
    }

    /// # Errors
    /// See [`Self::get`]
    #[inline]
    pub fn get_named<T: Send + Sync + 'static>(&self, qualifier: impl Into<Qualifier>) -> Result<Arc<T>, ResolveErrorKind> {
        self.get_named_with(qualifier, Parameters::new())
    }

    /// # Errors
    /// See [`Self::get_with`]
    #[inline]
    pub fn get_named_with<T: Send + Sync + 'static>(
        &self,
        qualifier: impl Into<Qualifier>,
        parameters: Parameters,
    ) -> Result<Arc<T>, ResolveErrorKind> {
        let key = Key::named::<T>(qualifier);
        let value = self.resolve(&key, parameters)?;
        Self::downcast_required(key, value)
    }

    /// Gets a nullable dependency, `None` if nothing can provide it
    ///
    /// # Errors
    /// See [`Self::get`], except for [`ResolveErrorKind::Unresolved`]
    #[inline]
    pub fn get_optional<T: Send + Sync + 'static>(&self) -> Result<Option<Arc<T>>, ResolveErrorKind> {
        let value = self.resolve(&Key::of::<T>().nullable(), Parameters::new())?;
        Self::downcast_optional(value)
    }

    /// # Errors
    /// See [`Self::get_optional`]
    #[inline]
    pub fn get_optional_named<T: Send + Sync + 'static>(
        &self,
        qualifier: impl Into<Qualifier>,
    ) -> Result<Option<Arc<T>>, ResolveErrorKind> {
        let value = self.resolve(&Key::named::<T>(qualifier).nullable(), Parameters::new())?;
        Self::downcast_optional(value)
    }

    /// Resolves `key` to a type-erased value, `None` for the null fallback of a nullable key
    ///
    /// # Errors
    /// See [`Self::get_with`]
    pub fn resolve(&self, key: &Key, parameters: Parameters) -> Result<Option<RcAny>, ResolveErrorKind> {
        let resolution = next_resolution();

        #[cfg(feature = "std")]
        if let Some(logger) = &self.inner.config.logger {
            return tracing::dispatcher::with_default(logger, || self.resolve_on_path(key, parameters, &[], resolution));
        }

        self.resolve_on_path(key, parameters, &[], resolution)
    }
}

impl Component {
    pub(crate) fn resolve_on_path(
        &self,
        key: &Key,
        parameters: Parameters,
        path: &[Key],
        resolution: usize,
    ) -> Result<Option<RcAny>, ResolveErrorKind> {
        let span = info_span!("get", %key);
        let _guard = span.enter();

        if path
            .iter()
            .any(|visited| visited.type_info == key.type_info && visited.qualifier == key.qualifier)
        {
            let mut keys = path.to_vec();
            keys.push(key.clone());
            let err = ResolveErrorKind::CyclicDependency { path: KeyPath(keys) };
            error!("{}", err);
            return Err(err);
        }

        let (owner, instance) = if let Some(found) = self.lookup_explicit(key) {
            found
        } else {
            match self.synthesize(key) {
                Ok(Some(instance)) => (self.clone(), instance),
                Ok(None) if key.is_nullable => {
                    debug!("Null fallback");
                    return Ok(None);
                }
                Ok(None) => {
                    let err = ResolveErrorKind::Unresolved { key: key.clone() };
                    error!("{}", err);
                    return Err(err);
                }
                Err(err) => {
                    error!("{}", err);
                    return Err(err);
                }
            }
        };

        let mut path = path.to_vec();
        path.push(key.clone());
        let context = ResolutionContext::new(owner, key.clone(), parameters, path, resolution);

        match instance.get(&context) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                error!("{}", err);
                Err(err)
            }
        }
    }

    /// Searches `self` and then each parent recursively.
    /// Only one component's bindings are locked at a time.
    fn lookup_explicit(&self, key: &Key) -> Option<(Component, Arc<Instance>)> {
        if let Some(instance) = self.lookup_local(key) {
            debug!("Found in bindings");
            return Some((self.clone(), instance));
        }

        for parent in &self.inner.parents {
            let Some(inner) = parent.upgrade() else {
                warn!("Parent component dropped, skipped");
                continue;
            };
            let parent = Component { inner };
            if let Some(found) = parent.lookup_explicit(key) {
                return Some(found);
            }
        }
        None
    }

    /// Exact key first, then any other binding allowed to serve it
    fn lookup_local(&self, key: &Key) -> Option<Arc<Instance>> {
        self.inner
            .bindings
            .lock()
            .range(key.clone().non_nullable()..=key.clone().nullable())
            .rev()
            .find(|(candidate, _)| key.matches(candidate))
            .map(|(_, instance)| instance.clone())
    }

    fn synthesize(&self, key: &Key) -> Result<Option<Arc<Instance>>, ResolveErrorKind> {
        let key = key.clone().non_nullable();
        for factory in self.inner.config.jit_factories.iter().rev() {
            if let Some(binding) = factory.create(&key, self)? {
                debug!(kind = ?binding.kind(), "Synthesized");
                return Ok(Some(self.memoize(binding.with_key(key))));
            }
        }
        Ok(None)
    }

    /// Stores `binding` unless a binding for its key is already stored, returns the stored one
    pub(crate) fn memoize(&self, binding: Binding) -> Arc<Instance> {
        match self.inner.bindings.lock().entry(binding.key().clone()) {
            Entry::Occupied(entry) => {
                debug!("Already memoized, synthesized binding dropped");
                entry.get().clone()
            }
            Entry::Vacant(entry) => {
                debug!("Memoized");
                entry.insert(Arc::new(binding.into_instance())).clone()
            }
        }
    }

    /// Binding resolving through an instance stored in `self`, for memoization in a descendant
    pub(crate) fn forwarding_binding(&self, instance: Arc<Instance>) -> Binding {
        let key = instance.binding().key().clone();
        let owner = Arc::downgrade(&self.inner);
        Binding::new(
            key.clone(),
            Kind::Factory,
            Definition::new(move |context| {
                let Some(inner) = owner.upgrade() else {
                    return Err(InstantiatorErrorKind::Deps(ResolveErrorKind::Unresolved { key: key.clone() }));
                };
                instance
                    .get(&context.with_component(Component { inner }))
                    .map_err(InstantiatorErrorKind::Deps)
            }),
        )
    }

    pub(crate) fn downcast_required<T: Send + Sync + 'static>(key: Key, value: Option<RcAny>) -> Result<Arc<T>, ResolveErrorKind> {
        match value {
            Some(value) => Self::downcast(value),
            None => Err(ResolveErrorKind::Unresolved { key }),
        }
    }

    pub(crate) fn downcast_optional<T: Send + Sync + 'static>(value: Option<RcAny>) -> Result<Option<Arc<T>>, ResolveErrorKind> {
        value.map(Self::downcast).transpose()
    }

    fn downcast<T: Send + Sync + 'static>(value: RcAny) -> Result<Arc<T>, ResolveErrorKind> {
        value.downcast::<T>().map_err(|value| {
            let err = ResolveErrorKind::IncorrectType {
                expected: TypeInfo::of::<T>(),
                actual: (*value).type_id(),
            };
            error!("{}", err);
            err
        })
    }
}

/// Builder of a [`Component`].
///
/// The parent search order is fixed on build: the parent added last is searched first.
#[derive(Default)]
pub struct ComponentBuilder {
    scope_tags: BTreeSet<ScopeTag>,
    parents: Vec<Component>,
    modules: Vec<Module>,
    bindings: Vec<Binding>,
    config: ComponentConfig,
}

impl ComponentBuilder {
    #[inline]
    #[must_use]
    pub fn scope(mut self, scope: impl Into<ScopeTag>) -> Self {
        self.scope_tags.insert(scope.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn parent(mut self, parent: &Component) -> Self {
        self.parents.push(parent.clone());
        self
    }

    #[inline]
    #[must_use]
    pub fn module(mut self, module: Module) -> Self {
        self.modules.push(module);
        self
    }

    /// Adds a binding, bound after the modules
    #[inline]
    #[must_use]
    pub fn binding(mut self, binding: Binding) -> Self {
        self.bindings.push(binding);
        self
    }

    /// Replaces the whole config, including JIT factories inherited by [`Component::child`]
    #[inline]
    #[must_use]
    pub fn config(mut self, config: ComponentConfig) -> Self {
        self.config = config;
        self
    }

    #[inline]
    #[must_use]
    pub fn jit_factory(mut self, factory: impl JitFactory + 'static) -> Self {
        self.config = self.config.with_jit_factory(factory);
        self
    }

    #[cfg(feature = "std")]
    #[inline]
    #[must_use]
    pub fn logger(mut self, logger: tracing::Dispatch) -> Self {
        self.config = self.config.with_logger(logger);
        self
    }

    /// Merges the modules and then the single bindings in order and creates the component
    ///
    /// # Errors
    /// Returns [`BindErrorKind::DuplicateBinding`] if the same key is bound twice without override
    pub fn build(self) -> Result<Component, BindErrorKind> {
        let mut modules = self.modules.into_iter();
        let mut module = modules.next().unwrap_or_default();
        for other in modules {
            module.include(other)?;
        }
        for binding in self.bindings {
            module.bind(binding)?;
        }

        Ok(Component::from_parts(self.scope_tags, self.parents, module, self.config))
    }
}
