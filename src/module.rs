use alloc::{collections::BTreeMap, vec::Vec};
use tracing::{debug, error};

use crate::{
    binding::Binding,
    config::BindingConfig,
    dependency_resolver::DependencyResolver,
    errors::{BindErrorKind, InstantiateErrorKind},
    instantiator::Instantiator,
    interceptor::InterceptingBehavior,
    key::Key,
    kind::Kind,
};

/// Ordered registry of bindings, at most one per key
#[derive(Clone, Default, Debug)]
pub struct Module {
    bindings: Vec<Binding>,
    index: BTreeMap<Key, usize>,
}

impl Module {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bindings: Vec::new(),
            index: BTreeMap::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn builder() -> ModuleBuilder {
        ModuleBuilder::new()
    }

    /// Registers a binding.
    ///
    /// An existing binding for the same key is replaced only if the new one is marked as override,
    /// the replacement keeps the position of the replaced binding.
    ///
    /// # Errors
    /// Returns [`BindErrorKind::DuplicateBinding`] on an implicit override
    pub fn bind(&mut self, binding: Binding) -> Result<(), BindErrorKind> {
        use alloc::collections::btree_map::Entry::{Occupied, Vacant};

        match self.index.entry(binding.key().clone()) {
            Vacant(entry) => {
                debug!(key = %binding.key(), kind = ?binding.kind(), "Bound");
                entry.insert(self.bindings.len());
                self.bindings.push(binding);
                Ok(())
            }
            Occupied(entry) if binding.is_override() => {
                debug!(key = %binding.key(), kind = ?binding.kind(), "Overridden");
                self.bindings[*entry.get()] = binding;
                Ok(())
            }
            Occupied(entry) => {
                let err = BindErrorKind::DuplicateBinding { key: entry.key().clone() };
                error!("{}", err);
                Err(err)
            }
        }
    }

    /// Registers the binding produced by `behavior`, the passed binding itself is discarded
    ///
    /// # Errors
    /// Returns [`BindErrorKind::DuplicateBinding`] on an implicit override
    #[inline]
    pub fn bind_with(&mut self, binding: Binding, behavior: &InterceptingBehavior) -> Result<(), BindErrorKind> {
        self.bind(behavior.apply(binding))
    }

    /// Binds every binding of `other` in its order
    ///
    /// # Errors
    /// Returns [`BindErrorKind::DuplicateBinding`] on the first implicit override
    pub fn include(&mut self, other: Module) -> Result<(), BindErrorKind> {
        for binding in other.bindings {
            self.bind(binding)?;
        }
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn get(&self, key: &Key) -> Option<&Binding> {
        self.index.get(key).map(|index| &self.bindings[*index])
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, key: &Key) -> bool {
        self.index.contains_key(key)
    }

    /// Bindings in registration order
    #[inline]
    pub fn bindings(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl IntoIterator for Module {
    type Item = Binding;
    type IntoIter = alloc::vec::IntoIter<Binding>;

    fn into_iter(self) -> Self::IntoIter {
        self.bindings.into_iter()
    }
}

struct Declaration {
    binding: Binding,
    behavior: Option<InterceptingBehavior>,
}

/// Declarative [`Module`] builder.
///
/// Declarations are collected as is, the override policy is checked by [`ModuleBuilder::build`].
#[derive(Default)]
pub struct ModuleBuilder {
    declarations: Vec<Declaration>,
}

impl ModuleBuilder {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn factory<Inst, Deps>(self, instantiator: Inst) -> Self
    where
        Inst: Instantiator<Deps, Error = InstantiateErrorKind>,
        Deps: DependencyResolver,
    {
        self.provide(Kind::Factory, instantiator)
    }

    #[inline]
    #[must_use]
    pub fn single<Inst, Deps>(self, instantiator: Inst) -> Self
    where
        Inst: Instantiator<Deps, Error = InstantiateErrorKind>,
        Deps: DependencyResolver,
    {
        self.provide(Kind::Single, instantiator)
    }

    #[inline]
    #[must_use]
    pub fn multi<Inst, Deps>(self, instantiator: Inst) -> Self
    where
        Inst: Instantiator<Deps, Error = InstantiateErrorKind>,
        Deps: DependencyResolver,
    {
        self.provide(Kind::Multi, instantiator)
    }

    #[inline]
    #[must_use]
    pub fn provide<Inst, Deps>(self, kind: Kind, instantiator: Inst) -> Self
    where
        Inst: Instantiator<Deps, Error = InstantiateErrorKind>,
        Deps: DependencyResolver,
    {
        self.bind(Binding::from_instantiator(kind, instantiator))
    }

    #[inline]
    #[must_use]
    pub fn provide_with_config<Inst, Deps>(mut self, kind: Kind, instantiator: Inst, config: BindingConfig) -> Self
    where
        Inst: Instantiator<Deps, Error = InstantiateErrorKind>,
        Deps: DependencyResolver,
    {
        let BindingConfig {
            qualifier,
            is_override,
            behavior,
        } = config;

        let binding = Binding::from_instantiator(kind, instantiator)
            .with_qualifier(qualifier)
            .with_override(is_override);
        self.declarations.push(Declaration { binding, behavior });
        self
    }

    #[inline]
    #[must_use]
    pub fn bind(mut self, binding: Binding) -> Self {
        self.declarations.push(Declaration { binding, behavior: None });
        self
    }

    #[inline]
    #[must_use]
    pub fn bind_with(mut self, binding: Binding, behavior: InterceptingBehavior) -> Self {
        self.declarations.push(Declaration {
            binding,
            behavior: Some(behavior),
        });
        self
    }

    /// Applies the declarations in order
    ///
    /// # Errors
    /// Returns [`BindErrorKind::DuplicateBinding`] on the first implicit override
    pub fn build(self) -> Result<Module, BindErrorKind> {
        let mut module = Module::new();
        for Declaration { binding, behavior } in self.declarations {
            match behavior {
                Some(behavior) => module.bind_with(binding, &behavior)?,
                None => module.bind(binding)?,
            }
        }
        Ok(module)
    }
}
