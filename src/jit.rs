use alloc::{collections::BTreeMap, sync::Arc, vec::Vec};
use anyhow::anyhow;
use core::any::type_name;
use tracing::debug;

use crate::{
    any::{RcAny, TypeInfo},
    binding::{definition_error, Binding, Definition},
    component::Component,
    context::ResolutionContext,
    descriptor::{ArgDescriptor, BindingDescriptor},
    errors::{DefinitionErrorKind, InstantiateErrorKind, InstantiatorErrorKind, ResolveErrorKind},
    instance::ValueCell,
    key::Key,
    kind::Kind,
    parameters::Parameters,
};

/// Fallback strategy synthesizing a binding for a key no component has a binding for
pub trait JitFactory: Send + Sync {
    /// Returns `Ok(None)` if the factory can't synthesize a binding for `key`.
    ///
    /// `key` is never nullable, the null fallback is applied by the component.
    ///
    /// # Errors
    /// Returns an error if the factory knows the key but the binding can't be created in `component`
    fn create(&self, key: &Key, component: &Component) -> Result<Option<Binding>, ResolveErrorKind>;
}

impl<F> JitFactory for F
where
    F: Fn(&Key, &Component) -> Result<Option<Binding>, ResolveErrorKind> + Send + Sync,
{
    #[inline]
    fn create(&self, key: &Key, component: &Component) -> Result<Option<Binding>, ResolveErrorKind> {
        self(key, component)
    }
}

enum Slot {
    Dependency(Option<RcAny>),
    Parameter(usize),
}

/// Constructor arguments in declaration order
pub struct ConstructorArgs {
    slots: Vec<Slot>,
    parameters: Parameters,
}

impl ConstructorArgs {
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// # Errors
    /// Returns an error if the argument at `position` isn't a resolved dependency of type `T`
    pub fn dependency<T: Send + Sync + 'static>(&self, position: usize) -> Result<Arc<T>, InstantiateErrorKind> {
        self.optional_dependency(position)?
            .ok_or_else(|| anyhow!("Argument {position} ({}) resolved to null", type_name::<T>()).into())
    }

    /// # Errors
    /// Returns an error if the argument at `position` isn't a dependency or has a different type
    pub fn optional_dependency<T: Send + Sync + 'static>(&self, position: usize) -> Result<Option<Arc<T>>, InstantiateErrorKind> {
        match self.slots.get(position) {
            Some(Slot::Dependency(Some(value))) => value
                .clone()
                .downcast::<T>()
                .map(Some)
                .map_err(|_| anyhow!("Argument {position} isn't {}", type_name::<T>()).into()),
            Some(Slot::Dependency(None)) => Ok(None),
            Some(Slot::Parameter(_)) => Err(anyhow!("Argument {position} is a parameter, not a dependency").into()),
            None => Err(anyhow!("No argument at {position}").into()),
        }
    }

    /// # Errors
    /// Returns an error if the argument at `position` isn't a parameter of type `T`
    pub fn parameter<T: Clone + 'static>(&self, position: usize) -> Result<T, InstantiateErrorKind> {
        match self.slots.get(position) {
            Some(Slot::Parameter(index)) => self
                .parameters
                .get::<T>(*index)
                .cloned()
                .ok_or_else(|| anyhow!("Parameter {index} isn't {}", type_name::<T>()).into()),
            Some(Slot::Dependency(_)) => Err(anyhow!("Argument {position} is a dependency, not a parameter").into()),
            None => Err(anyhow!("No argument at {position}").into()),
        }
    }
}

type ConstructorFn = dyn Fn(&ConstructorArgs) -> Result<RcAny, InstantiateErrorKind> + Send + Sync;

/// Builds the described type from its arguments, the code a generated factory would contain
#[derive(Clone)]
pub struct Constructor(Arc<ConstructorFn>);

impl Constructor {
    #[inline]
    #[must_use]
    pub fn new<T, F>(f: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&ConstructorArgs) -> Result<T, InstantiateErrorKind> + Send + Sync + 'static,
    {
        Self(Arc::new(move |args| f(args).map(|value| Arc::new(value) as RcAny)))
    }

    #[inline]
    fn call(&self, args: &ConstructorArgs) -> Result<RcAny, InstantiateErrorKind> {
        (self.0)(args)
    }
}

struct CatalogEntry {
    descriptor: BindingDescriptor,
    constructor: Constructor,
    /// Value of a singleton object, shared by every component the factory serves
    shared: ValueCell,
}

/// [`JitFactory`] backed by a catalog of descriptors
#[derive(Clone, Default)]
pub struct DescriptorJitFactory {
    catalog: BTreeMap<TypeInfo, Arc<CatalogEntry>>,
}

impl DescriptorJitFactory {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a descriptor, replacing a previous one for the same target
    #[inline]
    #[must_use]
    pub fn with(mut self, descriptor: BindingDescriptor, constructor: Constructor) -> Self {
        self.register(descriptor, constructor);
        self
    }

    #[inline]
    pub fn register(&mut self, descriptor: BindingDescriptor, constructor: Constructor) {
        self.catalog
            .insert(descriptor.target(), Arc::new(CatalogEntry {
                descriptor,
                constructor,
                shared: ValueCell::default(),
            }));
    }

    #[inline]
    #[must_use]
    pub fn descriptor(&self, target: &TypeInfo) -> Option<&BindingDescriptor> {
        self.catalog.get(target).map(|entry| &entry.descriptor)
    }
}

impl JitFactory for DescriptorJitFactory {
    fn create(&self, key: &Key, component: &Component) -> Result<Option<Binding>, ResolveErrorKind> {
        let Some(entry) = self.catalog.get(&key.type_info) else {
            return Ok(None);
        };
        let descriptor = &entry.descriptor;
        if descriptor.qualifier() != key.qualifier.as_ref() {
            return Ok(None);
        }

        if descriptor.is_singleton_object() {
            debug!(generated_factory = descriptor.generated_factory_name(), "Singleton object synthesized");
            return Ok(Some(Binding::new(key.clone(), Kind::Single, singleton_definition(entry.clone(), key.clone()))));
        }

        let definition = descriptor_definition(entry.clone(), key.clone());

        let Some(scope) = descriptor.scope_name() else {
            debug!(generated_factory = descriptor.generated_factory_name(), "Factory synthesized");
            return Ok(Some(Binding::new(key.clone(), Kind::Factory, definition)));
        };

        if component.has_scope_tag(scope) {
            debug!(generated_factory = descriptor.generated_factory_name(), %scope, "Scoped single synthesized");
            return Ok(Some(Binding::new(key.clone(), Kind::Single, definition)));
        }

        match component.find_scope_owner(scope) {
            Some(owner) => {
                debug!(generated_factory = descriptor.generated_factory_name(), %scope, "Scoped single synthesized in ancestor");
                let instance = owner.memoize(Binding::new(key.clone(), Kind::Single, definition));
                Ok(Some(owner.forwarding_binding(instance)))
            }
            None => Err(ResolveErrorKind::ScopeMismatch {
                key: key.clone(),
                scope: scope.clone(),
            }),
        }
    }
}

fn singleton_definition(entry: Arc<CatalogEntry>, key: Key) -> Definition {
    Definition::new(move |context| {
        entry
            .shared
            .get_or_create(context, || construct(&entry, &key, context).map_err(definition_error))
            .map_err(InstantiatorErrorKind::Deps)
    })
}

fn descriptor_definition(entry: Arc<CatalogEntry>, key: Key) -> Definition {
    Definition::new(move |context| construct(&entry, &key, context))
}

fn construct(entry: &CatalogEntry, key: &Key, context: &ResolutionContext) -> Result<RcAny, DefinitionErrorKind> {
    let args = entry.descriptor.constructor_args();
    let mut slots = Vec::with_capacity(args.len());
    for arg in args {
        match arg {
            ArgDescriptor::Parameter { name, index } => {
                if context.parameters().get_raw(*index).is_none() {
                    return Err(InstantiatorErrorKind::Deps(ResolveErrorKind::MissingParameter {
                        key: key.clone(),
                        name: name.clone(),
                        index: *index,
                    }));
                }
                slots.push(Slot::Parameter(*index));
            }
            ArgDescriptor::Dependency {
                type_info,
                qualifier,
                is_nullable,
                ..
            } => {
                let dependency_key = Key::new(*type_info, qualifier.clone(), *is_nullable);
                let value = context
                    .resolve(&dependency_key, Parameters::new())
                    .map_err(InstantiatorErrorKind::Deps)?;
                slots.push(Slot::Dependency(value));
            }
        }
    }

    let args = ConstructorArgs {
        slots,
        parameters: context.parameters().clone(),
    };
    entry.constructor.call(&args).map_err(InstantiatorErrorKind::Factory)
}

#[cfg(test)]
mod tests {
    use super::{Constructor, DescriptorJitFactory, JitFactory};
    use crate::{
        descriptor::{ArgDeclaration, BindingDescriptor},
        errors::ResolveErrorKind,
        key::Key,
        kind::Kind,
        scope::DefaultScope,
        Component,
    };

    use alloc::sync::Arc;
    use tracing_test::traced_test;

    struct Database;
    struct Repository(Arc<Database>, u32);

    fn factory() -> DescriptorJitFactory {
        DescriptorJitFactory::new()
            .with(
                BindingDescriptor::builder::<Database>().singleton_object().build().unwrap(),
                Constructor::new(|_| Ok(Database)),
            )
            .with(
                BindingDescriptor::builder::<Repository>()
                    .scope(DefaultScope::Request)
                    .arg(ArgDeclaration::new::<Database>("database"))
                    .arg(ArgDeclaration::new::<u32>("user_id").parameter())
                    .build()
                    .unwrap(),
                Constructor::new(|args| Ok(Repository(args.dependency(0)?, args.parameter(1)?))),
            )
    }

    #[test]
    #[traced_test]
    fn test_unknown_key() {
        let component = Component::builder().build().unwrap();

        assert!(factory().create(&Key::of::<u8>(), &component).unwrap().is_none());
        assert!(factory().create(&Key::named::<Database>("other"), &component).unwrap().is_none());
    }

    #[test]
    #[traced_test]
    fn test_singleton_object_kind() {
        let component = Component::builder().build().unwrap();
        let binding = factory().create(&Key::of::<Database>(), &component).unwrap().unwrap();

        assert_eq!(binding.kind(), Kind::Single);
        assert_eq!(binding.key(), &Key::of::<Database>());
    }

    #[test]
    #[traced_test]
    fn test_scoped_kind() {
        let request = Component::builder().scope(DefaultScope::Request).build().unwrap();
        let binding = factory().create(&Key::of::<Repository>(), &request).unwrap().unwrap();

        assert_eq!(binding.kind(), Kind::Single);
    }

    #[test]
    #[traced_test]
    fn test_scope_mismatch() {
        let app = Component::builder().scope(DefaultScope::App).build().unwrap();
        let result = factory().create(&Key::of::<Repository>(), &app);

        assert!(matches!(result, Err(ResolveErrorKind::ScopeMismatch { .. })));
    }

    #[test]
    #[traced_test]
    fn test_descriptor_lookup() {
        let factory = factory();

        assert!(factory.descriptor(&crate::TypeInfo::of::<Repository>()).is_some());
        assert!(factory.descriptor(&crate::TypeInfo::of::<u8>()).is_none());
    }

    #[test]
    #[traced_test]
    fn test_singleton_object_shared_by_factory_clones() {
        let factory = factory();
        let first = Component::builder().jit_factory(factory.clone()).build().unwrap();
        let second = Component::builder().jit_factory(factory).build().unwrap();

        assert!(Arc::ptr_eq(&second.get::<Database>().unwrap(), &first.get::<Database>().unwrap()));
    }
}
