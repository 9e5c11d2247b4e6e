use alloc::{boxed::Box, sync::Arc};
use core::fmt::{self, Debug, Formatter};
use tracing::debug;

use crate::{
    any::{RcAny, TypeInfo},
    context::ResolutionContext,
    dependency_resolver::DependencyResolver,
    errors::{DefinitionErrorKind, InstantiatorErrorKind, ResolveErrorKind},
    instance::Instance,
    instantiator::Instantiator,
    key::{Key, Qualifier},
    kind::Kind,
};

type DefinitionFn = dyn Fn(&ResolutionContext) -> Result<RcAny, DefinitionErrorKind> + Send + Sync;

/// Function producing a binding's value from a resolution context
#[derive(Clone)]
pub struct Definition(Arc<DefinitionFn>);

impl Definition {
    #[inline]
    #[must_use]
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&ResolutionContext) -> Result<RcAny, DefinitionErrorKind> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    #[must_use]
    pub fn from_instantiator<Inst, Deps>(instantiator: Inst) -> Self
    where
        Inst: Instantiator<Deps>,
        Deps: DependencyResolver,
    {
        Self::new(move |context| {
            let dependencies = match Deps::resolve(context) {
                Ok(dependencies) => dependencies,
                Err(err) => return Err(InstantiatorErrorKind::Deps(err.into())),
            };
            let provided = match instantiator.clone().instantiate(dependencies) {
                Ok(provided) => provided,
                Err(err) => return Err(InstantiatorErrorKind::Factory(err.into())),
            };

            debug!("Instantiated");

            Ok(Arc::new(provided) as RcAny)
        })
    }

    /// Calls the definition
    ///
    /// # Errors
    /// Returns the error of a dependency or of the factory itself
    #[inline]
    pub fn call(&self, context: &ResolutionContext) -> Result<RcAny, DefinitionErrorKind> {
        (self.0)(context)
    }
}

/// A provider registration for a [`Key`].
///
/// Immutable: every `with_*` method returns a new binding.
#[derive(Clone)]
pub struct Binding {
    key: Key,
    kind: Kind,
    definition: Definition,
    is_override: bool,
}

impl Binding {
    #[inline]
    #[must_use]
    pub const fn new(key: Key, kind: Kind, definition: Definition) -> Self {
        Self {
            key,
            kind,
            definition,
            is_override: false,
        }
    }

    /// Creates a binding keyed by the type the instantiator provides
    #[inline]
    #[must_use]
    pub fn from_instantiator<Inst, Deps>(kind: Kind, instantiator: Inst) -> Self
    where
        Inst: Instantiator<Deps>,
        Deps: DependencyResolver,
    {
        Self::new(Key::of::<Inst::Provides>(), kind, Definition::from_instantiator(instantiator))
    }

    /// Creates a single binding for a value created outside the container
    #[must_use]
    pub fn instance<T: Send + Sync + 'static>(value: T) -> Self {
        let value: RcAny = Arc::new(value);
        Self::new(Key::of::<T>(), Kind::Single, Definition::new(move |_| Ok(value.clone())))
    }

    #[inline]
    #[must_use]
    pub const fn key(&self) -> &Key {
        &self.key
    }

    #[inline]
    #[must_use]
    pub const fn kind(&self) -> Kind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub const fn definition(&self) -> &Definition {
        &self.definition
    }

    #[inline]
    #[must_use]
    pub const fn is_override(&self) -> bool {
        self.is_override
    }

    #[inline]
    #[must_use]
    pub fn with_key(mut self, key: Key) -> Self {
        self.key = key;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_qualifier(mut self, qualifier: Option<Qualifier>) -> Self {
        self.key.qualifier = qualifier;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_kind(mut self, kind: Kind) -> Self {
        self.kind = kind;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_override(mut self, is_override: bool) -> Self {
        self.is_override = is_override;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_definition(mut self, definition: Definition) -> Self {
        self.definition = definition;
        self
    }

    #[inline]
    #[must_use]
    pub fn map_definition(self, f: impl FnOnce(Definition) -> Definition) -> Self {
        let definition = f(self.definition.clone());
        self.with_definition(definition)
    }

    /// Post-processes every value the binding provides.
    ///
    /// The decorated value must be of type `T`, otherwise the definition fails with [`ResolveErrorKind::IncorrectType`].
    #[must_use]
    pub fn decorate<T, F>(self, f: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(Arc<T>) -> T + Send + Sync + 'static,
    {
        self.map_definition(move |inner| {
            Definition::new(move |context| {
                let value = inner.call(context)?;
                match value.downcast::<T>() {
                    Ok(value) => Ok(Arc::new(f(value)) as RcAny),
                    Err(value) => Err(InstantiatorErrorKind::Deps(ResolveErrorKind::IncorrectType {
                        expected: TypeInfo::of::<T>(),
                        actual: (*value).type_id(),
                    })),
                }
            })
        })
    }

    #[inline]
    #[must_use]
    pub(crate) fn into_instance(self) -> Instance {
        self.kind.instance(self)
    }
}

impl Debug for Binding {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("is_override", &self.is_override)
            .finish_non_exhaustive()
    }
}

pub(crate) fn definition_error(err: DefinitionErrorKind) -> ResolveErrorKind {
    match err {
        InstantiatorErrorKind::Deps(err) => ResolveErrorKind::Instantiator(InstantiatorErrorKind::Deps(Box::new(err))),
        InstantiatorErrorKind::Factory(err) => ResolveErrorKind::Instantiator(InstantiatorErrorKind::Factory(err)),
    }
}
