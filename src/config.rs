use alloc::{sync::Arc, vec::Vec};

use crate::{interceptor::InterceptingBehavior, jit::JitFactory, key::Qualifier};

/// Options of a single registration
/// ## Fields
/// - `qualifier`:
///   Qualifier added to the key of the provided type.
/// - `is_override`:
///   If `true`, the binding replaces an existing one with the same key instead of failing.
/// - `behavior`:
///   Interceptors applied once to the binding before it's stored.
///   The binding as declared is discarded.
#[derive(Clone, Default, Debug)]
pub struct BindingConfig {
    pub qualifier: Option<Qualifier>,
    pub is_override: bool,
    pub behavior: Option<InterceptingBehavior>,
}

impl BindingConfig {
    #[inline]
    #[must_use]
    pub fn named(mut self, qualifier: impl Into<Qualifier>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn overriding(mut self) -> Self {
        self.is_override = true;
        self
    }

    #[inline]
    #[must_use]
    pub fn intercepted(mut self, behavior: InterceptingBehavior) -> Self {
        self.behavior = Some(match self.behavior {
            Some(current) => current + behavior,
            None => behavior,
        });
        self
    }
}

pub type BoxedJitFactory = Arc<dyn JitFactory>;

/// Options of a component
/// ## Fields
/// - `logger`:
///   Dispatcher used for the component's resolution logs instead of the global default one.
/// - `jit_factories`:
///   Fallback factories synthesizing bindings for unregistered keys.
///   Later factories are asked first.
#[derive(Clone, Default)]
pub struct ComponentConfig {
    #[cfg(feature = "std")]
    pub logger: Option<tracing::Dispatch>,
    pub jit_factories: Vec<BoxedJitFactory>,
}

impl ComponentConfig {
    #[cfg(feature = "std")]
    #[inline]
    #[must_use]
    pub fn with_logger(mut self, logger: tracing::Dispatch) -> Self {
        self.logger = Some(logger);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_jit_factory(mut self, factory: impl JitFactory + 'static) -> Self {
        self.jit_factories.push(Arc::new(factory));
        self
    }
}
