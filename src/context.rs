use alloc::{sync::Arc, vec::Vec};
use core::sync::atomic::{AtomicUsize, Ordering};

use crate::{
    any::RcAny,
    component::Component,
    errors::ResolveErrorKind,
    key::{Key, Qualifier},
    parameters::Parameters,
};

/// State of one binding resolution, passed to its definition.
///
/// Nested lookups made through the context share its dependency path,
/// which is how cycles are detected.
#[derive(Clone)]
pub struct ResolutionContext {
    component: Component,
    key: Key,
    parameters: Parameters,
    path: Arc<[Key]>,
    resolution: usize,
}

static NEXT_RESOLUTION: AtomicUsize = AtomicUsize::new(0);

/// Id of a new top-level resolution, shared by all of its nested lookups
#[inline]
pub(crate) fn next_resolution() -> usize {
    NEXT_RESOLUTION.fetch_add(1, Ordering::Relaxed)
}

impl ResolutionContext {
    #[inline]
    #[must_use]
    pub(crate) fn new(component: Component, key: Key, parameters: Parameters, path: Vec<Key>, resolution: usize) -> Self {
        Self {
            component,
            key,
            parameters,
            path: path.into(),
            resolution,
        }
    }

    #[inline]
    #[must_use]
    pub(crate) fn resolution(&self) -> usize {
        self.resolution
    }

    #[inline]
    #[must_use]
    pub(crate) fn with_component(&self, component: Component) -> Self {
        Self {
            component,
            ..self.clone()
        }
    }

    /// Component owning the binding under resolution
    #[inline]
    #[must_use]
    pub fn component(&self) -> &Component {
        &self.component
    }

    #[inline]
    #[must_use]
    pub fn key(&self) -> &Key {
        &self.key
    }

    #[inline]
    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    #[inline]
    #[must_use]
    pub fn parameter<T: 'static>(&self, index: usize) -> Option<&T> {
        self.parameters.get(index)
    }

    /// Keys under construction, outermost first, ending with [`Self::key`]
    #[inline]
    #[must_use]
    pub fn path(&self) -> &[Key] {
        &self.path
    }

    /// # Errors
    /// See [`Component::resolve`]
    #[inline]
    pub fn resolve(&self, key: &Key, parameters: Parameters) -> Result<Option<RcAny>, ResolveErrorKind> {
        self.component.resolve_on_path(key, parameters, &self.path, self.resolution)
    }

    /// # Errors
    /// See [`Component::get`]
    #[inline]
    pub fn get<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, ResolveErrorKind> {
        self.get_with(Parameters::new())
    }

    /// # Errors
    /// See [`Component::get_with`]
    #[inline]
    pub fn get_with<T: Send + Sync + 'static>(&self, parameters: Parameters) -> Result<Arc<T>, ResolveErrorKind> {
        let key = Key::of::<T>();
        let value = self.resolve(&key, parameters)?;
        Component::downcast_required(key, value)
    }

    /// # Errors
    /// See [`Component::get_named`]
    #[inline]
    pub fn get_named<T: Send + Sync + 'static>(&self, qualifier: impl Into<Qualifier>) -> Result<Arc<T>, ResolveErrorKind> {
        let key = Key::named::<T>(qualifier);
        let value = self.resolve(&key, Parameters::new())?;
        Component::downcast_required(key, value)
    }

    /// # Errors
    /// See [`Component::get_optional`]
    #[inline]
    pub fn get_optional<T: Send + Sync + 'static>(&self) -> Result<Option<Arc<T>>, ResolveErrorKind> {
        let value = self.resolve(&Key::of::<T>().nullable(), Parameters::new())?;
        Component::downcast_optional(value)
    }
}
