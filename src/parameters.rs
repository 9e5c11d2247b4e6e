use alloc::{sync::Arc, vec::Vec};
use core::{
    any::{Any, TypeId},
    fmt::{self, Debug, Formatter},
    hash::{Hash, Hasher},
};
use seahash::SeaHasher;

use crate::any::TypeInfo;

/// Caller-supplied value passed positionally to a definition
pub trait ParameterValue: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn type_info(&self) -> TypeInfo;

    fn hash_value(&self, state: &mut dyn Hasher);
}

impl<T> ParameterValue for T
where
    T: Hash + Send + Sync + 'static,
{
    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn type_info(&self) -> TypeInfo {
        TypeInfo::of::<T>()
    }

    fn hash_value(&self, mut state: &mut dyn Hasher) {
        TypeId::of::<T>().hash(&mut state);
        self.hash(&mut state);
    }
}

/// Ordered, positionally indexed list of caller-supplied values.
///
/// Cheap to clone, values are shared.
#[derive(Clone, Default)]
pub struct Parameters {
    values: Vec<Arc<dyn ParameterValue>>,
}

impl Parameters {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { values: Vec::new() }
    }

    #[inline]
    #[must_use]
    pub fn with<T: Hash + Send + Sync + 'static>(mut self, value: T) -> Self {
        self.push(value);
        self
    }

    #[inline]
    pub fn push<T: Hash + Send + Sync + 'static>(&mut self, value: T) {
        self.values.push(Arc::new(value));
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn get_raw(&self, index: usize) -> Option<&dyn ParameterValue> {
        self.values.get(index).map(|value| &**value)
    }

    /// Returns the value at `index` if present and of type `T`
    #[inline]
    #[must_use]
    pub fn get<T: 'static>(&self, index: usize) -> Option<&T> {
        self.get_raw(index).and_then(|value| value.as_any().downcast_ref())
    }

    /// Structural hash of the ordered values, including their types.
    ///
    /// Equal parameter lists always produce equal hashes.
    /// Collisions are possible and are treated as equality by multi-instance bindings.
    #[must_use]
    pub fn hash_key(&self) -> u64 {
        let mut hasher = SeaHasher::new();
        hasher.write_usize(self.values.len());
        for value in &self.values {
            value.hash_value(&mut hasher);
        }
        hasher.finish()
    }
}

impl Debug for Parameters {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.values.iter().map(|value| value.type_info().name))
            .finish()
    }
}

/// Builds [`Parameters`] from a list of values.
///
/// ```rust
/// use diwire::parameters;
///
/// let parameters = parameters![1u32, "name"];
/// assert_eq!(parameters.len(), 2);
/// assert_eq!(parameters.get::<u32>(0), Some(&1));
/// ```
#[macro_export]
macro_rules! parameters {
    () => {
        $crate::Parameters::new()
    };
    ($($value:expr),+ $(,)?) => {
        $crate::Parameters::new()$(.with($value))+
    };
}
