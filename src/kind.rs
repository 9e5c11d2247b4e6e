use alloc::collections::BTreeMap;
use parking_lot::Mutex;

use crate::{
    binding::Binding,
    instance::{Instance, ValueCell},
};

/// Lifecycle strategy of a binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// New value on every resolution
    Factory,
    /// At most one value per owning component
    Single,
    /// One value per distinct set of parameters
    Multi,
}

impl Kind {
    #[must_use]
    pub(crate) fn instance(self, binding: Binding) -> Instance {
        match self {
            Kind::Factory => Instance::Factory(binding),
            Kind::Single => Instance::Single(binding, ValueCell::default()),
            Kind::Multi => Instance::Multi(binding, Mutex::new(BTreeMap::new())),
        }
    }
}
