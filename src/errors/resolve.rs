use alloc::{borrow::Cow, boxed::Box, vec::Vec};
use core::fmt::{self, Display, Formatter};

use super::{instantiate::InstantiateErrorKind, instantiator::InstantiatorErrorKind};
use crate::{any::TypeInfo, key::Key, scope::ScopeTag};

#[derive(thiserror::Error, Debug)]
pub enum ResolveErrorKind {
    #[error("No binding found for {key}")]
    Unresolved { key: Key },
    #[error("Missing parameter `{name}` at index {index} for {key}")]
    MissingParameter {
        key: Key,
        name: Cow<'static, str>,
        index: usize,
    },
    #[error("Multi-instance binding {key} requires parameters")]
    MissingParameters { key: Key },
    #[error("Scope `{scope}` of {key} isn't declared by the component or any of its ancestors")]
    ScopeMismatch { key: Key, scope: ScopeTag },
    #[error("Cyclic dependency detected: {path}")]
    CyclicDependency { path: KeyPath },
    #[error("Incorrect provided type. Actual: {actual:?}, expected: {expected}")]
    IncorrectType { expected: TypeInfo, actual: core::any::TypeId },
    #[error(transparent)]
    Instantiator(InstantiatorErrorKind<Box<ResolveErrorKind>, InstantiateErrorKind>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPath(pub Vec<Key>);

impl Display for KeyPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (index, key) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{key}")?;
        }
        Ok(())
    }
}

impl ResolveErrorKind {
    /// Strips [`ResolveErrorKind::Instantiator`] dependency wrappers down to the original failure
    #[must_use]
    pub fn root_cause(&self) -> &ResolveErrorKind {
        match self {
            ResolveErrorKind::Instantiator(InstantiatorErrorKind::Deps(err)) => err.root_cause(),
            err => err,
        }
    }
}
