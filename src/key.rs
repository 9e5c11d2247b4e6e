use alloc::borrow::Cow;
use core::fmt::{self, Display, Formatter};

use crate::any::TypeInfo;

/// Disambiguates several bindings of the same type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Qualifier {
    Name(Cow<'static, str>),
    Type(TypeInfo),
}

impl Qualifier {
    #[inline]
    #[must_use]
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self::Name(name.into())
    }

    #[inline]
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::Type(TypeInfo::of::<T>())
    }
}

impl From<&'static str> for Qualifier {
    fn from(name: &'static str) -> Self {
        Self::Name(Cow::Borrowed(name))
    }
}

impl From<alloc::string::String> for Qualifier {
    fn from(name: alloc::string::String) -> Self {
        Self::Name(Cow::Owned(name))
    }
}

impl Display for Qualifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Qualifier::Name(name) => f.write_str(name),
            Qualifier::Type(type_info) => write!(f, "{type_info}"),
        }
    }
}

/// Type-level name qualifier, see [`crate::qualifier!`].
pub trait QualifierName: 'static {
    const NAME: &'static str;

    #[inline]
    #[must_use]
    fn qualifier() -> Qualifier {
        Qualifier::Name(Cow::Borrowed(Self::NAME))
    }
}

/// Identity of a requested dependency.
///
/// Two keys are equal iff type, qualifier and nullability are equal.
/// A nullable request can be served by a non-nullable binding of the same type and qualifier, never the reverse.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key {
    pub type_info: TypeInfo,
    pub qualifier: Option<Qualifier>,
    pub is_nullable: bool,
}

impl Key {
    #[inline]
    #[must_use]
    pub const fn new(type_info: TypeInfo, qualifier: Option<Qualifier>, is_nullable: bool) -> Self {
        Self {
            type_info,
            qualifier,
            is_nullable,
        }
    }

    #[inline]
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::new(TypeInfo::of::<T>(), None, false)
    }

    #[inline]
    #[must_use]
    pub fn named<T: ?Sized + 'static>(qualifier: impl Into<Qualifier>) -> Self {
        Self::new(TypeInfo::of::<T>(), Some(qualifier.into()), false)
    }

    #[inline]
    #[must_use]
    pub fn with_qualifier(mut self, qualifier: Option<Qualifier>) -> Self {
        self.qualifier = qualifier;
        self
    }

    #[inline]
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.is_nullable = true;
        self
    }

    #[inline]
    #[must_use]
    pub fn non_nullable(mut self) -> Self {
        self.is_nullable = false;
        self
    }

    /// Whether a binding registered under `candidate` may serve a request for `self`
    #[must_use]
    pub fn matches(&self, candidate: &Key) -> bool {
        if self.type_info != candidate.type_info || self.qualifier != candidate.qualifier {
            return false;
        }
        self.is_nullable || !candidate.is_nullable
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_info)?;
        if let Some(qualifier) = &self.qualifier {
            write!(f, "@{qualifier}")?;
        }
        if self.is_nullable {
            f.write_str("?")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Key, Qualifier};

    use alloc::{format, string::String};

    struct Database;

    #[test]
    fn test_equality() {
        assert_eq!(Key::of::<Database>(), Key::of::<Database>());
        assert_ne!(Key::of::<Database>(), Key::named::<Database>("replica"));
        assert_ne!(Key::of::<Database>(), Key::of::<Database>().nullable());
        assert_ne!(Key::named::<Database>("replica"), Key::named::<Database>("primary"));
        assert_ne!(Key::named::<Database>(Qualifier::of::<String>()), Key::named::<Database>("String"));
    }

    #[test]
    fn test_nullable_request_matches_non_nullable_binding() {
        let binding = Key::of::<Database>();
        let request = Key::of::<Database>().nullable();

        assert!(request.matches(&binding));
        assert!(!binding.matches(&request));
        assert!(request.matches(&request));
    }

    #[test]
    fn test_qualifier_is_exact() {
        let binding = Key::named::<Database>("primary");

        assert!(!Key::of::<Database>().matches(&binding));
        assert!(!Key::of::<Database>().nullable().matches(&binding));
        assert!(Key::named::<Database>("primary").nullable().matches(&binding));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Key::named::<Database>("primary").nullable()), "Database@primary?");
    }
}
