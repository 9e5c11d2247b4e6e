use alloc::borrow::Cow;
use core::fmt::{self, Display, Formatter};

pub trait Scope {
    #[must_use]
    fn name(&self) -> &'static str;

    #[inline]
    #[must_use]
    fn tag(&self) -> ScopeTag {
        ScopeTag::new(self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum DefaultScope {
    Runtime,
    App,
    Session,
    Request,
    Action,
    Step,
}

impl Scope for DefaultScope {
    #[inline]
    fn name(&self) -> &'static str {
        match self {
            DefaultScope::Runtime => "runtime",
            DefaultScope::App => "app",
            DefaultScope::Session => "session",
            DefaultScope::Request => "request",
            DefaultScope::Action => "action",
            DefaultScope::Step => "step",
        }
    }
}

impl DefaultScope {
    #[inline]
    #[must_use]
    pub fn all() -> [Self; 6] {
        use DefaultScope::{Action, App, Request, Runtime, Session, Step};

        [Runtime, App, Session, Request, Action, Step]
    }
}

/// Marker identifying which components a scoped binding may live in
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeTag(Cow<'static, str>);

impl ScopeTag {
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<DefaultScope> for ScopeTag {
    fn from(scope: DefaultScope) -> Self {
        scope.tag()
    }
}

impl From<&'static str> for ScopeTag {
    fn from(name: &'static str) -> Self {
        Self::new(name)
    }
}

impl Display for ScopeTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
