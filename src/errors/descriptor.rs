use alloc::borrow::Cow;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum DescriptorErrorKind {
    #[error("More than one {marker} marker on {declaration}")]
    AmbiguousAnnotation {
        declaration: Cow<'static, str>,
        marker: &'static str,
    },
    #[error("Argument `{argument}` of {target} is marked both as a parameter and as a named dependency")]
    ParameterVsDependencyConflict {
        target: &'static str,
        argument: Cow<'static, str>,
    },
}
