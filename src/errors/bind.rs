use crate::key::Key;

#[derive(thiserror::Error, Debug)]
pub enum BindErrorKind {
    #[error("Implicit override of {key}. Mark the binding as override to replace the existing one")]
    DuplicateBinding { key: Key },
}
