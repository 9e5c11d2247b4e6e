mod bind;
mod descriptor;
mod instantiate;
mod instantiator;
mod resolve;

pub use bind::BindErrorKind;
pub use descriptor::DescriptorErrorKind;
pub use instantiate::InstantiateErrorKind;
pub use instantiator::InstantiatorErrorKind;
pub use resolve::{KeyPath, ResolveErrorKind};

/// Error produced by a binding's definition
pub type DefinitionErrorKind = InstantiatorErrorKind<ResolveErrorKind, InstantiateErrorKind>;
