#![cfg_attr(not(test), no_std)]

extern crate alloc;

#[macro_use]
pub(crate) mod macros;
#[macro_use]
pub(crate) mod parameters;

pub(crate) mod any;
pub(crate) mod binding;
pub(crate) mod component;
pub(crate) mod config;
pub(crate) mod context;
pub(crate) mod dependency_resolver;
pub(crate) mod descriptor;
pub(crate) mod errors;
pub(crate) mod inject;
pub(crate) mod instance;
pub(crate) mod instantiator;
pub(crate) mod interceptor;
pub(crate) mod jit;
pub(crate) mod key;
pub(crate) mod kind;
pub(crate) mod module;
pub(crate) mod scope;

pub use any::{RcAny, TypeInfo};
pub use binding::{Binding, Definition};
pub use component::{Component, ComponentBuilder};
pub use config::{BindingConfig, BoxedJitFactory, ComponentConfig};
pub use context::ResolutionContext;
pub use dependency_resolver::DependencyResolver;
pub use descriptor::{
    ArgDeclaration, ArgDescriptor, ArgMarker, BindingDescriptor, DeclarationMarker, DescriptorBuilder, Visibility,
};
pub use errors::{
    BindErrorKind, DefinitionErrorKind, DescriptorErrorKind, InstantiateErrorKind, InstantiatorErrorKind, KeyPath, ResolveErrorKind,
};
pub use inject::{Inject, InjectNamed, InjectOptional, Param, Params};
pub use instantiator::{instance, Instantiator};
pub use interceptor::InterceptingBehavior;
pub use jit::{Constructor, ConstructorArgs, DescriptorJitFactory, JitFactory};
pub use key::{Key, Qualifier, QualifierName};
pub use kind::Kind;
pub use module::{Module, ModuleBuilder};
pub use parameters::{ParameterValue, Parameters};
pub use scope::{DefaultScope, Scope, ScopeTag};
