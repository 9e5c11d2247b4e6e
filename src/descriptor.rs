use alloc::{borrow::Cow, format, vec::Vec};

use crate::{any::TypeInfo, errors::DescriptorErrorKind, key::Qualifier, scope::ScopeTag};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Public,
    Internal,
}

/// Validated constructor argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgDescriptor {
    /// Supplied by the caller, `index` is the position in the caller's parameters
    Parameter { name: Cow<'static, str>, index: usize },
    /// Resolved from the component
    Dependency {
        name: Cow<'static, str>,
        type_info: TypeInfo,
        qualifier: Option<Qualifier>,
        is_nullable: bool,
    },
}

impl ArgDescriptor {
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            ArgDescriptor::Parameter { name, .. } | ArgDescriptor::Dependency { name, .. } => name,
        }
    }
}

/// Validated metadata describing how to construct a value of a type
#[derive(Debug, Clone)]
pub struct BindingDescriptor {
    target: TypeInfo,
    generated_factory_name: Cow<'static, str>,
    visibility: Visibility,
    is_singleton_object: bool,
    qualifier: Option<Qualifier>,
    scope_name: Option<ScopeTag>,
    constructor_args: Vec<ArgDescriptor>,
}

impl BindingDescriptor {
    #[inline]
    #[must_use]
    pub fn builder<T: ?Sized + 'static>() -> DescriptorBuilder {
        DescriptorBuilder::new(TypeInfo::of::<T>())
    }

    #[inline]
    #[must_use]
    pub const fn target(&self) -> TypeInfo {
        self.target
    }

    #[inline]
    #[must_use]
    pub fn target_type_name(&self) -> &'static str {
        self.target.name
    }

    #[inline]
    #[must_use]
    pub fn generated_factory_name(&self) -> &str {
        &self.generated_factory_name
    }

    #[inline]
    #[must_use]
    pub const fn visibility(&self) -> Visibility {
        self.visibility
    }

    #[inline]
    #[must_use]
    pub const fn is_singleton_object(&self) -> bool {
        self.is_singleton_object
    }

    #[inline]
    #[must_use]
    pub const fn qualifier(&self) -> Option<&Qualifier> {
        self.qualifier.as_ref()
    }

    #[inline]
    #[must_use]
    pub const fn scope_name(&self) -> Option<&ScopeTag> {
        self.scope_name.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn constructor_args(&self) -> &[ArgDescriptor] {
        &self.constructor_args
    }
}

/// Marker found on a type declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclarationMarker {
    Scope(ScopeTag),
    Named(Qualifier),
}

/// Marker found on a constructor argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgMarker {
    Parameter,
    Named(Qualifier),
}

/// Constructor argument as declared, before validation
#[derive(Debug, Clone)]
pub struct ArgDeclaration {
    name: Cow<'static, str>,
    type_info: TypeInfo,
    is_nullable: bool,
    markers: Vec<ArgMarker>,
}

impl ArgDeclaration {
    #[inline]
    #[must_use]
    pub fn new<T: ?Sized + 'static>(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            type_info: TypeInfo::of::<T>(),
            is_nullable: false,
            markers: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.is_nullable = true;
        self
    }

    #[inline]
    #[must_use]
    pub fn marker(mut self, marker: ArgMarker) -> Self {
        self.markers.push(marker);
        self
    }

    #[inline]
    #[must_use]
    pub fn parameter(self) -> Self {
        self.marker(ArgMarker::Parameter)
    }

    #[inline]
    #[must_use]
    pub fn named(self, qualifier: impl Into<Qualifier>) -> Self {
        self.marker(ArgMarker::Named(qualifier.into()))
    }
}

pub struct DescriptorBuilder {
    target: TypeInfo,
    generated_factory_name: Option<Cow<'static, str>>,
    visibility: Visibility,
    is_singleton_object: bool,
    markers: Vec<DeclarationMarker>,
    args: Vec<ArgDeclaration>,
}

impl DescriptorBuilder {
    #[inline]
    #[must_use]
    pub fn new(target: TypeInfo) -> Self {
        Self {
            target,
            generated_factory_name: None,
            visibility: Visibility::Public,
            is_singleton_object: false,
            markers: Vec::new(),
            args: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn generated_factory_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.generated_factory_name = Some(name.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    #[inline]
    #[must_use]
    pub fn singleton_object(mut self) -> Self {
        self.is_singleton_object = true;
        self
    }

    #[inline]
    #[must_use]
    pub fn marker(mut self, marker: DeclarationMarker) -> Self {
        self.markers.push(marker);
        self
    }

    #[inline]
    #[must_use]
    pub fn scope(self, scope: impl Into<ScopeTag>) -> Self {
        self.marker(DeclarationMarker::Scope(scope.into()))
    }

    #[inline]
    #[must_use]
    pub fn named(self, qualifier: impl Into<Qualifier>) -> Self {
        self.marker(DeclarationMarker::Named(qualifier.into()))
    }

    #[inline]
    #[must_use]
    pub fn arg(mut self, arg: ArgDeclaration) -> Self {
        self.args.push(arg);
        self
    }

    /// Validates the markers and builds the descriptor.
    ///
    /// Parameters are numbered in declaration order, skipping dependencies.
    ///
    /// # Errors
    /// - Returns [`DescriptorErrorKind::AmbiguousAnnotation`] if the declaration or an argument has more than one marker of a kind
    /// - Returns [`DescriptorErrorKind::ParameterVsDependencyConflict`] if an argument is marked both as a parameter and as a named dependency
    pub fn build(self) -> Result<BindingDescriptor, DescriptorErrorKind> {
        let mut scope_name = None;
        let mut qualifier = None;
        for marker in self.markers {
            match marker {
                DeclarationMarker::Scope(scope) => set_once(&mut scope_name, scope, || self.target.name.into(), "scope")?,
                DeclarationMarker::Named(name) => set_once(&mut qualifier, name, || self.target.name.into(), "name")?,
            }
        }

        let mut constructor_args = Vec::with_capacity(self.args.len());
        let mut parameters_count = 0;
        for ArgDeclaration {
            name,
            type_info,
            is_nullable,
            markers,
        } in self.args
        {
            let declaration = || Cow::Owned(format!("argument `{name}` of {}", self.target.name));

            let mut is_parameter = None;
            let mut arg_qualifier = None;
            for marker in markers {
                match marker {
                    ArgMarker::Parameter => set_once(&mut is_parameter, (), declaration, "parameter")?,
                    ArgMarker::Named(qualifier) => set_once(&mut arg_qualifier, qualifier, declaration, "name")?,
                }
            }

            match (is_parameter, arg_qualifier) {
                (Some(()), Some(_)) => {
                    return Err(DescriptorErrorKind::ParameterVsDependencyConflict {
                        target: self.target.name,
                        argument: name,
                    });
                }
                (Some(()), None) => {
                    constructor_args.push(ArgDescriptor::Parameter {
                        name,
                        index: parameters_count,
                    });
                    parameters_count += 1;
                }
                (None, qualifier) => constructor_args.push(ArgDescriptor::Dependency {
                    name,
                    type_info,
                    qualifier,
                    is_nullable,
                }),
            }
        }

        let generated_factory_name = self
            .generated_factory_name
            .unwrap_or_else(|| Cow::Owned(format!("{}Factory", self.target.short_name())));

        Ok(BindingDescriptor {
            target: self.target,
            generated_factory_name,
            visibility: self.visibility,
            is_singleton_object: self.is_singleton_object,
            qualifier,
            scope_name,
            constructor_args,
        })
    }
}

fn set_once<T>(
    slot: &mut Option<T>,
    value: T,
    declaration: impl FnOnce() -> Cow<'static, str>,
    marker: &'static str,
) -> Result<(), DescriptorErrorKind> {
    if slot.is_some() {
        return Err(DescriptorErrorKind::AmbiguousAnnotation {
            declaration: declaration(),
            marker,
        });
    }
    *slot = Some(value);
    Ok(())
}
