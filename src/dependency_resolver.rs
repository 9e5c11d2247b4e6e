use crate::{context::ResolutionContext, errors::ResolveErrorKind};

/// Argument of an [`Instantiator`](crate::Instantiator), resolved from the context of the binding under resolution
pub trait DependencyResolver: Sized {
    type Error: Into<ResolveErrorKind>;

    /// # Errors
    /// Returns an error if the dependency can't be resolved
    fn resolve(context: &ResolutionContext) -> Result<Self, Self::Error>;
}

impl DependencyResolver for ResolutionContext {
    type Error = ResolveErrorKind;

    #[inline]
    fn resolve(context: &ResolutionContext) -> Result<Self, Self::Error> {
        Ok(context.clone())
    }
}

macro_rules! impl_dependency_resolver {
    (
        [$($ty:ident),*]
    ) => {
        #[allow(non_snake_case)]
        impl<$($ty,)*> DependencyResolver for ($($ty,)*)
        where
            $( $ty: DependencyResolver, )*
        {
            type Error = ResolveErrorKind;

            #[inline]
            #[allow(unused_variables)]
            fn resolve(context: &ResolutionContext) -> Result<Self, Self::Error> {
                Ok(($($ty::resolve(context).map_err(Into::into)?,)*))
            }
        }
    };
}

all_the_tuples!(impl_dependency_resolver);
