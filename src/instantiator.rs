use crate::{dependency_resolver::DependencyResolver, errors::InstantiateErrorKind};

/// Provider function of a binding: takes resolved dependencies and creates the provided value.
///
/// Implemented for closures and functions with up to 16 arguments,
/// each argument being a [`DependencyResolver`].
pub trait Instantiator<Deps>: Clone + Send + Sync + 'static
where
    Deps: DependencyResolver,
{
    type Provides: Send + Sync + 'static;
    type Error: Into<InstantiateErrorKind>;

    /// # Errors
    /// Returns the error of the provider function
    fn instantiate(&mut self, dependencies: Deps) -> Result<Self::Provides, Self::Error>;
}

/// Instantiator returning a clone of `value` every time
#[inline]
#[must_use]
pub const fn instance<T>(value: T) -> impl Instantiator<(), Provides = T, Error = InstantiateErrorKind>
where
    T: Clone + Send + Sync + 'static,
{
    Cloned(value)
}

#[derive(Clone)]
struct Cloned<T>(T);

impl<T> Instantiator<()> for Cloned<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Provides = T;
    type Error = InstantiateErrorKind;

    #[inline]
    fn instantiate(&mut self, (): ()) -> Result<Self::Provides, Self::Error> {
        Ok(self.0.clone())
    }
}

macro_rules! impl_instantiator {
    (
        [$($ty:ident),*]
    ) => {
        #[allow(non_snake_case)]
        impl<F, Response, Err, $($ty,)*> Instantiator<($($ty,)*)> for F
        where
            F: FnMut($($ty,)*) -> Result<Response, Err> + Clone + Send + Sync + 'static,
            Response: Send + Sync + 'static,
            Err: Into<InstantiateErrorKind>,
            $( $ty: DependencyResolver, )*
        {
            type Provides = Response;
            type Error = Err;

            #[inline]
            fn instantiate(&mut self, ($($ty,)*): ($($ty,)*)) -> Result<Self::Provides, Self::Error> {
                self($($ty,)*)
            }
        }
    };
}

all_the_tuples!(impl_instantiator);
