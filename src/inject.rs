use alloc::sync::Arc;
use core::{any::type_name, marker::PhantomData};
use tracing::{debug_span, error};

use crate::{
    context::ResolutionContext, dependency_resolver::DependencyResolver, errors::ResolveErrorKind, key::QualifierName,
    parameters::Parameters,
};

/// Required dependency of type `Dep`
pub struct Inject<Dep>(pub Arc<Dep>);

impl<Dep: Send + Sync + 'static> DependencyResolver for Inject<Dep> {
    type Error = ResolveErrorKind;

    fn resolve(context: &ResolutionContext) -> Result<Self, Self::Error> {
        let span = debug_span!("resolve", dependency = type_name::<Dep>());
        let _guard = span.enter();

        context.get().map(Self)
    }
}

/// Nullable dependency of type `Dep`, `None` if nothing can provide it
pub struct InjectOptional<Dep>(pub Option<Arc<Dep>>);

impl<Dep: Send + Sync + 'static> DependencyResolver for InjectOptional<Dep> {
    type Error = ResolveErrorKind;

    fn resolve(context: &ResolutionContext) -> Result<Self, Self::Error> {
        let span = debug_span!("resolve", dependency = type_name::<Dep>(), nullable = true);
        let _guard = span.enter();

        context.get_optional().map(Self)
    }
}

/// Dependency of type `Dep` bound under the qualifier named by `Q`
///
/// ```
/// use diwire::{qualifier, InjectNamed};
///
/// qualifier!(Primary = "primary");
///
/// fn instantiator(InjectNamed(url, _): InjectNamed<String, Primary>) {}
/// ```
pub struct InjectNamed<Dep, Q>(pub Arc<Dep>, pub PhantomData<Q>);

impl<Dep: Send + Sync + 'static, Q: QualifierName> DependencyResolver for InjectNamed<Dep, Q> {
    type Error = ResolveErrorKind;

    fn resolve(context: &ResolutionContext) -> Result<Self, Self::Error> {
        let span = debug_span!("resolve", dependency = type_name::<Dep>(), qualifier = Q::NAME);
        let _guard = span.enter();

        context.get_named(Q::qualifier()).map(|dependency| Self(dependency, PhantomData))
    }
}

/// Positional parameter at `INDEX` passed to the resolution of the binding
pub struct Param<T, const INDEX: usize>(pub T);

impl<T: Clone + 'static, const INDEX: usize> DependencyResolver for Param<T, INDEX> {
    type Error = ResolveErrorKind;

    fn resolve(context: &ResolutionContext) -> Result<Self, Self::Error> {
        if let Some(value) = context.parameter::<T>(INDEX) {
            return Ok(Self(value.clone()));
        }

        let err = ResolveErrorKind::MissingParameter {
            key: context.key().clone(),
            name: type_name::<T>().into(),
            index: INDEX,
        };
        error!("{}", err);
        Err(err)
    }
}

/// All parameters passed to the resolution of the binding
pub struct Params(pub Parameters);

impl DependencyResolver for Params {
    type Error = ResolveErrorKind;

    #[inline]
    fn resolve(context: &ResolutionContext) -> Result<Self, Self::Error> {
        Ok(Self(context.parameters().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::{InjectNamed, InjectOptional, Param, Params};
    use crate::{
        config::BindingConfig, context::ResolutionContext, errors::ResolveErrorKind, instance, key::QualifierName as _, kind::Kind,
        module::Module, Component,
    };

    use alloc::{
        string::{String, ToString as _},
        sync::Arc,
    };
    use tracing_test::traced_test;

    qualifier!(Primary = "primary");

    struct Url(String);
    struct Client {
        url: Arc<Url>,
        fallback: Option<Arc<Url>>,
    }

    #[test]
    #[traced_test]
    fn test_named_and_optional() {
        let component = Component::new(
            Module::builder()
                .provide_with_config(
                    Kind::Single,
                    || Ok(Url("primary".to_string())),
                    BindingConfig::default().named(Primary::qualifier()),
                )
                .factory(|InjectNamed(url, _): InjectNamed<Url, Primary>, InjectOptional(fallback): InjectOptional<Url>| {
                    Ok(Client { url, fallback })
                })
                .build()
                .unwrap(),
        );

        let client = component.get::<Client>().unwrap();
        assert_eq!(client.url.0, "primary");
        assert!(client.fallback.is_none());
    }

    #[test]
    #[traced_test]
    fn test_missing_param() {
        struct Page(u32, String);

        let component = Component::new(
            Module::builder()
                .factory(|Param(number): Param<u32, 0>, Param(title): Param<String, 1>| Ok(Page(number, title)))
                .build()
                .unwrap(),
        );

        let page = component.get_with::<Page>(parameters![2u32, "title".to_string()]).unwrap();
        assert_eq!((page.0, page.1.as_str()), (2, "title"));

        assert!(matches!(
            component.get_with::<Page>(parameters![2u32]).map_err(|err| matches!(
                err.root_cause(),
                ResolveErrorKind::MissingParameter { index: 1, .. }
            )),
            Err(true)
        ));
    }

    #[test]
    #[traced_test]
    fn test_context_and_params() {
        struct Summary(usize, usize);

        let component = Component::new(
            Module::builder()
                .single(instance(1u8))
                .factory(|context: ResolutionContext, Params(params): Params| Ok(Summary(context.path().len(), params.len())))
                .build()
                .unwrap(),
        );

        let summary = component.get_with::<Summary>(parameters![1u8, 2u8]).unwrap();
        assert_eq!((summary.0, summary.1), (1, 2));
    }
}
