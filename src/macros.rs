macro_rules! all_the_tuples {
    ($name:ident) => {
        $name!([]);
        $name!([T1]);
        $name!([T1, T2]);
        $name!([T1, T2, T3]);
        $name!([T1, T2, T3, T4]);
        $name!([T1, T2, T3, T4, T5]);
        $name!([T1, T2, T3, T4, T5, T6]);
        $name!([T1, T2, T3, T4, T5, T6, T7]);
        $name!([T1, T2, T3, T4, T5, T6, T7, T8]);
        $name!([T1, T2, T3, T4, T5, T6, T7, T8, T9]);
        $name!([T1, T2, T3, T4, T5, T6, T7, T8, T9, T10]);
        $name!([T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11]);
        $name!([T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11, T12]);
        $name!([T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11, T12, T13]);
        $name!([T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11, T12, T13, T14]);
        $name!([T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11, T12, T13, T14, T15]);
        $name!([T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11, T12, T13, T14, T15, T16]);
    };
}

/// Declares a unit type usable as a compile-time qualifier name
///
/// ```
/// use diwire::{qualifier, Qualifier, QualifierName};
///
/// qualifier!(pub Replica = "replica");
///
/// assert_eq!(Replica::NAME, "replica");
/// assert!(matches!(Replica::qualifier(), Qualifier::Name(name) if name == "replica"));
/// ```
#[macro_export]
macro_rules! qualifier {
    ($(#[$meta:meta])* $vis:vis $name:ident = $value:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        $vis struct $name;

        impl $crate::QualifierName for $name {
            const NAME: &'static str = $value;
        }
    };
}

/// Builds a [`Module`](crate::Module) from a list of registrations,
/// evaluating to `Result<Module, BindErrorKind>`
///
/// ```
/// use diwire::{module, BindingConfig, Inject};
/// use std::sync::Arc;
///
/// struct Config(u16);
/// struct Server(Arc<Config>);
///
/// let module = module! {
///     single(|| Ok(Config(8080))),
///     factory(|Inject(config): Inject<Config>| Ok(Server(config)), config = BindingConfig::default().named("http")),
/// }
/// .unwrap();
///
/// assert_eq!(module.len(), 2);
/// ```
#[macro_export]
macro_rules! module {
    (@entry $builder:expr, $kind:ident($instantiator:expr, config = $config:expr $(,)?)) => {
        $builder.provide_with_config($crate::module!(@kind $kind), $instantiator, $config)
    };
    (@entry $builder:expr, $kind:ident($instantiator:expr $(,)?)) => {
        $builder.provide($crate::module!(@kind $kind), $instantiator)
    };
    (@kind single) => {
        $crate::Kind::Single
    };
    (@kind factory) => {
        $crate::Kind::Factory
    };
    (@kind multi) => {
        $crate::Kind::Multi
    };
    ($($kind:ident($($args:tt)*)),* $(,)?) => {{
        let builder = $crate::Module::builder();
        $( let builder = $crate::module!(@entry builder, $kind($($args)*)); )*
        builder.build()
    }};
}
