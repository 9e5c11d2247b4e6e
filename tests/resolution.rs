use diwire::{
    instance, module, qualifier, Binding, BindingConfig, Component, ComponentConfig, DefaultScope, Inject, InjectNamed, InjectOptional,
    InterceptingBehavior, Key, Kind, Module, Param, QualifierName as _, ResolveErrorKind,
};
use parking_lot::Mutex;
use std::{io, sync::Arc};

qualifier!(Replica = "replica");

struct Config {
    url: &'static str,
}

struct Pool {
    url: &'static str,
}

#[allow(dead_code)]
struct Repository {
    primary: Arc<Pool>,
    replica: Arc<Pool>,
    metrics: Option<Arc<Metrics>>,
}

struct Metrics;

struct Connection {
    id: u32,
}

fn app_module() -> Module {
    module! {
        single(|| Ok(Config { url: "postgres://primary" })),
        single(|Inject(config): Inject<Config>| Ok(Pool { url: config.url })),
        factory(instance(5u8), config = BindingConfig::default().named("pool_size")),
        single(|| Ok(Pool { url: "postgres://replica" }), config = BindingConfig::default().named(Replica::qualifier())),
    }
    .unwrap()
}

fn request_module() -> Module {
    module! {
        factory(|Inject(primary): Inject<Pool>, InjectNamed(replica, _): InjectNamed<Pool, Replica>, InjectOptional(metrics): InjectOptional<Metrics>| {
            Ok(Repository { primary, replica, metrics })
        }),
        multi(|Param(id): Param<u32, 0>| Ok(Connection { id })),
    }
    .unwrap()
}

#[test]
fn test_app_and_request_components() {
    let app = Component::builder().scope(DefaultScope::App).module(app_module()).build().unwrap();
    let request = app
        .child()
        .scope(DefaultScope::Request)
        .module(request_module())
        .build()
        .unwrap();

    let repository_1 = request.get::<Repository>().unwrap();
    let repository_2 = request.get::<Repository>().unwrap();

    assert!(!Arc::ptr_eq(&repository_1, &repository_2));
    assert!(Arc::ptr_eq(&repository_1.primary, &repository_2.primary));
    assert_eq!(repository_1.primary.url, "postgres://primary");
    assert_eq!(repository_1.replica.url, "postgres://replica");
    assert!(repository_1.metrics.is_none());

    let connection = request.get_with::<Connection>(diwire::parameters![3u32]).unwrap();
    assert_eq!(connection.id, 3);
    assert!(Arc::ptr_eq(
        &connection,
        &request.get_with::<Connection>(diwire::parameters![3u32]).unwrap()
    ));
    assert!(matches!(
        request.get::<Connection>(),
        Err(ResolveErrorKind::MissingParameters { key }) if key == Key::of::<Connection>()
    ));

    assert!(matches!(app.get::<Repository>(), Err(ResolveErrorKind::Unresolved { .. })));
    assert!(app.get_optional::<Repository>().unwrap().is_none());
}

#[test]
fn test_override_and_interceptors() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let logging = |name: &'static str| {
        let log = log.clone();
        InterceptingBehavior::new(move |binding| {
            log.lock().push(name);
            binding
        })
    };
    let to_factory = InterceptingBehavior::new(|binding: Binding| binding.with_kind(Kind::Factory));

    let module = Module::builder()
        .provide_with_config(Kind::Single, || Ok(Metrics), BindingConfig::default())
        .provide_with_config(
            Kind::Single,
            || Ok(Metrics),
            BindingConfig::default()
                .overriding()
                .intercepted(logging("B") + logging("A"))
                .intercepted(to_factory),
        )
        .build()
        .unwrap();
    let component = Component::new(module);

    assert_eq!(*log.lock(), vec!["B", "A"]);
    assert!(!Arc::ptr_eq(
        &component.get::<Metrics>().unwrap(),
        &component.get::<Metrics>().unwrap()
    ));
}

#[test]
fn test_duplicate_binding_across_sources() {
    let result = Component::builder()
        .module(app_module())
        .binding(Binding::instance(Pool { url: "other" }))
        .build();

    assert!(result.is_err());
}

#[test]
fn test_resolve_untyped() {
    let component = Component::new(app_module());

    let pool = component.resolve(&Key::of::<Pool>(), diwire::Parameters::new()).unwrap().unwrap();
    assert_eq!(pool.downcast::<Pool>().unwrap().url, "postgres://primary");

    assert!(component
        .resolve(&Key::of::<Metrics>().nullable(), diwire::Parameters::new())
        .unwrap()
        .is_none());
    assert!(component.get_optional_named::<Pool>(Replica::qualifier()).unwrap().is_some());
    assert_eq!(*component.get_named::<u8>("pool_size").unwrap(), 5);
}

#[derive(Clone, Default)]
struct Buffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_explicit_logger() {
    let buffer = Buffer::default();
    let logger = tracing::Dispatch::new(
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer({
                let buffer = buffer.clone();
                move || buffer.clone()
            })
            .finish(),
    );

    let app = Component::builder()
        .config(ComponentConfig::default().with_logger(logger))
        .module(app_module())
        .build()
        .unwrap();
    let request = app.child().build().unwrap();

    let _ = request.get::<Pool>().unwrap();
    let _ = request.get::<Metrics>().err().unwrap();

    let output = String::from_utf8(buffer.0.lock().clone()).unwrap();
    assert!(output.contains("Cached"));
    assert!(output.contains("No binding found for Metrics"));
}
