use diwire::{
    BindingDescriptor, Component, Constructor, DefaultScope, DescriptorJitFactory, Inject, InstantiateErrorKind, Module, Param, ResolveErrorKind,
};
use std::{
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Barrier,
    },
    thread,
};

const THREADS: usize = 8;

struct Engine;

struct Tenant(u64);

struct Left;

struct Right;

struct LeftGate;

struct RightGate;

fn race<T, F>(component: &Component, get: F) -> Vec<Arc<T>>
where
    T: Send + Sync + 'static,
    F: Fn(&Component) -> Result<Arc<T>, ResolveErrorKind> + Send + Sync + Copy + 'static,
{
    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let component = component.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                get(&component).unwrap()
            })
        })
        .collect();

    handles.into_iter().map(|handle| handle.join().unwrap()).collect()
}

#[test]
fn test_single_created_once() {
    let created = Arc::new(AtomicUsize::new(0));
    let component = Component::new(
        Module::builder()
            .single({
                let created = created.clone();
                move || {
                    created.fetch_add(1, Ordering::SeqCst);
                    thread::yield_now();
                    Ok(Engine)
                }
            })
            .build()
            .unwrap(),
    );

    let engines = race(&component, |component| component.get::<Engine>());

    assert_eq!(created.load(Ordering::SeqCst), 1);
    assert!(engines.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
}

#[test]
fn test_jit_memoized_once() {
    let created = Arc::new(AtomicUsize::new(0));
    let jit = DescriptorJitFactory::new().with(
        BindingDescriptor::builder::<Engine>().scope(DefaultScope::App).build().unwrap(),
        Constructor::new({
            let created = created.clone();
            move |_| {
                created.fetch_add(1, Ordering::SeqCst);
                Ok(Engine)
            }
        }),
    );
    let app = Component::builder().scope(DefaultScope::App).jit_factory(jit).build().unwrap();
    let request = app.child().scope(DefaultScope::Request).build().unwrap();

    let from_app = race(&app, |component| component.get::<Engine>());
    let from_request = race(&request, |component| component.get::<Engine>());

    assert_eq!(created.load(Ordering::SeqCst), 1);
    assert!(from_app
        .iter()
        .chain(from_request.iter())
        .all(|engine| Arc::ptr_eq(engine, &from_app[0])));
}

#[test]
fn test_multi_per_parameters() {
    let created = Arc::new(AtomicUsize::new(0));
    let component = Component::new(
        Module::builder()
            .multi({
                let created = created.clone();
                move |Param(id): Param<u64, 0>| {
                    created.fetch_add(1, Ordering::SeqCst);
                    Ok(Tenant(id))
                }
            })
            .build()
            .unwrap(),
    );

    let first = race(&component, |component| component.get_with::<Tenant>(diwire::parameters![1u64]));
    let second = race(&component, |component| component.get_with::<Tenant>(diwire::parameters![2u64]));

    assert_eq!(created.load(Ordering::SeqCst), 2);
    assert!(first.iter().all(|tenant| Arc::ptr_eq(tenant, &first[0]) && tenant.0 == 1));
    assert!(second.iter().all(|tenant| Arc::ptr_eq(tenant, &second[0]) && tenant.0 == 2));
}

/// Blocks the first caller until the other thread's first caller arrives
fn gate<T: Send + Sync + 'static>(
    barrier: &Arc<Barrier>,
    value: fn() -> T,
) -> impl Fn() -> Result<T, InstantiateErrorKind> + Clone + Send + Sync + 'static {
    let barrier = barrier.clone();
    let passed = Arc::new(AtomicBool::new(false));
    move || {
        if !passed.swap(true, Ordering::SeqCst) {
            barrier.wait();
        }
        Ok(value())
    }
}

#[test]
fn test_cycle_across_threads() {
    let barrier = Arc::new(Barrier::new(2));
    let component = Component::new(
        Module::builder()
            .factory(gate(&barrier, || LeftGate))
            .factory(gate(&barrier, || RightGate))
            .single(|Inject(_): Inject<LeftGate>, Inject(_): Inject<Right>| Ok(Left))
            .single(|Inject(_): Inject<RightGate>, Inject(_): Inject<Left>| Ok(Right))
            .build()
            .unwrap(),
    );

    let left = thread::spawn({
        let component = component.clone();
        move || component.get::<Left>().err()
    });
    let right = thread::spawn({
        let component = component.clone();
        move || component.get::<Right>().err()
    });

    for err in [left.join().unwrap(), right.join().unwrap()] {
        assert!(matches!(
            err.as_ref().map(ResolveErrorKind::root_cause),
            Some(ResolveErrorKind::CyclicDependency { .. })
        ));
    }
}
