//! 注册和解析测试

use super::{counting_factory, Counter};
use crate::{ContainerOptions, ServiceContainer};
use infrastructure_common::{BoxError, DependencyError, InstanceStrategy, Service};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

trait Clock: Service {
    fn now(&self) -> u64;
}

struct FixedClock(u64);

impl Service for FixedClock {}

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        self.0
    }
}

#[test]
fn test_shared_is_constructed_once() {
    let container = ServiceContainer::new();
    let calls = Arc::new(AtomicUsize::new(0));
    container.register_shared(counting_factory(&calls));

    let first = container.get::<Counter>().unwrap();
    let second = container.get::<Counter>().unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_always_new_invokes_factory_every_time() {
    let container = ServiceContainer::new();
    let calls = Arc::new(AtomicUsize::new(0));
    container.register_always_new(counting_factory(&calls));

    let first = container.get::<Counter>().unwrap();
    let second = container.get::<Counter>().unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!((first.serial, second.serial), (1, 2));
}

#[test]
fn test_trait_object_token() {
    let container = ServiceContainer::new();
    container.register_shared::<dyn Clock, _>(|_| Ok(Arc::new(FixedClock(42))));

    let clock = container.get::<dyn Clock>().unwrap();
    assert_eq!(clock.now(), 42);
    // 具体类型和 trait 对象是不同的服务标识
    assert!(!container.is_registered::<FixedClock>());
}

#[test]
fn test_not_registered() {
    let container = ServiceContainer::new();

    let err = container.get::<Counter>().err().unwrap();
    assert!(matches!(err, DependencyError::ServiceNotRegistered { .. }));

    let err = container.get_scoped::<dyn Clock>("req-1").err().unwrap();
    assert!(err.is_not_registered());
    assert!(container.try_get::<Counter>().is_none());
}

#[test]
fn test_per_scope_requires_scoped_accessor() {
    let container = ServiceContainer::new();
    let calls = Arc::new(AtomicUsize::new(0));
    container.register_per_scope(counting_factory(&calls));

    match container.get::<Counter>() {
        Err(DependencyError::WrongAccessor { strategy, .. }) => {
            assert_eq!(strategy, InstanceStrategy::PerScope);
        }
        other => panic!("意外的结果: {other:?}"),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_factory_failure_is_not_cached() {
    let container = ServiceContainer::new();
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    container.register_shared::<Counter, _>(move |_| {
        let attempt = counter.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt == 1 {
            Err("数据库暂不可用".into())
        } else {
            Ok(Arc::new(Counter { serial: attempt }))
        }
    });

    let err = container.get::<Counter>().err().unwrap();
    match &err {
        DependencyError::FactoryFailed { type_name, source } => {
            assert_eq!(type_name, "Counter");
            assert_eq!(source.to_string(), "数据库暂不可用");
        }
        other => panic!("意外的错误: {other}"),
    }

    let counter = container.get::<Counter>().unwrap();
    assert_eq!(counter.serial, 2);
    let again = container.get::<Counter>().unwrap();
    assert!(Arc::ptr_eq(&counter, &again));
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[test]
fn test_factory_resolves_dependencies() {
    struct Report {
        clock: Arc<dyn Clock>,
    }
    impl Service for Report {}

    let container = ServiceContainer::new();
    container.register_shared::<dyn Clock, _>(|_| Ok(Arc::new(FixedClock(7))));
    container.register_always_new::<Report, _>(|c| {
        Ok(Arc::new(Report {
            clock: c.get::<dyn Clock>()?,
        }))
    });

    let a = container.get::<Report>().unwrap();
    let b = container.get::<Report>().unwrap();
    assert!(Arc::ptr_eq(&a.clock, &b.clock));
    assert_eq!(a.clock.now(), 7);
}

#[test]
fn test_reregistration_replaces_descriptor() {
    let container = ServiceContainer::new();
    container.register_shared::<dyn Clock, _>(|_| Ok(Arc::new(FixedClock(1))));
    assert_eq!(container.get::<dyn Clock>().unwrap().now(), 1);

    container.register_always_new::<dyn Clock, _>(|_| Ok(Arc::new(FixedClock(2))));
    assert_eq!(container.get::<dyn Clock>().unwrap().now(), 2);
    assert_eq!(
        container.strategy_of::<dyn Clock>(),
        Some(InstanceStrategy::AlwaysNew)
    );
    assert_eq!(container.registered_services().len(), 1);
}

#[test]
fn test_register_instance() {
    let container = ServiceContainer::new();
    let clock: Arc<dyn Clock> = Arc::new(FixedClock(99));
    container.register_instance(Arc::clone(&clock));

    let resolved = container.get::<dyn Clock>().unwrap();
    assert!(Arc::ptr_eq(&clock, &resolved));

    let info = &container.registered_services()[0];
    assert_eq!(info.strategy, InstanceStrategy::Shared);
    assert!(info.instance_created);
}

#[test]
fn test_self_dependency_is_circular() {
    let container = ServiceContainer::new();
    container.register_shared::<Counter, _>(|c| {
        let inner = c.get::<Counter>()?;
        Ok(Arc::new(Counter {
            serial: inner.serial + 1,
        }))
    });

    let err = container.get::<Counter>().err().unwrap();
    assert!(err.is_circular_dependency());
    // 失败后描述符保持未创建状态
    assert!(!container.registered_services()[0].instance_created);
}

#[test]
fn test_always_new_recursion_hits_cycle_check() {
    let container = ServiceContainer::new();
    container.register_always_new::<Counter, _>(|c| c.get::<Counter>().map_err(BoxError::from));

    let err = container.get::<Counter>().err().unwrap();
    assert!(err.is_circular_dependency());
}

#[test]
fn test_depth_limit() {
    struct Level0;
    struct Level1;
    struct Level2;
    impl Service for Level0 {}
    impl Service for Level1 {}
    impl Service for Level2 {}

    let container = ServiceContainer::with_options(ContainerOptions {
        max_resolution_depth: 2,
    });
    container.register_shared::<Level2, _>(|_| Ok(Arc::new(Level2)));
    container.register_shared::<Level1, _>(|c| {
        c.get::<Level2>()?;
        Ok(Arc::new(Level1))
    });
    container.register_shared::<Level0, _>(|c| {
        c.get::<Level1>()?;
        Ok(Arc::new(Level0))
    });

    let err = container.get::<Level0>().err().unwrap();
    assert!(matches!(
        err.root_cause(),
        DependencyError::ResolutionDepthExceeded { max_depth: 2, .. }
    ));
    // 较浅的解析不受影响
    assert!(container.get::<Level1>().is_ok());
}

#[test]
fn test_stats() {
    let container = ServiceContainer::new();
    let calls = Arc::new(AtomicUsize::new(0));
    container.register_shared(counting_factory(&calls));

    for _ in 0..4 {
        container.get::<Counter>().unwrap();
    }

    let stats = container.stats();
    assert_eq!(stats.registered_services, 1);
    assert_eq!(stats.resolutions, 4);
    assert_eq!(stats.cache_hits, 3);
    assert_eq!(stats.factory_invocations, 1);
    assert!((stats.hit_rate() - 0.75).abs() < f64::EPSILON);
}

#[test]
fn test_clones_share_state() {
    let container = ServiceContainer::new();
    let handle = container.clone();
    let calls = Arc::new(AtomicUsize::new(0));
    handle.register_shared(counting_factory(&calls));

    let a = container.get::<Counter>().unwrap();
    let b = handle.get::<Counter>().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}
