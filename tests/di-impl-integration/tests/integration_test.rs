//! Centralized integration tests for the service container

use di_abstractions::DisposalReport;
use di_impl::ServiceContainer;
use infrastructure_common::{BoxError, DependencyError, Disposable, Service};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

/// 日志服务，构造时分配递增编号
#[derive(Debug)]
struct Logger {
    id: u64,
}

impl Service for Logger {}

/// 请求会话，作用域释放时关闭
#[derive(Debug, Default)]
struct Session {
    closed: AtomicUsize,
}

impl Service for Session {
    fn as_disposable(&self) -> Option<&dyn Disposable> {
        Some(self)
    }
}

impl Disposable for Session {
    fn dispose(&self) -> Result<(), BoxError> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// 释放总是失败的连接
#[derive(Debug, Default)]
struct BrokenConnection {
    attempts: AtomicUsize,
}

impl Service for BrokenConnection {
    fn as_disposable(&self) -> Option<&dyn Disposable> {
        Some(self)
    }
}

impl Disposable for BrokenConnection {
    fn dispose(&self) -> Result<(), BoxError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err("连接已断开".into())
    }
}

#[test]
fn test_logger_is_constructed_once_under_contention() {
    let container = ServiceContainer::new();
    let next_id = Arc::new(AtomicU64::new(0));
    let factory_runs = Arc::new(AtomicUsize::new(0));

    let ids = Arc::clone(&next_id);
    let runs = Arc::clone(&factory_runs);
    container.register_shared::<Logger, _>(move |_| {
        runs.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(10));
        Ok(Arc::new(Logger {
            id: ids.fetch_add(1, Ordering::SeqCst) + 1,
        }))
    });

    let barrier = Arc::new(Barrier::new(10));
    let handles: Vec<_> = (0..10)
        .map(|_| {
            let container = container.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                container.get::<Logger>().unwrap()
            })
        })
        .collect();

    let loggers: Vec<Arc<Logger>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(factory_runs.load(Ordering::SeqCst), 1);
    assert!(loggers.iter().all(|logger| logger.id == loggers[0].id));
    assert!(loggers.iter().all(|logger| Arc::ptr_eq(logger, &loggers[0])));
}

#[test]
fn test_session_per_request_scope() {
    let container = ServiceContainer::new();
    container.register_per_scope::<Session, _>(|_| Ok(Arc::new(Session::default())));

    container.create_scope("req-1");
    let first = container.get_scoped::<Session>("req-1").unwrap();
    let second = container.get_scoped::<Session>("req-1").unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    container.create_scope("req-2");
    let other = container.get_scoped::<Session>("req-2").unwrap();
    assert!(!Arc::ptr_eq(&first, &other));

    let report = container.dispose_scope("req-1");
    assert!(report.existed && report.is_clean());
    assert!(!container.has_scope("req-1"));
    assert!(container.scope_info("req-1").is_none());
    assert_eq!(first.closed.load(Ordering::SeqCst), 1);

    // req-2 不受影响
    assert!(container.has_scope("req-2"));
    assert_eq!(other.closed.load(Ordering::SeqCst), 0);
}

#[test]
fn test_always_new_returns_distinct_instances() {
    let container = ServiceContainer::new();
    let next_id = Arc::new(AtomicU64::new(0));
    let ids = Arc::clone(&next_id);
    container.register_always_new::<Logger, _>(move |_| {
        Ok(Arc::new(Logger {
            id: ids.fetch_add(1, Ordering::SeqCst),
        }))
    });

    let loggers: Vec<_> = (0..5).map(|_| container.get::<Logger>().unwrap()).collect();
    for (i, a) in loggers.iter().enumerate() {
        for b in &loggers[i + 1..] {
            assert!(!Arc::ptr_eq(a, b));
            assert_ne!(a.id, b.id);
        }
    }
}

#[test]
fn test_not_found_is_an_error_for_every_accessor() {
    let container = ServiceContainer::new();

    assert!(matches!(
        container.get::<Logger>(),
        Err(DependencyError::ServiceNotRegistered { .. })
    ));
    assert!(matches!(
        container.get_scoped::<Session>("req-1"),
        Err(DependencyError::ServiceNotRegistered { .. })
    ));
    // 未注册的服务不会创建作用域
    assert!(!container.has_scope("req-1"));
}

#[test]
fn test_disposal_invokes_each_capability_once_despite_failures() {
    let container = ServiceContainer::new();
    container.register_per_scope::<Session, _>(|_| Ok(Arc::new(Session::default())));
    container.register_per_scope::<BrokenConnection, _>(|_| {
        Ok(Arc::new(BrokenConnection::default()))
    });

    let connection = container.get_scoped::<BrokenConnection>("job").unwrap();
    let session = container.get_scoped::<Session>("job").unwrap();

    let report: DisposalReport = container.dispose_scope("job");
    assert_eq!(report.disposed, 2);
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        report.failures[0],
        DependencyError::DisposalFailed { .. }
    ));

    assert_eq!(session.closed.load(Ordering::SeqCst), 1);
    assert_eq!(connection.attempts.load(Ordering::SeqCst), 1);
    assert!(!container.has_scope("job"));

    // 再次释放是空操作
    let report = container.dispose_scope("job");
    assert!(!report.existed);
    assert_eq!(connection.attempts.load(Ordering::SeqCst), 1);
}

#[test]
fn test_disposed_scope_id_can_be_recreated() {
    let container = ServiceContainer::new();
    container.register_per_scope::<Session, _>(|_| Ok(Arc::new(Session::default())));

    let before = container.get_scoped::<Session>("req-1").unwrap();
    container.dispose_scope("req-1");

    container.create_scope("req-1");
    let after = container.get_scoped::<Session>("req-1").unwrap();
    assert!(!Arc::ptr_eq(&before, &after));
    assert_eq!(after.closed.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_resolution_from_async_tasks() -> anyhow::Result<()> {
    let container = ServiceContainer::new();
    let runs = Arc::new(AtomicUsize::new(0));
    let factory_runs = Arc::clone(&runs);
    container.register_shared::<Logger, _>(move |_| {
        factory_runs.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(Logger { id: 1 }))
    });
    container.register_per_scope::<Session, _>(|_| Ok(Arc::new(Session::default())));

    let mut tasks = Vec::new();
    for i in 0..8 {
        let container = container.clone();
        tasks.push(tokio::spawn(async move {
            let scope = container.enter_scope(&format!("task-{i}"));
            let logger = container.get::<Logger>()?;
            let session = scope.get::<Session>()?;
            let report = scope.dispose();
            anyhow::ensure!(report.is_clean(), "作用域释放失败");
            Ok::<_, anyhow::Error>((logger.id, session.closed.load(Ordering::SeqCst)))
        }));
    }

    for task in tasks {
        let (logger_id, closed) = task.await??;
        assert_eq!(logger_id, 1);
        assert_eq!(closed, 1);
    }

    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert!(container.scope_ids().is_empty());
    Ok(())
}
