//! 服务容器单元测试

mod container_tests;

use infrastructure_common::{BoxError, Disposable, Service};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// 测试用计数服务
#[derive(Debug)]
pub(super) struct Counter {
    pub serial: usize,
}

impl Service for Counter {}

/// 可释放的测试资源
#[derive(Debug, Default)]
pub(super) struct Resource {
    pub disposed: AtomicUsize,
    pub fail_on_dispose: bool,
}

impl Resource {
    pub fn failing() -> Self {
        Self {
            disposed: AtomicUsize::new(0),
            fail_on_dispose: true,
        }
    }

    pub fn dispose_count(&self) -> usize {
        self.disposed.load(Ordering::SeqCst)
    }
}

impl Service for Resource {
    fn as_disposable(&self) -> Option<&dyn Disposable> {
        Some(self)
    }
}

impl Disposable for Resource {
    fn dispose(&self) -> Result<(), BoxError> {
        self.disposed.fetch_add(1, Ordering::SeqCst);
        if self.fail_on_dispose {
            Err("资源释放失败".into())
        } else {
            Ok(())
        }
    }
}

/// 返回一个每次调用都递增序号的工厂
pub(super) fn counting_factory(
    calls: &Arc<AtomicUsize>,
) -> impl Fn(&crate::ServiceContainer) -> Result<Arc<Counter>, BoxError> + Send + Sync + 'static {
    let calls = Arc::clone(calls);
    move |_| {
        let serial = calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Arc::new(Counter { serial }))
    }
}
