//! 作用域守卫

use crate::container::ServiceContainer;
use di_abstractions::DisposalReport;
use infrastructure_common::{DependencyResult, Service};
use std::sync::Arc;
use tracing::warn;

/// 作用域守卫
///
/// 持有一个作用域，析构时自动释放。需要检查释放结果时调用 [`ScopeGuard::dispose`]。
#[must_use = "守卫析构时会立即释放作用域"]
pub struct ScopeGuard {
    container: ServiceContainer,
    scope_id: String,
    disposed: bool,
}

impl ScopeGuard {
    pub(crate) fn new(container: ServiceContainer, scope_id: String) -> Self {
        Self {
            container,
            scope_id,
            disposed: false,
        }
    }

    /// 作用域标识
    pub fn id(&self) -> &str {
        &self.scope_id
    }

    /// 所属容器
    pub fn container(&self) -> &ServiceContainer {
        &self.container
    }

    /// 在当前作用域内解析服务
    pub fn get<T: ?Sized + Service>(&self) -> DependencyResult<Arc<T>> {
        self.container.get_scoped::<T>(&self.scope_id)
    }

    /// 立即释放作用域并返回释放报告
    pub fn dispose(mut self) -> DisposalReport {
        self.disposed = true;
        self.container.dispose_scope(&self.scope_id)
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        if self.disposed {
            return;
        }

        let report = self.container.dispose_scope(&self.scope_id);
        if !report.is_clean() {
            warn!(
                "作用域 {} 在析构时释放，{} 个实例释放失败",
                self.scope_id,
                report.failures.len()
            );
        }
    }
}

impl std::fmt::Debug for ScopeGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeGuard")
            .field("scope_id", &self.scope_id)
            .field("disposed", &self.disposed)
            .finish()
    }
}
