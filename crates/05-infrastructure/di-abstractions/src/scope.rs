//! 作用域管理抽象接口

use infrastructure_common::{DependencyError, ScopeInfo};

/// 作用域管理 trait
///
/// 作用域由调用方提供的字符串标识。创建已存在的作用域是幂等操作，
/// 释放不存在的作用域也不会报错。
pub trait ScopeManager: Send + Sync {
    /// 创建作用域（幂等）
    fn create_scope(&self, scope_id: &str);

    /// 释放作用域及其中缓存的全部实例
    ///
    /// 单个实例释放失败不会中断其余实例的释放，所有失败都汇总在报告中。
    fn dispose_scope(&self, scope_id: &str) -> DisposalReport;

    /// 作用域是否存在
    fn has_scope(&self, scope_id: &str) -> bool;

    /// 当前存活的作用域标识
    fn scope_ids(&self) -> Vec<String>;

    /// 作用域快照
    fn scope_info(&self, scope_id: &str) -> Option<ScopeInfo>;
}

/// 作用域释放报告
#[derive(Debug)]
pub struct DisposalReport {
    /// 作用域标识
    pub scope_id: String,
    /// 释放前作用域是否存在
    pub existed: bool,
    /// 被释放的实例数量（包括释放失败的实例）
    pub disposed: usize,
    /// 释放失败列表
    pub failures: Vec<DependencyError>,
}

impl DisposalReport {
    /// 作用域不存在时的空报告
    pub fn missing(scope_id: impl Into<String>) -> Self {
        Self {
            scope_id: scope_id.into(),
            existed: false,
            disposed: 0,
            failures: Vec::new(),
        }
    }

    /// 是否没有任何释放失败
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// 转换为 `Result`，返回第一个释放失败
    pub fn into_result(self) -> Result<usize, DependencyError> {
        match self.failures.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(self.disposed),
        }
    }
}
