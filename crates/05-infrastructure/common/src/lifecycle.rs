//! 服务生命周期策略

use serde::{Deserialize, Serialize};
use std::fmt;

/// 实例生命周期策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceStrategy {
    /// 每次解析都调用工厂创建新实例，不缓存
    AlwaysNew,
    /// 每个命名作用域内只创建一个实例
    PerScope,
    /// 整个容器生命周期内只创建一个实例
    Shared,
}

impl InstanceStrategy {
    /// 是否会缓存实例
    pub fn is_cached(self) -> bool {
        !matches!(self, Self::AlwaysNew)
    }
}

impl fmt::Display for InstanceStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AlwaysNew => "AlwaysNew",
            Self::PerScope => "PerScope",
            Self::Shared => "Shared",
        };
        f.write_str(name)
    }
}

/// 作用域快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeInfo {
    /// 作用域标识
    pub id: String,
    /// 创建时间
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// 当前已创建的实例数量
    pub instance_count: usize,
}
