//! 容器配置和统计信息

use serde::{Deserialize, Serialize};

/// 容器配置选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerOptions {
    /// 单线程上嵌套解析的最大深度
    pub max_resolution_depth: usize,
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self {
            max_resolution_depth: 64,
        }
    }
}

/// 容器运行统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ContainerStats {
    /// 已注册的服务数量
    pub registered_services: usize,
    /// 当前存活的作用域数量
    pub active_scopes: usize,
    /// 解析请求总数
    pub resolutions: u64,
    /// 命中缓存的解析次数
    pub cache_hits: u64,
    /// 工厂调用次数
    pub factory_invocations: u64,
    /// 工厂失败次数
    pub factory_failures: u64,
    /// 累计创建的作用域数量
    pub scopes_created: u64,
    /// 累计释放的作用域数量
    pub scopes_disposed: u64,
}

impl ContainerStats {
    /// 缓存命中率
    pub fn hit_rate(&self) -> f64 {
        if self.resolutions == 0 {
            0.0
        } else {
            self.cache_hits as f64 / self.resolutions as f64
        }
    }
}
