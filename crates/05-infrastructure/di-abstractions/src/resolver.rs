//! 服务解析器抽象接口
//!
//! 提供服务解析能力以及用于检测循环依赖的解析链

use crate::container::ContainerOptions;
use infrastructure_common::{DependencyError, DependencyResult, Service, ServiceTypeInfo};
use std::fmt;
use std::sync::Arc;

/// 服务解析器 trait
pub trait ServiceResolver: Send + Sync {
    /// 解析 `AlwaysNew` 或 `Shared` 服务
    fn get<T>(&self) -> DependencyResult<Arc<T>>
    where
        T: ?Sized + Service,
        Self: Sized;

    /// 在指定作用域内解析服务
    ///
    /// `PerScope` 服务每个作用域一个实例；其他策略忽略作用域，行为与 [`ServiceResolver::get`] 相同。
    fn get_scoped<T>(&self, scope_id: &str) -> DependencyResult<Arc<T>>
    where
        T: ?Sized + Service,
        Self: Sized;

    /// 尝试解析服务，失败时返回 `None`
    fn try_get<T>(&self) -> Option<Arc<T>>
    where
        T: ?Sized + Service,
        Self: Sized,
    {
        self.get::<T>().ok()
    }
}

/// 解析链中的一个节点
///
/// 同一容器、同一服务、同一作用域视为同一个节点。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionKey {
    /// 容器实例标识
    pub container_id: u64,
    /// 服务类型
    pub service: ServiceTypeInfo,
    /// 作用域（仅 `PerScope` 服务）
    pub scope_id: Option<String>,
}

impl ResolutionKey {
    /// 创建新的解析节点
    pub fn new(container_id: u64, service: ServiceTypeInfo, scope_id: Option<&str>) -> Self {
        Self {
            container_id,
            service,
            scope_id: scope_id.map(str::to_string),
        }
    }
}

impl fmt::Display for ResolutionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope_id {
            Some(scope_id) => write!(f, "{}[{}]", self.service, scope_id),
            None => write!(f, "{}", self.service),
        }
    }
}

/// 解析上下文
///
/// 记录当前线程上正在构造的服务。工厂回调容器时，如果再次进入链上已有的节点，
/// 说明依赖成环，立即返回错误而不是阻塞在创建锁上。
#[derive(Debug, Clone, Default)]
pub struct ResolveContext {
    /// 当前解析链
    resolution_chain: Vec<ResolutionKey>,
}

impl ResolveContext {
    /// 创建新的解析上下文
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加节点到解析链
    pub fn push(&mut self, key: ResolutionKey, options: &ContainerOptions) -> DependencyResult<()> {
        if self.resolution_chain.contains(&key) {
            return Err(DependencyError::CircularDependency {
                dependency_chain: self.describe_cycle(&key),
            });
        }

        if self.resolution_chain.len() >= options.max_resolution_depth {
            return Err(DependencyError::ResolutionDepthExceeded {
                type_name: key.service.name.to_string(),
                max_depth: options.max_resolution_depth,
            });
        }

        self.resolution_chain.push(key);
        Ok(())
    }

    /// 从解析链中移除最后一个节点
    pub fn pop(&mut self) -> Option<ResolutionKey> {
        self.resolution_chain.pop()
    }

    /// 当前解析深度
    pub fn depth(&self) -> usize {
        self.resolution_chain.len()
    }

    /// 解析链是否为空
    pub fn is_empty(&self) -> bool {
        self.resolution_chain.is_empty()
    }

    fn describe_cycle(&self, closing: &ResolutionKey) -> String {
        let start = self
            .resolution_chain
            .iter()
            .position(|key| key == closing)
            .unwrap_or(0);

        self.resolution_chain[start..]
            .iter()
            .chain(std::iter::once(closing))
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}
