//! # 依赖注入具体实现
//!
//! 提供类型化服务容器 [`ServiceContainer`]：
//!
//! - 描述符表：服务类型 -> 工厂、生命周期策略和共享实例缓存
//! - 作用域表：作用域标识 -> 作用域内按服务类型划分的实例槽位
//! - 线程内解析链：检测同一线程上的循环依赖
//!
//! 共享实例和作用域槽位都通过 `OnceCell` 保证只创建一次，工厂失败不会被缓存。

mod container;
mod descriptor;
mod guard;
mod resolution;
mod scope_store;

#[cfg(test)]
mod tests;

pub use container::ServiceContainer;
pub use guard::ScopeGuard;

pub use di_abstractions::{
    ContainerOptions, ContainerStats, DisposalReport, FactoryResult, ScopeManager,
    ServiceRegistry, ServiceResolver,
};
