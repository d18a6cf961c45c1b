//! # Infrastructure Common
//!
//! 这个 crate 提供了服务容器各层共享的基础类型。
//!
//! ## 核心组件
//!
//! - [`Service`] - 可注册服务标识的基础 trait
//! - [`Disposable`] - 可选的资源释放能力
//! - [`InstanceStrategy`] - 实例生命周期策略
//! - [`ServiceTypeInfo`] - 服务类型标识
//! - [`DependencyError`] - 依赖注入错误
//!
//! ## 设计原则
//!
//! - 基于 Rust 类型系统的编译时安全
//! - 服务标识可以是具体类型，也可以是 `dyn Trait`
//! - 释放能力显式声明，不依赖运行时反射

pub mod errors;
pub mod lifecycle;
pub mod metadata;
pub mod service;

pub use errors::*;
pub use lifecycle::*;
pub use metadata::*;
pub use service::*;
