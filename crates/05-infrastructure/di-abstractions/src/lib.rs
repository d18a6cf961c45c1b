//! # Dependency Injection Abstractions
//!
//! 服务容器抽象层，定义服务注册、解析和作用域管理的核心接口。
//!
//! ## 核心接口
//!
//! - [`ServiceRegistry`] - 服务注册接口
//! - [`ServiceResolver`] - 服务解析接口
//! - [`ScopeManager`] - 作用域生命周期接口
//! - [`ResolveContext`] - 解析链，用于检测循环依赖

pub mod container;
pub mod registry;
pub mod resolver;
pub mod scope;

pub use container::*;
pub use registry::*;
pub use resolver::*;
pub use scope::*;
