//! 服务基础接口定义
//!
//! 所有可注册到容器中的服务标识都必须实现 [`Service`]。
//! 服务标识既可以是具体类型，也可以是 `dyn Trait`（只要该 trait 以 `Service` 为父 trait）。

use crate::errors::BoxError;

/// 服务基础 trait
///
/// 容器在作用域销毁时通过 [`Service::as_disposable`] 检测实例是否具备释放能力。
/// 默认实现返回 `None`，需要释放资源的类型覆盖该方法并返回 `Some(self)`。
///
/// ```rust
/// use infrastructure_common::{BoxError, Disposable, Service};
///
/// struct Connection;
///
/// impl Disposable for Connection {
///     fn dispose(&self) -> Result<(), BoxError> {
///         Ok(())
///     }
/// }
///
/// impl Service for Connection {
///     fn as_disposable(&self) -> Option<&dyn Disposable> {
///         Some(self)
///     }
/// }
/// ```
pub trait Service: Send + Sync + 'static {
    /// 获取实例的释放能力（如果有）
    fn as_disposable(&self) -> Option<&dyn Disposable> {
        None
    }
}

/// 资源释放能力
///
/// 作用域销毁时，容器对作用域内每个实现了该能力的实例调用一次 `dispose`。
/// 返回的错误只会被记录，不会中断同一作用域内其他实例的释放。
pub trait Disposable: Send + Sync {
    /// 释放实例持有的资源
    fn dispose(&self) -> Result<(), BoxError>;
}
