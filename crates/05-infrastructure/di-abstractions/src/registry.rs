//! 服务注册表抽象接口

use infrastructure_common::{
    BoxError, InstanceStrategy, Service, ServiceRegistrationInfo,
};
use std::sync::Arc;

/// 工厂返回值
pub type FactoryResult<T> = Result<Arc<T>, BoxError>;

/// 服务注册表 trait
///
/// 每个服务标识最多对应一个描述符，重复注册会整体替换之前的描述符。
/// 组合根应当在开始解析之前完成全部注册。
///
/// 工厂接收注册表自身的引用，可以在工厂内部回调容器解析自己的依赖。
pub trait ServiceRegistry: Send + Sync {
    /// 注册每次解析都创建新实例的服务
    fn register_always_new<T, F>(&self, factory: F)
    where
        T: ?Sized + Service,
        F: Fn(&Self) -> FactoryResult<T> + Send + Sync + 'static,
        Self: Sized;

    /// 注册每个作用域一个实例的服务
    fn register_per_scope<T, F>(&self, factory: F)
    where
        T: ?Sized + Service,
        F: Fn(&Self) -> FactoryResult<T> + Send + Sync + 'static,
        Self: Sized;

    /// 注册全局共享（延迟创建）的服务
    fn register_shared<T, F>(&self, factory: F)
    where
        T: ?Sized + Service,
        F: Fn(&Self) -> FactoryResult<T> + Send + Sync + 'static,
        Self: Sized;

    /// 注册已经创建好的共享实例
    fn register_instance<T>(&self, instance: Arc<T>)
    where
        T: ?Sized + Service,
        Self: Sized;

    /// 检查服务是否已注册
    fn is_registered<T>(&self) -> bool
    where
        T: ?Sized + Service,
        Self: Sized;

    /// 获取服务的生命周期策略
    fn strategy_of<T>(&self) -> Option<InstanceStrategy>
    where
        T: ?Sized + Service,
        Self: Sized;

    /// 获取所有已注册服务的信息
    fn registered_services(&self) -> Vec<ServiceRegistrationInfo>;
}
