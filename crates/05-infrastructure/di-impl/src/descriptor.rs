//! 服务描述符
//!
//! 描述符保存类型擦除后的工厂和共享实例缓存。实例以 `Arc<T>` 的形式
//! 装在 [`TypedInstance`] 中，取出时再按服务标识类型检查并还原。

use crate::container::ServiceContainer;
use infrastructure_common::{
    BoxError, DependencyError, DependencyResult, InstanceStrategy, Service, ServiceTypeInfo,
};
use once_cell::sync::OnceCell;
use std::any::Any;
use std::sync::Arc;

/// 类型擦除后的服务实例
pub(crate) trait ErasedInstance: Send + Sync {
    /// 内部的 `Arc<T>`
    fn as_any(&self) -> &dyn Any;

    /// 调用实例的释放能力，实例不可释放时返回 `None`
    fn dispose(&self) -> Option<Result<(), BoxError>>;
}

struct TypedInstance<T: ?Sized + Service>(Arc<T>);

impl<T: ?Sized + Service> ErasedInstance for TypedInstance<T> {
    fn as_any(&self) -> &dyn Any {
        &self.0
    }

    fn dispose(&self) -> Option<Result<(), BoxError>> {
        self.0.as_disposable().map(|disposable| disposable.dispose())
    }
}

pub(crate) type SharedInstance = Arc<dyn ErasedInstance>;

pub(crate) type ErasedFactory =
    Arc<dyn Fn(&ServiceContainer) -> Result<SharedInstance, BoxError> + Send + Sync>;

/// 擦除实例类型
pub(crate) fn erase<T: ?Sized + Service>(instance: Arc<T>) -> SharedInstance {
    Arc::new(TypedInstance(instance))
}

/// 还原实例类型
pub(crate) fn downcast<T: ?Sized + Service>(instance: &SharedInstance) -> DependencyResult<Arc<T>> {
    instance
        .as_any()
        .downcast_ref::<Arc<T>>()
        .cloned()
        .ok_or_else(|| DependencyError::TypeMismatch {
            type_name: std::any::type_name::<T>().to_string(),
        })
}

/// 服务描述符
pub(crate) struct ServiceDescriptor {
    /// 服务类型
    pub type_info: ServiceTypeInfo,
    /// 生命周期策略
    pub strategy: InstanceStrategy,
    factory: ErasedFactory,
    /// 共享实例，只有 `Shared` 策略会写入，写入后不再清除
    shared: OnceCell<SharedInstance>,
}

impl ServiceDescriptor {
    /// 由类型化工厂创建描述符
    pub fn new<T, F>(strategy: InstanceStrategy, factory: F) -> Self
    where
        T: ?Sized + Service,
        F: Fn(&ServiceContainer) -> Result<Arc<T>, BoxError> + Send + Sync + 'static,
    {
        Self {
            type_info: ServiceTypeInfo::of::<T>(),
            strategy,
            factory: Arc::new(move |container| factory(container).map(erase)),
            shared: OnceCell::new(),
        }
    }

    /// 由已经创建好的实例创建 `Shared` 描述符
    pub fn with_instance<T: ?Sized + Service>(instance: Arc<T>) -> Self {
        let erased = erase(instance);
        let cached = Arc::clone(&erased);
        Self {
            type_info: ServiceTypeInfo::of::<T>(),
            strategy: InstanceStrategy::Shared,
            factory: Arc::new(move |_| Ok(Arc::clone(&cached))),
            shared: OnceCell::with_value(erased),
        }
    }

    /// 调用工厂
    pub fn invoke(&self, container: &ServiceContainer) -> Result<SharedInstance, BoxError> {
        (self.factory)(container)
    }

    /// 已缓存的共享实例
    pub fn cached(&self) -> Option<&SharedInstance> {
        self.shared.get()
    }

    /// 共享实例的一次性初始化单元
    pub fn shared_cell(&self) -> &OnceCell<SharedInstance> {
        &self.shared
    }
}

impl std::fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceDescriptor")
            .field("type_info", &self.type_info)
            .field("strategy", &self.strategy)
            .field("instance_created", &self.shared.get().is_some())
            .finish()
    }
}
