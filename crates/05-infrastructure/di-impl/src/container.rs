//! 服务容器实现

use crate::descriptor::{downcast, ServiceDescriptor, SharedInstance};
use crate::guard::ScopeGuard;
use crate::resolution::ResolutionGuard;
use crate::scope_store::{ScopeEntry, ScopeStore};
use di_abstractions::{
    ContainerOptions, ContainerStats, DisposalReport, FactoryResult, ResolutionKey, ScopeManager,
    ServiceRegistry, ServiceResolver,
};
use infrastructure_common::{
    BoxError, DependencyError, DependencyResult, InstanceStrategy, ScopeInfo, Service,
    ServiceRegistrationInfo, ServiceTypeInfo,
};
use parking_lot::RwLock;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

static NEXT_CONTAINER_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Default)]
struct Counters {
    resolutions: AtomicU64,
    cache_hits: AtomicU64,
    factory_invocations: AtomicU64,
    factory_failures: AtomicU64,
    scopes_created: AtomicU64,
    scopes_disposed: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

struct ContainerInner {
    id: u64,
    options: ContainerOptions,
    descriptors: RwLock<HashMap<TypeId, Arc<ServiceDescriptor>>>,
    scopes: ScopeStore,
    counters: Counters,
}

/// 类型化服务容器
///
/// 容器按服务标识类型保存描述符，并根据生命周期策略创建、缓存和释放实例：
///
/// - `AlwaysNew`: 每次解析都调用工厂
/// - `PerScope`: 每个 `(服务, 作用域)` 槽位只创建一次
/// - `Shared`: 整个容器内只创建一次
///
/// 工厂运行期间不持有描述符表或作用域表的锁，工厂可以回调容器解析自己的依赖。
/// 克隆容器得到的是同一个容器的另一个句柄。
///
/// ```rust
/// use di_impl::ServiceContainer;
/// use infrastructure_common::Service;
/// use std::sync::Arc;
///
/// struct Clock;
/// impl Service for Clock {}
///
/// let container = ServiceContainer::new();
/// container.register_shared::<Clock, _>(|_| Ok(Arc::new(Clock)));
///
/// let first = container.get::<Clock>().unwrap();
/// let second = container.get::<Clock>().unwrap();
/// assert!(Arc::ptr_eq(&first, &second));
/// ```
#[derive(Clone)]
pub struct ServiceContainer {
    inner: Arc<ContainerInner>,
}

impl ServiceContainer {
    /// 使用默认配置创建容器
    pub fn new() -> Self {
        Self::with_options(ContainerOptions::default())
    }

    /// 使用指定配置创建容器
    pub fn with_options(options: ContainerOptions) -> Self {
        let id = NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed);
        debug!("创建服务容器 #{} (最大解析深度 {})", id, options.max_resolution_depth);

        Self {
            inner: Arc::new(ContainerInner {
                id,
                options,
                descriptors: RwLock::new(HashMap::new()),
                scopes: ScopeStore::default(),
                counters: Counters::default(),
            }),
        }
    }

    /// 容器配置
    pub fn options(&self) -> &ContainerOptions {
        &self.inner.options
    }

    // ---------------------------------------------------------------------
    // 注册
    // ---------------------------------------------------------------------

    /// 注册每次解析都创建新实例的服务
    pub fn register_always_new<T, F>(&self, factory: F)
    where
        T: ?Sized + Service,
        F: Fn(&ServiceContainer) -> Result<Arc<T>, BoxError> + Send + Sync + 'static,
    {
        self.install(ServiceDescriptor::new(InstanceStrategy::AlwaysNew, factory));
    }

    /// 注册每个作用域一个实例的服务
    pub fn register_per_scope<T, F>(&self, factory: F)
    where
        T: ?Sized + Service,
        F: Fn(&ServiceContainer) -> Result<Arc<T>, BoxError> + Send + Sync + 'static,
    {
        self.install(ServiceDescriptor::new(InstanceStrategy::PerScope, factory));
    }

    /// 注册全局共享的服务，首次解析时创建
    pub fn register_shared<T, F>(&self, factory: F)
    where
        T: ?Sized + Service,
        F: Fn(&ServiceContainer) -> Result<Arc<T>, BoxError> + Send + Sync + 'static,
    {
        self.install(ServiceDescriptor::new(InstanceStrategy::Shared, factory));
    }

    /// 注册已经创建好的共享实例
    pub fn register_instance<T>(&self, instance: Arc<T>)
    where
        T: ?Sized + Service,
    {
        self.install(ServiceDescriptor::with_instance(instance));
    }

    fn install(&self, descriptor: ServiceDescriptor) {
        let type_info = descriptor.type_info;
        let strategy = descriptor.strategy;

        let replaced = self
            .inner
            .descriptors
            .write()
            .insert(type_info.id, Arc::new(descriptor))
            .is_some();

        if replaced {
            info!("替换服务注册: {} ({})", type_info, strategy);
        } else {
            info!("注册服务: {} ({})", type_info, strategy);
        }
    }

    /// 检查服务是否已注册
    pub fn is_registered<T: ?Sized + Service>(&self) -> bool {
        self.inner
            .descriptors
            .read()
            .contains_key(&TypeId::of::<T>())
    }

    /// 获取服务的生命周期策略
    pub fn strategy_of<T: ?Sized + Service>(&self) -> Option<InstanceStrategy> {
        self.inner
            .descriptors
            .read()
            .get(&TypeId::of::<T>())
            .map(|descriptor| descriptor.strategy)
    }

    /// 获取所有已注册服务的信息，按类型名排序
    pub fn registered_services(&self) -> Vec<ServiceRegistrationInfo> {
        let mut services: Vec<_> = self
            .inner
            .descriptors
            .read()
            .values()
            .map(|descriptor| ServiceRegistrationInfo {
                type_info: descriptor.type_info,
                strategy: descriptor.strategy,
                instance_created: descriptor.cached().is_some(),
            })
            .collect();
        services.sort_by_key(|info| info.type_info.name);
        services
    }

    // ---------------------------------------------------------------------
    // 解析
    // ---------------------------------------------------------------------

    /// 解析 `AlwaysNew` 或 `Shared` 服务
    ///
    /// `PerScope` 服务必须通过 [`ServiceContainer::get_scoped`] 解析，否则返回
    /// [`DependencyError::WrongAccessor`]。
    pub fn get<T: ?Sized + Service>(&self) -> DependencyResult<Arc<T>> {
        Counters::bump(&self.inner.counters.resolutions);
        let descriptor = self.descriptor::<T>()?;

        match descriptor.strategy {
            InstanceStrategy::Shared => self.resolve_shared(&descriptor),
            InstanceStrategy::AlwaysNew => self.resolve_always_new(&descriptor),
            InstanceStrategy::PerScope => Err(DependencyError::WrongAccessor {
                type_name: descriptor.type_info.to_string(),
                strategy: descriptor.strategy,
            }),
        }
    }

    /// 在指定作用域内解析服务
    ///
    /// 作用域不存在时会被自动创建。`Shared` 和 `AlwaysNew` 服务忽略作用域。
    pub fn get_scoped<T: ?Sized + Service>(&self, scope_id: &str) -> DependencyResult<Arc<T>> {
        Counters::bump(&self.inner.counters.resolutions);
        let descriptor = self.descriptor::<T>()?;

        match descriptor.strategy {
            InstanceStrategy::PerScope => self.resolve_per_scope(&descriptor, scope_id),
            InstanceStrategy::Shared => self.resolve_shared(&descriptor),
            InstanceStrategy::AlwaysNew => self.resolve_always_new(&descriptor),
        }
    }

    /// 尝试解析服务，失败时返回 `None`
    pub fn try_get<T: ?Sized + Service>(&self) -> Option<Arc<T>> {
        self.get::<T>().ok()
    }

    fn descriptor<T: ?Sized + Service>(&self) -> DependencyResult<Arc<ServiceDescriptor>> {
        // 克隆出描述符后立即释放读锁
        let descriptor = self
            .inner
            .descriptors
            .read()
            .get(&TypeId::of::<T>())
            .cloned();

        descriptor.ok_or_else(|| {
            DependencyError::not_registered(ServiceTypeInfo::of::<T>().to_string())
        })
    }

    fn resolve_shared<T: ?Sized + Service>(
        &self,
        descriptor: &ServiceDescriptor,
    ) -> DependencyResult<Arc<T>> {
        if let Some(instance) = descriptor.cached() {
            Counters::bump(&self.inner.counters.cache_hits);
            return downcast(instance);
        }

        let _guard = ResolutionGuard::enter(self.resolution_key(descriptor, None), self.options())?;

        let mut constructed = false;
        let instance = descriptor.shared_cell().get_or_try_init(|| {
            constructed = true;
            self.construct(descriptor)
        })?;

        if !constructed {
            // 等待期间被其他线程创建
            Counters::bump(&self.inner.counters.cache_hits);
        }
        downcast(instance)
    }

    fn resolve_always_new<T: ?Sized + Service>(
        &self,
        descriptor: &ServiceDescriptor,
    ) -> DependencyResult<Arc<T>> {
        let _guard = ResolutionGuard::enter(self.resolution_key(descriptor, None), self.options())?;
        let instance = self.construct(descriptor)?;
        downcast(&instance)
    }

    fn resolve_per_scope<T: ?Sized + Service>(
        &self,
        descriptor: &ServiceDescriptor,
        scope_id: &str,
    ) -> DependencyResult<Arc<T>> {
        let scope = self.scope_entry(scope_id);
        let slot = scope.slot(descriptor.type_info.id);

        if let Some(instance) = slot.get() {
            Counters::bump(&self.inner.counters.cache_hits);
            return downcast(instance);
        }

        let _guard = ResolutionGuard::enter(
            self.resolution_key(descriptor, Some(scope_id)),
            self.options(),
        )?;

        let mut constructed = false;
        let instance = slot.get_or_try_init(|| {
            constructed = true;
            let instance = self.construct(descriptor)?;
            scope.record(descriptor.type_info, Arc::clone(&instance));
            Ok::<_, DependencyError>(instance)
        })?;

        if !constructed {
            Counters::bump(&self.inner.counters.cache_hits);
        }
        downcast(instance)
    }

    fn construct(&self, descriptor: &ServiceDescriptor) -> DependencyResult<SharedInstance> {
        Counters::bump(&self.inner.counters.factory_invocations);
        debug!("创建服务实例: {} ({})", descriptor.type_info, descriptor.strategy);

        descriptor.invoke(self).map_err(|source| {
            Counters::bump(&self.inner.counters.factory_failures);
            debug!("服务工厂失败: {} - {}", descriptor.type_info, source);
            DependencyError::FactoryFailed {
                type_name: descriptor.type_info.to_string(),
                source,
            }
        })
    }

    fn resolution_key(&self, descriptor: &ServiceDescriptor, scope_id: Option<&str>) -> ResolutionKey {
        ResolutionKey::new(self.inner.id, descriptor.type_info, scope_id)
    }

    // ---------------------------------------------------------------------
    // 作用域
    // ---------------------------------------------------------------------

    fn scope_entry(&self, scope_id: &str) -> Arc<ScopeEntry> {
        let (entry, created) = self.inner.scopes.get_or_create(scope_id);
        if created {
            Counters::bump(&self.inner.counters.scopes_created);
            info!("创建作用域: {}", entry.id());
        }
        entry
    }

    /// 创建作用域，作用域已存在时不做任何事
    pub fn create_scope(&self, scope_id: &str) {
        self.scope_entry(scope_id);
    }

    /// 释放作用域
    ///
    /// 作用域先被移除，然后按创建顺序的逆序释放其中所有可释放的实例。
    /// 单个实例释放失败会被记录到报告中，不影响其余实例的释放。
    /// 作用域不存在时返回空报告。
    pub fn dispose_scope(&self, scope_id: &str) -> DisposalReport {
        let Some((disposed, failures)) = self.inner.scopes.remove_and_dispose(scope_id) else {
            debug!("作用域不存在，跳过释放: {}", scope_id);
            return DisposalReport::missing(scope_id);
        };

        Counters::bump(&self.inner.counters.scopes_disposed);
        if failures.is_empty() {
            info!("释放作用域: {} ({} 个实例)", scope_id, disposed);
        } else {
            warn!(
                "释放作用域: {} ({} 个实例, {} 个释放失败)",
                scope_id,
                disposed,
                failures.len()
            );
        }

        DisposalReport {
            scope_id: scope_id.to_string(),
            existed: true,
            disposed,
            failures,
        }
    }

    /// 释放所有存活的作用域
    pub fn dispose_all_scopes(&self) -> Vec<DisposalReport> {
        self.scope_ids()
            .iter()
            .map(|scope_id| self.dispose_scope(scope_id))
            .filter(|report| report.existed)
            .collect()
    }

    /// 使用生成的标识创建作用域，返回的守卫在析构时释放作用域
    pub fn begin_scope(&self) -> ScopeGuard {
        self.enter_scope(&uuid::Uuid::new_v4().to_string())
    }

    /// 进入指定作用域，返回的守卫在析构时释放作用域
    pub fn enter_scope(&self, scope_id: &str) -> ScopeGuard {
        self.create_scope(scope_id);
        ScopeGuard::new(self.clone(), scope_id.to_string())
    }

    /// 作用域是否存在
    pub fn has_scope(&self, scope_id: &str) -> bool {
        self.inner.scopes.contains(scope_id)
    }

    /// 当前存活的作用域标识
    pub fn scope_ids(&self) -> Vec<String> {
        self.inner.scopes.ids()
    }

    /// 作用域快照
    pub fn scope_info(&self, scope_id: &str) -> Option<ScopeInfo> {
        self.inner.scopes.get(scope_id).map(|entry| entry.info())
    }

    /// 运行统计
    pub fn stats(&self) -> ContainerStats {
        let counters = &self.inner.counters;
        ContainerStats {
            registered_services: self.inner.descriptors.read().len(),
            active_scopes: self.inner.scopes.len(),
            resolutions: counters.resolutions.load(Ordering::Relaxed),
            cache_hits: counters.cache_hits.load(Ordering::Relaxed),
            factory_invocations: counters.factory_invocations.load(Ordering::Relaxed),
            factory_failures: counters.factory_failures.load(Ordering::Relaxed),
            scopes_created: counters.scopes_created.load(Ordering::Relaxed),
            scopes_disposed: counters.scopes_disposed.load(Ordering::Relaxed),
        }
    }
}

impl Default for ServiceContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ServiceContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContainer")
            .field("id", &self.inner.id)
            .field("options", &self.inner.options)
            .field("stats", &self.stats())
            .finish()
    }
}

impl ServiceRegistry for ServiceContainer {
    fn register_always_new<T, F>(&self, factory: F)
    where
        T: ?Sized + Service,
        F: Fn(&Self) -> FactoryResult<T> + Send + Sync + 'static,
    {
        ServiceContainer::register_always_new(self, factory);
    }

    fn register_per_scope<T, F>(&self, factory: F)
    where
        T: ?Sized + Service,
        F: Fn(&Self) -> FactoryResult<T> + Send + Sync + 'static,
    {
        ServiceContainer::register_per_scope(self, factory);
    }

    fn register_shared<T, F>(&self, factory: F)
    where
        T: ?Sized + Service,
        F: Fn(&Self) -> FactoryResult<T> + Send + Sync + 'static,
    {
        ServiceContainer::register_shared(self, factory);
    }

    fn register_instance<T>(&self, instance: Arc<T>)
    where
        T: ?Sized + Service,
    {
        ServiceContainer::register_instance(self, instance);
    }

    fn is_registered<T>(&self) -> bool
    where
        T: ?Sized + Service,
    {
        ServiceContainer::is_registered::<T>(self)
    }

    fn strategy_of<T>(&self) -> Option<InstanceStrategy>
    where
        T: ?Sized + Service,
    {
        ServiceContainer::strategy_of::<T>(self)
    }

    fn registered_services(&self) -> Vec<ServiceRegistrationInfo> {
        ServiceContainer::registered_services(self)
    }
}

impl ServiceResolver for ServiceContainer {
    fn get<T>(&self) -> DependencyResult<Arc<T>>
    where
        T: ?Sized + Service,
    {
        ServiceContainer::get::<T>(self)
    }

    fn get_scoped<T>(&self, scope_id: &str) -> DependencyResult<Arc<T>>
    where
        T: ?Sized + Service,
    {
        ServiceContainer::get_scoped::<T>(self, scope_id)
    }

    fn try_get<T>(&self) -> Option<Arc<T>>
    where
        T: ?Sized + Service,
    {
        ServiceContainer::try_get::<T>(self)
    }
}

impl ScopeManager for ServiceContainer {
    fn create_scope(&self, scope_id: &str) {
        ServiceContainer::create_scope(self, scope_id);
    }

    fn dispose_scope(&self, scope_id: &str) -> DisposalReport {
        ServiceContainer::dispose_scope(self, scope_id)
    }

    fn has_scope(&self, scope_id: &str) -> bool {
        ServiceContainer::has_scope(self, scope_id)
    }

    fn scope_ids(&self) -> Vec<String> {
        ServiceContainer::scope_ids(self)
    }

    fn scope_info(&self, scope_id: &str) -> Option<ScopeInfo> {
        ServiceContainer::scope_info(self, scope_id)
    }
}
