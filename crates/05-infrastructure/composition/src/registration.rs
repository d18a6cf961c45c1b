//! 服务注册
//!
//! 组合根在启动时一次性注册所有服务。工厂通过容器解析自己的依赖，
//! 依赖关系为：
//!
//! ```text
//! HoldingsService   -> EngineService, RepositoryService
//! WithdrawalService -> EngineService, RepositoryService
//! EngineService     -> AppSettings
//! RepositoryService -> AppSettings
//! SyncSession       -> AppSettings           (每个作用域一个)
//! ```

use crate::contracts::{EngineService, HoldingsService, RepositoryService, WithdrawalService};
use crate::services::{
    DefaultHoldingsService, DefaultWithdrawalService, InMemoryRepository, SimulatedEngine,
    SyncSession,
};
use crate::settings::AppSettings;
use di_abstractions::{ServiceRegistry, ServiceResolver};
use std::sync::Arc;
use tracing::info;

/// 服务注册器
pub struct ServiceRegistration;

impl ServiceRegistration {
    /// 注册所有服务
    pub fn register_all_services<R>(container: &R, settings: &AppSettings)
    where
        R: ServiceRegistry + ServiceResolver + 'static,
    {
        container.register_instance(Arc::new(settings.clone()));

        container.register_shared::<dyn RepositoryService, _>(|c| {
            let settings = c.get::<AppSettings>()?;
            let repository = InMemoryRepository::connect(&settings.repository)?;
            Ok(Arc::new(repository))
        });

        container.register_shared::<dyn EngineService, _>(|c| {
            let settings = c.get::<AppSettings>()?;
            Ok(Arc::new(SimulatedEngine::new(&settings.engine)))
        });

        container.register_shared::<dyn HoldingsService, _>(|c| {
            let settings = c.get::<AppSettings>()?;
            Ok(Arc::new(DefaultHoldingsService::new(
                c.get::<dyn EngineService>()?,
                c.get::<dyn RepositoryService>()?,
                &settings.engine.reference_prices,
            )))
        });

        container.register_shared::<dyn WithdrawalService, _>(|c| {
            Ok(Arc::new(DefaultWithdrawalService::new(
                c.get::<dyn EngineService>()?,
                c.get::<dyn RepositoryService>()?,
            )))
        });

        container.register_per_scope::<SyncSession, _>(|c| {
            let settings = c.get::<AppSettings>()?;
            Ok(Arc::new(SyncSession::new(settings.sync.asset_class)))
        });

        info!(
            "服务注册完成，共 {} 个服务",
            container.registered_services().len()
        );
    }
}
