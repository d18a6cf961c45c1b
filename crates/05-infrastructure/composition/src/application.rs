//! 应用运行时

use crate::contracts::{EngineService, HoldingsService, RepositoryService, WithdrawalService};
use crate::models::SyncSummary;
use crate::registration::ServiceRegistration;
use crate::services::SyncSession;
use crate::settings::AppSettings;
use di_impl::ServiceContainer;
use infrastructure_common::{InfrastructureError, InfrastructureResult};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

/// 应用
///
/// 持有服务容器和配置。每次同步周期在独立的作用域中运行，周期结束时释放作用域。
pub struct Application {
    container: ServiceContainer,
    settings: Arc<AppSettings>,
    cycles: AtomicU64,
}

impl Application {
    /// 创建容器并注册所有服务
    pub fn bootstrap(settings: AppSettings) -> InfrastructureResult<Self> {
        settings.validate()?;

        let container = ServiceContainer::with_options(settings.container.clone());
        ServiceRegistration::register_all_services(&container, &settings);

        info!("应用启动准备完成");
        Ok(Self {
            container,
            settings: Arc::new(settings),
            cycles: AtomicU64::new(0),
        })
    }

    /// 服务容器
    pub fn container(&self) -> &ServiceContainer {
        &self.container
    }

    /// 应用配置
    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    /// 已完成的同步周期数
    pub fn completed_cycles(&self) -> u64 {
        self.cycles.load(Ordering::Relaxed)
    }

    /// 启动引擎
    ///
    /// 同时解析仓储，连接配置错误在启动阶段暴露。
    pub async fn start(&self) -> InfrastructureResult<()> {
        self.container.get::<dyn RepositoryService>()?;

        let engine = self.container.get::<dyn EngineService>()?;
        engine
            .start()
            .await
            .map_err(|e| InfrastructureError::BootstrapFailed {
                message: format!("引擎启动失败: {}", e),
            })?;

        info!("应用已启动");
        Ok(())
    }

    /// 执行一次同步周期
    ///
    /// 逐个交易所更新持仓并保存提现历史。单个交易所失败只记录到汇总中，不中断周期。
    pub async fn run_sync_cycle(&self) -> InfrastructureResult<SyncSummary> {
        let engine = self.container.get::<dyn EngineService>()?;
        if !engine.is_running() {
            return Err(InfrastructureError::BootstrapFailed {
                message: "引擎未运行，请先调用 start".to_string(),
            });
        }
        let holdings = self.container.get::<dyn HoldingsService>()?;
        let withdrawals = self.container.get::<dyn WithdrawalService>()?;

        let scope = self.container.begin_scope();
        let session = scope.get::<SyncSession>()?;
        let sync = &self.settings.sync;

        for exchange in engine.exchanges() {
            let name = exchange.name().to_string();

            let outcome = match holdings.update_holdings(&name, sync.asset_class).await {
                Ok(updated) => session.record_holdings(&name, updated.total_usd_value),
                Err(e) => {
                    warn!("更新持仓失败: {} - {}", name, e);
                    session.record_failure(format!("{}: {}", name, e))
                }
            };
            outcome.map_err(session_error)?;

            let outcome = match withdrawals
                .fetch_withdrawal_history(&name, &sync.withdrawal_currency, sync.asset_class)
                .await
            {
                Ok(history) => session.record_withdrawals(history.len()),
                Err(e) => {
                    warn!("拉取提现历史失败: {} - {}", name, e);
                    session.record_failure(format!("{}: {}", name, e))
                }
            };
            outcome.map_err(session_error)?;
        }

        let summary = session.summary();
        let report = scope.dispose();
        for failure in &report.failures {
            error!("同步周期收尾失败: {}", failure);
        }

        let cycle = self.cycles.fetch_add(1, Ordering::Relaxed) + 1;
        info!(
            "同步周期 #{} 完成: {} 个交易所, 总价值 {:.2} USD",
            cycle,
            summary.exchanges_updated.len(),
            summary.total_usd_value
        );
        Ok(summary)
    }

    /// 关闭应用
    ///
    /// 释放所有残留作用域，停止引擎并关闭仓储。
    pub async fn shutdown(&self) -> InfrastructureResult<()> {
        let reports = self.container.dispose_all_scopes();
        if !reports.is_empty() {
            warn!("关闭时释放了 {} 个残留作用域", reports.len());
        }

        if let Some(engine) = self.container.try_get::<dyn EngineService>() {
            engine
                .stop()
                .await
                .map_err(|e| InfrastructureError::ShutdownFailed {
                    message: format!("引擎停止失败: {}", e),
                })?;
        }

        if let Some(repository) = self.container.try_get::<dyn RepositoryService>() {
            repository
                .close()
                .await
                .map_err(|e| InfrastructureError::ShutdownFailed {
                    message: format!("仓储关闭失败: {}", e),
                })?;
        }

        let stats = self.container.stats();
        info!(
            "应用已关闭: {} 次解析, 缓存命中率 {:.1}%, {} 个作用域",
            stats.resolutions,
            stats.hit_rate() * 100.0,
            stats.scopes_created
        );
        Ok(())
    }
}

fn session_error(e: crate::errors::ServiceError) -> InfrastructureError {
    InfrastructureError::BootstrapFailed {
        message: format!("同步会话异常: {}", e),
    }
}
