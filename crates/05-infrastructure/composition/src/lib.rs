//! # 基础设施组合层
//!
//! 组合根：加载配置、初始化日志，并把各个服务注册到服务容器中。
//!
//! ## 主要功能
//!
//! - **配置加载**: 默认值 -> 配置文件 -> `DELTA_` 前缀的环境变量
//! - **日志初始化**: 基于 `tracing-subscriber`，`LOG_LEVEL` 可覆盖配置的级别
//! - **服务注册**: 引擎、仓储、持仓和提现服务注册为共享服务，同步会话按作用域创建
//! - **应用运行时**: 每个同步周期在独立的作用域中执行
//!
//! ## 基本使用
//!
//! ```rust,no_run
//! use infrastructure_composition::{init_logging, AppSettings, Application};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = AppSettings::load(None)?;
//!     init_logging(&settings.logging)?;
//!
//!     let app = Application::bootstrap(settings)?;
//!     app.start().await?;
//!
//!     let summary = app.run_sync_cycle().await?;
//!     println!("同步了 {} 个交易所", summary.exchanges_updated.len());
//!
//!     app.shutdown().await?;
//!     Ok(())
//! }
//! ```

pub mod application;
pub mod contracts;
pub mod errors;
pub mod logging;
pub mod models;
pub mod registration;
pub mod services;
pub mod settings;

#[cfg(test)]
mod tests;

// 重新导出主要类型
pub use application::Application;
pub use contracts::{
    EngineService, ExchangeService, HoldingsService, RepositoryService, WithdrawalService,
};
pub use errors::{ServiceError, ServiceResult};
pub use logging::{init_logging, LoggingSettings};
pub use models::{
    AccountHoldings, AccountSnapshot, AssetClass, CurrencyBalance, SyncSummary, WithdrawalRecord,
};
pub use registration::ServiceRegistration;
pub use services::SyncSession;
pub use settings::{AppSettings, EngineSettings, ExchangeSettings, RepositorySettings, SyncSettings};

// 重新导出错误类型
pub use infrastructure_common::InfrastructureError;
