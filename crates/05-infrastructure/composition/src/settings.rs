//! 应用配置
//!
//! 配置按以下顺序叠加，后面的覆盖前面的：
//!
//! 1. 代码中的默认值
//! 2. 配置文件（未指定时尝试 `config/delta.*`，不存在则跳过）
//! 3. 环境变量，例如 `DELTA_SYNC__INTERVAL_SECS=60`

use crate::logging::LoggingSettings;
use crate::models::AssetClass;
use di_abstractions::ContainerOptions;
use infrastructure_common::{InfrastructureError, InfrastructureResult, Service};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// 默认环境变量前缀
pub const ENV_PREFIX: &str = "DELTA";

/// 默认配置文件（不含扩展名）
const DEFAULT_CONFIG_FILE: &str = "config/delta";

/// 应用配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// 服务容器配置
    pub container: ContainerOptions,
    /// 日志配置
    pub logging: LoggingSettings,
    /// 仓储配置
    pub repository: RepositorySettings,
    /// 引擎配置
    pub engine: EngineSettings,
    /// 同步配置
    pub sync: SyncSettings,
}

impl Service for AppSettings {}

impl AppSettings {
    /// 加载配置
    ///
    /// 指定的配置文件必须存在；未指定时使用可选的默认配置文件。
    pub fn load(path: Option<&Path>) -> InfrastructureResult<Self> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    /// 使用指定的环境变量前缀加载配置
    pub fn load_with_prefix(path: Option<&Path>, env_prefix: &str) -> InfrastructureResult<Self> {
        let mut builder = config::Config::builder();

        builder = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(InfrastructureError::ConfigurationFailed {
                        message: format!("配置文件不存在: {}", path.display()),
                    });
                }
                debug!("加载配置文件: {}", path.display());
                builder.add_source(config::File::from(path).required(true))
            }
            None => builder.add_source(config::File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };

        let settings = builder
            .add_source(
                config::Environment::with_prefix(env_prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| InfrastructureError::ConfigurationFailed {
                message: format!("配置构建失败: {}", e),
            })?;

        let settings: Self =
            settings
                .try_deserialize()
                .map_err(|e| InfrastructureError::ConfigurationFailed {
                    message: format!("配置绑定失败: {}", e),
                })?;

        settings.validate()?;
        Ok(settings)
    }

    /// 校验配置
    pub fn validate(&self) -> InfrastructureResult<()> {
        if self.container.max_resolution_depth == 0 {
            return Err(InfrastructureError::ConfigurationFailed {
                message: "container.max_resolution_depth 必须大于 0".to_string(),
            });
        }
        if self.sync.interval_secs == 0 {
            return Err(InfrastructureError::ConfigurationFailed {
                message: "sync.interval_secs 必须大于 0".to_string(),
            });
        }
        if let Some(exchange) = self.engine.exchanges.iter().find(|e| e.name.trim().is_empty()) {
            return Err(InfrastructureError::ConfigurationFailed {
                message: format!("交易所名称不能为空: {:?}", exchange),
            });
        }
        Ok(())
    }
}

/// 仓储配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositorySettings {
    /// 连接字符串，例如 `http::addr=localhost:9000;`
    pub connection: String,
}

impl Default for RepositorySettings {
    fn default() -> Self {
        Self {
            connection: "http::addr=localhost:9000;".to_string(),
        }
    }
}

/// 交易所配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeSettings {
    /// 交易所名称
    pub name: String,
    /// 初始余额：币种 -> 数量
    pub balances: BTreeMap<String, f64>,
    /// 历史提现
    pub withdrawals: Vec<WithdrawalSettings>,
}

/// 模拟的历史提现
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WithdrawalSettings {
    pub currency: String,
    pub amount: f64,
    pub fee: f64,
}

/// 引擎配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// 启用的交易所
    pub exchanges: Vec<ExchangeSettings>,
    /// 非稳定币的参考美元价格
    pub reference_prices: BTreeMap<String, f64>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        let bybit = ExchangeSettings {
            name: "bybit".to_string(),
            balances: BTreeMap::from([("USDT".to_string(), 1000.0), ("BTC".to_string(), 0.5)]),
            withdrawals: vec![WithdrawalSettings {
                currency: "USDT".to_string(),
                amount: 250.0,
                fee: 1.0,
            }],
        };

        Self {
            exchanges: vec![bybit],
            reference_prices: BTreeMap::from([("BTC".to_string(), 5000.0)]),
        }
    }
}

/// 同步配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// 同步间隔（秒）
    pub interval_secs: u64,
    /// 同步的资产类别
    pub asset_class: AssetClass,
    /// 拉取提现历史的币种
    pub withdrawal_currency: String,
}

impl SyncSettings {
    /// 同步间隔
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            interval_secs: 600,
            asset_class: AssetClass::Spot,
            withdrawal_currency: "USDT".to_string(),
        }
    }
}
