//! 日志初始化

use infrastructure_common::{InfrastructureError, InfrastructureResult};
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 覆盖日志级别的环境变量
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

/// 日志配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// 日志级别或过滤指令，例如 `info` 或 `di_impl=debug,info`
    pub level: String,
    /// 是否显示目标
    pub show_target: bool,
    /// 是否显示线程ID
    pub show_thread_ids: bool,
    /// 是否使用 JSON 格式
    pub json_format: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            show_target: true,
            show_thread_ids: false,
            json_format: false,
        }
    }
}

impl LoggingSettings {
    /// 开发环境日志配置
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            show_target: true,
            show_thread_ids: true,
            json_format: false,
        }
    }

    /// 生产环境日志配置
    pub fn production() -> Self {
        Self {
            level: "info".to_string(),
            show_target: false,
            show_thread_ids: false,
            json_format: true,
        }
    }

    /// 实际生效的日志级别，`LOG_LEVEL` 优先
    pub fn effective_level(&self) -> String {
        self.resolve_level(std::env::var(LOG_LEVEL_ENV).ok())
    }

    fn resolve_level(&self, override_level: Option<String>) -> String {
        override_level
            .map(|level| level.trim().to_string())
            .filter(|level| !level.is_empty())
            .unwrap_or_else(|| self.level.clone())
    }
}

/// 初始化全局日志
///
/// 全局订阅者只能设置一次，重复调用返回 `LoggingFailed`。
pub fn init_logging(settings: &LoggingSettings) -> InfrastructureResult<()> {
    let level = settings.effective_level();
    let filter = EnvFilter::try_new(&level).map_err(|e| InfrastructureError::LoggingFailed {
        message: format!("无效的日志级别 {}: {}", level, e),
    })?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(settings.show_target)
        .with_thread_ids(settings.show_thread_ids);

    let result = if settings.json_format {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| InfrastructureError::LoggingFailed {
        message: e.to_string(),
    })?;

    info!("日志系统初始化完成，级别: {}", level);
    Ok(())
}
