//! 业务服务错误类型

use crate::models::AssetClass;
use thiserror::Error;

/// 业务服务错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    #[error("交易所不存在: {name}")]
    ExchangeNotFound { name: String },

    #[error("没有找到持仓: {exchange} {asset_class}")]
    HoldingsNotFound {
        exchange: String,
        asset_class: AssetClass,
    },

    #[error("引擎未运行")]
    EngineNotRunning,

    #[error("仓储错误: {message}")]
    Repository { message: String },

    #[error("同步会话已关闭: {session_id}")]
    SessionClosed { session_id: String },
}

impl ServiceError {
    /// 创建仓储错误
    pub fn repository(message: impl Into<String>) -> Self {
        Self::Repository {
            message: message.into(),
        }
    }
}

/// 业务服务结果类型
pub type ServiceResult<T> = Result<T, ServiceError>;
