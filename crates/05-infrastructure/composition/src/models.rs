//! 领域模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 账户资产类别
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    #[default]
    Spot,
    Margin,
    Futures,
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Spot => "spot",
            Self::Margin => "margin",
            Self::Futures => "futures",
        };
        f.write_str(name)
    }
}

/// 单个币种余额
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyBalance {
    /// 币种代码
    pub currency: String,
    /// 总量
    pub total: f64,
    /// 冻结数量
    pub hold: f64,
    /// 可用数量
    pub free: f64,
    /// 折算的美元价值
    pub usd_value: f64,
}

impl CurrencyBalance {
    /// 创建未估值的余额，冻结数量为零
    pub fn new(currency: impl Into<String>, total: f64) -> Self {
        Self {
            currency: currency.into(),
            total,
            hold: 0.0,
            free: total,
            usd_value: 0.0,
        }
    }

    /// 是否为稳定币
    pub fn is_stable(&self) -> bool {
        matches!(
            self.currency.as_str(),
            "USD" | "USDT" | "USDC" | "DAI" | "BUSD" | "TUSD"
        )
    }
}

/// 交易所返回的账户快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    /// 交易所名称
    pub exchange: String,
    /// 资产类别
    pub asset_class: AssetClass,
    /// 各币种余额
    pub balances: Vec<CurrencyBalance>,
}

/// 估值后的账户持仓
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountHoldings {
    /// 交易所名称
    pub exchange: String,
    /// 资产类别
    pub asset_class: AssetClass,
    /// 币种 -> 余额
    pub balances: BTreeMap<String, CurrencyBalance>,
    /// 更新时间
    pub last_updated: DateTime<Utc>,
    /// 总美元价值
    pub total_usd_value: f64,
}

/// 提现记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalRecord {
    pub exchange: String,
    pub transfer_id: String,
    pub status: String,
    pub currency: String,
    pub amount: f64,
    pub fee: f64,
    pub timestamp: DateTime<Utc>,
}

/// 同步周期汇总
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncSummary {
    /// 会话标识
    pub session_id: String,
    /// 成功更新持仓的交易所
    pub exchanges_updated: Vec<String>,
    /// 全部交易所的总美元价值
    pub total_usd_value: f64,
    /// 新保存的提现记录数量
    pub withdrawals_stored: usize,
    /// 失败信息
    pub failures: Vec<String>,
    /// 会话开始时间
    pub started_at: DateTime<Utc>,
}

impl SyncSummary {
    /// 本周期是否没有失败
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}
