//! 服务契约
//!
//! 组合根通过这些 trait 对象在容器中注册和解析服务，具体实现可以替换。

use crate::errors::ServiceResult;
use crate::models::{AccountHoldings, AccountSnapshot, AssetClass, WithdrawalRecord};
use async_trait::async_trait;
use infrastructure_common::Service;
use std::sync::Arc;

/// 交易所连接
#[async_trait]
pub trait ExchangeService: Service {
    /// 交易所名称
    fn name(&self) -> &str;

    /// 拉取最新账户信息
    async fn update_account_info(&self, asset_class: AssetClass) -> ServiceResult<AccountSnapshot>;

    /// 拉取提现历史
    async fn withdrawal_history(
        &self,
        currency: &str,
        asset_class: AssetClass,
    ) -> ServiceResult<Vec<WithdrawalRecord>>;
}

/// 交易引擎
#[async_trait]
pub trait EngineService: Service {
    /// 所有启用的交易所
    fn exchanges(&self) -> Vec<Arc<dyn ExchangeService>>;

    /// 按名称查找交易所
    fn exchange_by_name(&self, name: &str) -> ServiceResult<Arc<dyn ExchangeService>>;

    async fn start(&self) -> ServiceResult<()>;

    async fn stop(&self) -> ServiceResult<()>;

    fn is_running(&self) -> bool;
}

/// 时序数据仓储
#[async_trait]
pub trait RepositoryService: Service {
    /// 写入一条持仓快照
    async fn insert_holdings(&self, holdings: &AccountHoldings) -> ServiceResult<()>;

    /// 保存提现记录，返回新写入的数量
    async fn store_withdrawals(
        &self,
        exchange: &str,
        withdrawals: &[WithdrawalRecord],
    ) -> ServiceResult<usize>;

    /// 关闭连接
    async fn close(&self) -> ServiceResult<()>;
}

/// 持仓服务
#[async_trait]
pub trait HoldingsService: Service {
    /// 从交易所刷新持仓、估值并写入仓储
    async fn update_holdings(
        &self,
        exchange: &str,
        asset_class: AssetClass,
    ) -> ServiceResult<AccountHoldings>;

    /// 读取缓存的持仓
    fn holdings(&self, exchange: &str, asset_class: AssetClass) -> ServiceResult<AccountHoldings>;
}

/// 提现服务
#[async_trait]
pub trait WithdrawalService: Service {
    /// 拉取提现历史并写入仓储
    async fn fetch_withdrawal_history(
        &self,
        exchange: &str,
        currency: &str,
        asset_class: AssetClass,
    ) -> ServiceResult<Vec<WithdrawalRecord>>;
}
