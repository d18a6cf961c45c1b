//! 提现服务

use crate::contracts::{EngineService, RepositoryService, WithdrawalService};
use crate::errors::ServiceResult;
use crate::models::{AssetClass, WithdrawalRecord};
use async_trait::async_trait;
use infrastructure_common::Service;
use std::sync::Arc;
use tracing::info;

/// 默认提现服务
pub struct DefaultWithdrawalService {
    engine: Arc<dyn EngineService>,
    repository: Arc<dyn RepositoryService>,
}

impl DefaultWithdrawalService {
    pub fn new(engine: Arc<dyn EngineService>, repository: Arc<dyn RepositoryService>) -> Self {
        Self { engine, repository }
    }
}

impl Service for DefaultWithdrawalService {}

#[async_trait]
impl WithdrawalService for DefaultWithdrawalService {
    async fn fetch_withdrawal_history(
        &self,
        exchange: &str,
        currency: &str,
        asset_class: AssetClass,
    ) -> ServiceResult<Vec<WithdrawalRecord>> {
        let connection = self.engine.exchange_by_name(exchange)?;
        let history = connection.withdrawal_history(currency, asset_class).await?;
        let inserted = self.repository.store_withdrawals(exchange, &history).await?;

        info!(
            "保存提现历史: {} {} ({} 条, 新增 {})",
            exchange,
            currency,
            history.len(),
            inserted
        );
        Ok(history)
    }
}
