//! 持仓服务

use crate::contracts::{EngineService, HoldingsService, RepositoryService};
use crate::errors::{ServiceError, ServiceResult};
use crate::models::{AccountHoldings, AssetClass, CurrencyBalance};
use async_trait::async_trait;
use chrono::Utc;
use infrastructure_common::Service;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info};

/// 默认持仓服务
///
/// 稳定币按面值估值，其他币种使用配置的参考价格，没有参考价格的币种估值为零。
pub struct DefaultHoldingsService {
    engine: Arc<dyn EngineService>,
    repository: Arc<dyn RepositoryService>,
    reference_prices: BTreeMap<String, f64>,
    cache: RwLock<HashMap<(String, AssetClass), AccountHoldings>>,
}

impl DefaultHoldingsService {
    pub fn new(
        engine: Arc<dyn EngineService>,
        repository: Arc<dyn RepositoryService>,
        reference_prices: &BTreeMap<String, f64>,
    ) -> Self {
        Self {
            engine,
            repository,
            reference_prices: reference_prices
                .iter()
                .map(|(currency, price)| (currency.to_uppercase(), *price))
                .collect(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn value(&self, mut balance: CurrencyBalance) -> CurrencyBalance {
        balance.usd_value = if balance.is_stable() {
            balance.total
        } else {
            match self.reference_prices.get(&balance.currency) {
                Some(price) => balance.total * price,
                None => {
                    debug!("缺少参考价格: {}", balance.currency);
                    0.0
                }
            }
        };
        balance
    }
}

impl Service for DefaultHoldingsService {}

#[async_trait]
impl HoldingsService for DefaultHoldingsService {
    async fn update_holdings(
        &self,
        exchange: &str,
        asset_class: AssetClass,
    ) -> ServiceResult<AccountHoldings> {
        let connection = self.engine.exchange_by_name(exchange)?;
        let snapshot = connection.update_account_info(asset_class).await?;

        let balances: BTreeMap<_, _> = snapshot
            .balances
            .into_iter()
            .map(|balance| {
                let balance = self.value(balance);
                (balance.currency.clone(), balance)
            })
            .collect();
        let total_usd_value: f64 = balances.values().map(|b| b.usd_value).sum();

        let holdings = AccountHoldings {
            exchange: snapshot.exchange,
            asset_class,
            balances,
            last_updated: Utc::now(),
            total_usd_value,
        };

        self.cache
            .write()
            .insert((exchange.to_string(), asset_class), holdings.clone());
        self.repository.insert_holdings(&holdings).await?;

        info!(
            "更新持仓: {} {} 总价值 {:.2} USD",
            exchange, asset_class, holdings.total_usd_value
        );
        Ok(holdings)
    }

    fn holdings(&self, exchange: &str, asset_class: AssetClass) -> ServiceResult<AccountHoldings> {
        self.cache
            .read()
            .get(&(exchange.to_string(), asset_class))
            .cloned()
            .ok_or_else(|| ServiceError::HoldingsNotFound {
                exchange: exchange.to_string(),
                asset_class,
            })
    }
}
