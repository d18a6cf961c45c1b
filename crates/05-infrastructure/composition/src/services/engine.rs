//! 模拟交易引擎

use crate::contracts::{EngineService, ExchangeService};
use crate::errors::{ServiceError, ServiceResult};
use crate::models::{AccountSnapshot, AssetClass, CurrencyBalance, WithdrawalRecord};
use crate::settings::{EngineSettings, ExchangeSettings};
use async_trait::async_trait;
use chrono::Utc;
use infrastructure_common::Service;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// 由配置驱动的模拟交易所
#[derive(Debug)]
pub struct SimulatedExchange {
    name: String,
    balances: RwLock<BTreeMap<String, f64>>,
    withdrawals: Vec<WithdrawalRecord>,
}

impl SimulatedExchange {
    /// 从配置创建，币种代码统一为大写
    pub fn from_settings(settings: &ExchangeSettings) -> Self {
        let balances = settings
            .balances
            .iter()
            .map(|(currency, amount)| (currency.to_uppercase(), *amount))
            .collect();

        let created_at = Utc::now();
        let withdrawals = settings
            .withdrawals
            .iter()
            .enumerate()
            .map(|(index, w)| WithdrawalRecord {
                exchange: settings.name.clone(),
                transfer_id: format!("{}-{}", settings.name, index + 1),
                status: "completed".to_string(),
                currency: w.currency.to_uppercase(),
                amount: w.amount,
                fee: w.fee,
                timestamp: created_at,
            })
            .collect();

        Self {
            name: settings.name.clone(),
            balances: RwLock::new(balances),
            withdrawals,
        }
    }

    /// 调整余额，测试中模拟账户变化
    pub fn set_balance(&self, currency: &str, amount: f64) {
        self.balances.write().insert(currency.to_uppercase(), amount);
    }
}

impl Service for SimulatedExchange {}

#[async_trait]
impl ExchangeService for SimulatedExchange {
    fn name(&self) -> &str {
        &self.name
    }

    async fn update_account_info(&self, asset_class: AssetClass) -> ServiceResult<AccountSnapshot> {
        let balances = self
            .balances
            .read()
            .iter()
            .map(|(currency, amount)| CurrencyBalance::new(currency.clone(), *amount))
            .collect();

        debug!("拉取账户信息: {} {}", self.name, asset_class);
        Ok(AccountSnapshot {
            exchange: self.name.clone(),
            asset_class,
            balances,
        })
    }

    async fn withdrawal_history(
        &self,
        currency: &str,
        _asset_class: AssetClass,
    ) -> ServiceResult<Vec<WithdrawalRecord>> {
        let currency = currency.to_uppercase();
        Ok(self
            .withdrawals
            .iter()
            .filter(|w| w.currency == currency)
            .cloned()
            .collect())
    }
}

/// 模拟交易引擎，持有配置中的全部交易所
pub struct SimulatedEngine {
    exchanges: Vec<Arc<SimulatedExchange>>,
    running: AtomicBool,
}

impl SimulatedEngine {
    pub fn new(settings: &EngineSettings) -> Self {
        let exchanges = settings
            .exchanges
            .iter()
            .map(|exchange| Arc::new(SimulatedExchange::from_settings(exchange)))
            .collect::<Vec<_>>();

        info!("创建交易引擎，{} 个交易所", exchanges.len());
        Self {
            exchanges,
            running: AtomicBool::new(false),
        }
    }

    /// 按名称获取具体的模拟交易所
    pub fn simulated(&self, name: &str) -> Option<Arc<SimulatedExchange>> {
        self.exchanges
            .iter()
            .find(|exchange| exchange.name.eq_ignore_ascii_case(name))
            .cloned()
    }
}

impl Service for SimulatedEngine {}

#[async_trait]
impl EngineService for SimulatedEngine {
    fn exchanges(&self) -> Vec<Arc<dyn ExchangeService>> {
        self.exchanges
            .iter()
            .map(|exchange| Arc::clone(exchange) as Arc<dyn ExchangeService>)
            .collect()
    }

    fn exchange_by_name(&self, name: &str) -> ServiceResult<Arc<dyn ExchangeService>> {
        self.simulated(name)
            .map(|exchange| exchange as Arc<dyn ExchangeService>)
            .ok_or_else(|| ServiceError::ExchangeNotFound {
                name: name.to_string(),
            })
    }

    async fn start(&self) -> ServiceResult<()> {
        if !self.running.swap(true, Ordering::SeqCst) {
            info!("交易引擎已启动");
        }
        Ok(())
    }

    async fn stop(&self) -> ServiceResult<()> {
        if self.running.swap(false, Ordering::SeqCst) {
            info!("交易引擎已停止");
        }
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}
