//! 内存仓储

use crate::contracts::RepositoryService;
use crate::errors::{ServiceError, ServiceResult};
use crate::models::{AccountHoldings, WithdrawalRecord};
use crate::settings::RepositorySettings;
use async_trait::async_trait;
use infrastructure_common::Service;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

const SUPPORTED_SCHEMES: [&str; 4] = ["http::", "https::", "tcp::", "tcps::"];

/// 内存仓储
///
/// 与时序数据库使用相同格式的连接字符串，数据只保存在内存中。
/// 提现记录按 `transfer_id` 去重。
#[derive(Debug)]
pub struct InMemoryRepository {
    connection: String,
    holdings: RwLock<Vec<AccountHoldings>>,
    withdrawals: RwLock<BTreeMap<String, Vec<WithdrawalRecord>>>,
    closed: AtomicBool,
}

impl InMemoryRepository {
    /// 校验连接字符串并创建仓储
    pub fn connect(settings: &RepositorySettings) -> ServiceResult<Self> {
        let connection = settings.connection.trim();
        if !SUPPORTED_SCHEMES
            .iter()
            .any(|scheme| connection.starts_with(scheme))
        {
            return Err(ServiceError::repository(format!(
                "无效的连接字符串: {:?}",
                settings.connection
            )));
        }

        info!("连接仓储: {}", connection);
        Ok(Self {
            connection: connection.to_string(),
            holdings: RwLock::new(Vec::new()),
            withdrawals: RwLock::new(BTreeMap::new()),
            closed: AtomicBool::new(false),
        })
    }

    pub fn connection(&self) -> &str {
        &self.connection
    }

    /// 已写入的持仓快照数量
    pub fn holdings_count(&self) -> usize {
        self.holdings.read().len()
    }

    /// 某交易所已保存的提现记录
    pub fn withdrawals_for(&self, exchange: &str) -> Vec<WithdrawalRecord> {
        self.withdrawals
            .read()
            .get(exchange)
            .cloned()
            .unwrap_or_default()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> ServiceResult<()> {
        if self.is_closed() {
            Err(ServiceError::repository("仓储连接已关闭"))
        } else {
            Ok(())
        }
    }
}

impl Service for InMemoryRepository {}

#[async_trait]
impl RepositoryService for InMemoryRepository {
    async fn insert_holdings(&self, holdings: &AccountHoldings) -> ServiceResult<()> {
        self.ensure_open()?;
        self.holdings.write().push(holdings.clone());
        debug!("写入持仓: {} {}", holdings.exchange, holdings.asset_class);
        Ok(())
    }

    async fn store_withdrawals(
        &self,
        exchange: &str,
        withdrawals: &[WithdrawalRecord],
    ) -> ServiceResult<usize> {
        self.ensure_open()?;

        let mut stored = self.withdrawals.write();
        let records = stored.entry(exchange.to_string()).or_default();
        let mut inserted = 0;
        for withdrawal in withdrawals {
            if records.iter().any(|r| r.transfer_id == withdrawal.transfer_id) {
                continue;
            }
            records.push(withdrawal.clone());
            inserted += 1;
        }

        debug!("保存提现记录: {} 新增 {} 条", exchange, inserted);
        Ok(inserted)
    }

    async fn close(&self) -> ServiceResult<()> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            info!("仓储连接已关闭: {}", self.connection);
        }
        Ok(())
    }
}
