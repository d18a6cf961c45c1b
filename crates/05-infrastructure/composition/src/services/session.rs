//! 同步会话
//!
//! 每个同步周期一个会话，按作用域创建，作用域释放时关闭。

use crate::errors::{ServiceError, ServiceResult};
use crate::models::{AssetClass, SyncSummary};
use chrono::{DateTime, Utc};
use infrastructure_common::{BoxError, Disposable, Service};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

#[derive(Debug, Default)]
struct SessionState {
    exchanges_updated: Vec<String>,
    total_usd_value: f64,
    withdrawals_stored: usize,
    failures: Vec<String>,
}

/// 同步会话
#[derive(Debug)]
pub struct SyncSession {
    id: String,
    asset_class: AssetClass,
    started_at: DateTime<Utc>,
    state: Mutex<SessionState>,
    closed: AtomicBool,
}

impl SyncSession {
    pub fn new(asset_class: AssetClass) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            asset_class,
            started_at: Utc::now(),
            state: Mutex::new(SessionState::default()),
            closed: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn asset_class(&self) -> AssetClass {
        self.asset_class
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// 记录一个交易所的持仓更新
    pub fn record_holdings(&self, exchange: &str, usd_value: f64) -> ServiceResult<()> {
        self.ensure_open()?;
        let mut state = self.state.lock();
        state.exchanges_updated.push(exchange.to_string());
        state.total_usd_value += usd_value;
        Ok(())
    }

    /// 记录新保存的提现数量
    pub fn record_withdrawals(&self, count: usize) -> ServiceResult<()> {
        self.ensure_open()?;
        self.state.lock().withdrawals_stored += count;
        Ok(())
    }

    /// 记录失败
    pub fn record_failure(&self, message: impl Into<String>) -> ServiceResult<()> {
        self.ensure_open()?;
        self.state.lock().failures.push(message.into());
        Ok(())
    }

    /// 当前汇总
    pub fn summary(&self) -> SyncSummary {
        let state = self.state.lock();
        SyncSummary {
            session_id: self.id.clone(),
            exchanges_updated: state.exchanges_updated.clone(),
            total_usd_value: state.total_usd_value,
            withdrawals_stored: state.withdrawals_stored,
            failures: state.failures.clone(),
            started_at: self.started_at,
        }
    }

    fn ensure_open(&self) -> ServiceResult<()> {
        if self.is_closed() {
            Err(ServiceError::SessionClosed {
                session_id: self.id.clone(),
            })
        } else {
            Ok(())
        }
    }
}

impl Service for SyncSession {
    fn as_disposable(&self) -> Option<&dyn Disposable> {
        Some(self)
    }
}

impl Disposable for SyncSession {
    fn dispose(&self) -> Result<(), BoxError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Err(Box::new(ServiceError::SessionClosed {
                session_id: self.id.clone(),
            }));
        }

        let summary = self.summary();
        info!(
            "同步会话结束: {} ({} 个交易所, {} 条新提现, {} 个失败, 耗时 {} ms)",
            self.id,
            summary.exchanges_updated.len(),
            summary.withdrawals_stored,
            summary.failures.len(),
            (Utc::now() - self.started_at).num_milliseconds()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_records_and_closes() {
        let session = SyncSession::new(AssetClass::Spot);
        session.record_holdings("bybit", 3500.0).unwrap();
        session.record_withdrawals(2).unwrap();

        let summary = session.summary();
        assert_eq!(summary.exchanges_updated, vec!["bybit".to_string()]);
        assert_eq!(summary.withdrawals_stored, 2);
        assert!(summary.is_success());

        assert!(session.as_disposable().is_some());
        Disposable::dispose(&session).unwrap();
        assert!(session.is_closed());
        assert!(matches!(
            session.record_failure("late"),
            Err(ServiceError::SessionClosed { .. })
        ));
        // 重复关闭报告错误
        assert!(Disposable::dispose(&session).is_err());
    }
}
