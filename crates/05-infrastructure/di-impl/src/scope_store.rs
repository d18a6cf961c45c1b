//! 作用域存储
//!
//! 每个作用域内按服务类型划分槽位，每个槽位是一个独立的一次性初始化单元。
//! 访问槽位时只短暂持有 `DashMap` 的分片锁，工厂运行期间不持有任何存储锁。

use crate::descriptor::SharedInstance;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use infrastructure_common::{BoxError, DependencyError, ScopeInfo, ServiceTypeInfo};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::any::TypeId;
use std::sync::Arc;
use tracing::{debug, error};

pub(crate) type Slot = Arc<OnceCell<SharedInstance>>;

/// 单个作用域
pub(crate) struct ScopeEntry {
    id: String,
    created_at: DateTime<Utc>,
    slots: DashMap<TypeId, Slot>,
    /// 按创建顺序记录的实例
    created: Mutex<Vec<(ServiceTypeInfo, SharedInstance)>>,
}

impl ScopeEntry {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            created_at: Utc::now(),
            slots: DashMap::new(),
            created: Mutex::new(Vec::new()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// 获取或创建服务槽位
    pub fn slot(&self, type_id: TypeId) -> Slot {
        // 先克隆出 Arc 再释放分片锁
        let slot = self.slots.entry(type_id).or_default();
        Arc::clone(slot.value())
    }

    /// 记录新创建的实例
    pub fn record(&self, type_info: ServiceTypeInfo, instance: SharedInstance) {
        self.created.lock().push((type_info, instance));
    }

    pub fn instance_count(&self) -> usize {
        self.created.lock().len()
    }

    pub fn info(&self) -> ScopeInfo {
        ScopeInfo {
            id: self.id.clone(),
            created_at: self.created_at,
            instance_count: self.instance_count(),
        }
    }

    /// 按创建顺序的逆序释放全部实例
    ///
    /// 返回被释放的实例数量和失败列表
    fn dispose_all(&self) -> (usize, Vec<DependencyError>) {
        let instances = std::mem::take(&mut *self.created.lock());
        self.slots.clear();

        let mut failures = Vec::new();
        let count = instances.len();
        for (type_info, instance) in instances.into_iter().rev() {
            match instance.dispose() {
                None => {}
                Some(Ok(())) => debug!("已释放作用域实例: {} (作用域 {})", type_info, self.id),
                Some(Err(source)) => failures.push(self.disposal_failed(type_info, source)),
            }
        }
        (count, failures)
    }

    fn disposal_failed(&self, type_info: ServiceTypeInfo, source: BoxError) -> DependencyError {
        let err = DependencyError::DisposalFailed {
            type_name: type_info.to_string(),
            scope_id: self.id.clone(),
            source,
        };
        error!("{}", err);
        err
    }
}

/// 作用域存储
#[derive(Default)]
pub(crate) struct ScopeStore {
    scopes: DashMap<String, Arc<ScopeEntry>>,
}

impl ScopeStore {
    /// 获取作用域，不存在时创建
    ///
    /// 返回作用域以及它是否为本次新建
    pub fn get_or_create(&self, scope_id: &str) -> (Arc<ScopeEntry>, bool) {
        if let Some(entry) = self.scopes.get(scope_id) {
            return (Arc::clone(entry.value()), false);
        }

        let mut created = false;
        let entry = self
            .scopes
            .entry(scope_id.to_string())
            .or_insert_with(|| {
                created = true;
                Arc::new(ScopeEntry::new(scope_id))
            });
        (Arc::clone(entry.value()), created)
    }

    pub fn contains(&self, scope_id: &str) -> bool {
        self.scopes.contains_key(scope_id)
    }

    pub fn get(&self, scope_id: &str) -> Option<Arc<ScopeEntry>> {
        self.scopes.get(scope_id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn ids(&self) -> Vec<String> {
        self.scopes.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// 移除作用域并释放其中的实例
    ///
    /// 作用域先从存储中摘除再释放，之后对同一标识的访问会得到全新的作用域。
    pub fn remove_and_dispose(&self, scope_id: &str) -> Option<(usize, Vec<DependencyError>)> {
        let (_, entry) = self.scopes.remove(scope_id)?;
        Some(entry.dispose_all())
    }
}
