//! # 健康状态存储
//!
//! 内存缓存 + 数据库双写。启动时从 `health` 表全量加载，之后所有读取只走缓存。
//!
//! 写入顺序固定为“先改缓存，再写库”。写库失败时执行补偿：仅当缓存中仍是本次写入的
//! 那条记录（`Arc::ptr_eq`）时才恢复旧值，避免覆盖并发写入者的成功结果。

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use entity::health;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter, Set};

use super::types::{HealthKey, HealthRecord, HealthStatus, ResourceType, StatusCounts};
use crate::error::{HealthError, Result};
use crate::logging::{LogComponent, LogStage};
use crate::{ensure, ldebug, lerror, linfo, lwarn};

/// 健康状态存储：进程内唯一的健康状态事实来源
pub struct HealthStorage {
    db: Arc<DatabaseConnection>,
    cache: DashMap<HealthKey, Arc<HealthRecord>>,
}

impl HealthStorage {
    /// 创建存储并从数据库加载全部健康记录
    ///
    /// 加载失败时返回 `Startup` 错误，调用方应中止启动。
    pub async fn new(db: Arc<DatabaseConnection>) -> Result<Self> {
        let storage = Self {
            db,
            cache: DashMap::new(),
        };
        storage.load_all().await?;
        Ok(storage)
    }

    /// 从数据库加载全部记录并替换缓存内容，返回加载条数
    ///
    /// 仅用于启动阶段。资源类型或状态取值非法的行会被跳过并告警。
    pub async fn load_all(&self) -> Result<usize> {
        let rows = health::Entity::find()
            .all(self.db.as_ref())
            .await
            .map_err(|e| HealthError::startup_with_source("加载健康状态表失败", e))?;

        self.cache.clear();

        let mut skipped = 0usize;
        for row in rows {
            let row_id = row.id;
            match HealthRecord::try_from(row) {
                Ok(record) => {
                    self.cache.insert(record.key(), Arc::new(record));
                }
                Err(e) => {
                    skipped += 1;
                    lwarn!(
                        "system",
                        LogStage::Startup,
                        LogComponent::HealthStorage,
                        "skip_invalid_row",
                        "跳过无法解析的健康记录",
                        row_id = row_id,
                        error = %e
                    );
                }
            }
        }

        let loaded = self.cache.len();
        linfo!(
            "system",
            LogStage::Startup,
            LogComponent::HealthStorage,
            "load_all",
            "健康状态缓存加载完成",
            loaded = loaded,
            skipped = skipped
        );
        Ok(loaded)
    }

    /// 查询单个资源的健康记录，仅读缓存；无记录即 Unknown
    #[must_use]
    pub fn get(&self, resource_type: ResourceType, resource_id: i32) -> Option<HealthRecord> {
        self.cache
            .get(&HealthKey::new(resource_type, resource_id))
            .map(|entry| entry.value().as_ref().clone())
    }

    /// 写入（整条替换）健康记录
    ///
    /// 状态为 `Unknown` 的记录会被拒绝：Unknown 只能通过删除得到。
    /// 计数与退避窗口不能为负。
    pub async fn set(&self, record: HealthRecord) -> Result<()> {
        ensure!(
            record.status.is_persistable(),
            "不能写入 unknown 状态的健康记录: {}",
            record.key()
        );
        ensure!(
            record.retry_count >= 0
                && record.success_count >= 0
                && record.error_count >= 0
                && record.backoff_duration >= 0,
            "健康记录的计数与退避窗口不能为负数: {}",
            record.key()
        );

        let key = record.key();
        let active = health::ActiveModel::from(&record);
        let written = Arc::new(record);
        let previous = self.cache.insert(key, Arc::clone(&written));

        let result = health::Entity::insert(active)
            .on_conflict(
                OnConflict::columns([health::Column::ResourceType, health::Column::ResourceId])
                    .update_columns([
                        health::Column::Status,
                        health::Column::RetryCount,
                        health::Column::NextAvailableAt,
                        health::Column::BackoffDuration,
                        health::Column::LastError,
                        health::Column::LastErrorCode,
                        health::Column::LastCheckAt,
                        health::Column::LastSuccessAt,
                        health::Column::SuccessCount,
                        health::Column::ErrorCount,
                        health::Column::CreatedAt,
                        health::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await;

        if let Err(e) = result {
            let restored = self.restore_after_failed_set(key, &written, previous);
            lerror!(
                "system",
                LogStage::Db,
                LogComponent::HealthStorage,
                "upsert_failed",
                "健康记录写库失败",
                key = %key,
                cache_restored = restored,
                error = %e
            );
            return Err(HealthError::persistence("upsert", key, e));
        }

        ldebug!(
            "system",
            LogStage::Db,
            LogComponent::HealthStorage,
            "upsert",
            "健康记录已写入",
            key = %key,
            status = %written.status
        );
        Ok(())
    }

    /// 删除健康记录，资源回到 Unknown；记录不存在时同样返回成功
    pub async fn delete(&self, resource_type: ResourceType, resource_id: i32) -> Result<()> {
        let key = HealthKey::new(resource_type, resource_id);
        let removed = self.cache.remove(&key).map(|(_, record)| record);

        let result = health::Entity::delete_many()
            .filter(health::Column::ResourceType.eq(resource_type.as_i16()))
            .filter(health::Column::ResourceId.eq(resource_id))
            .exec(self.db.as_ref())
            .await;

        match result {
            Ok(outcome) => {
                ldebug!(
                    "system",
                    LogStage::Db,
                    LogComponent::HealthStorage,
                    "delete",
                    "健康记录已删除",
                    key = %key,
                    rows_affected = outcome.rows_affected
                );
                Ok(())
            }
            Err(e) => {
                let restored = self.restore_after_failed_delete(key, removed);
                lerror!(
                    "system",
                    LogStage::Db,
                    LogComponent::HealthStorage,
                    "delete_failed",
                    "健康记录删除失败",
                    key = %key,
                    cache_restored = restored,
                    error = %e
                );
                Err(HealthError::persistence("delete", key, e))
            }
        }
    }

    /// 统计某类资源各状态数量（全量扫描缓存）
    #[must_use]
    pub fn count_by_resource_type(&self, resource_type: ResourceType) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for entry in self
            .cache
            .iter()
            .filter(|entry| entry.key().resource_type == resource_type)
        {
            match entry.value().status {
                HealthStatus::Available => counts.available += 1,
                HealthStatus::Warning => counts.warning += 1,
                HealthStatus::Unavailable => counts.unavailable += 1,
                HealthStatus::Unknown => {}
            }
        }
        counts
    }

    /// 获取某类资源的全部健康记录（无序）
    #[must_use]
    pub fn get_by_resource_type(&self, resource_type: ResourceType) -> Vec<HealthRecord> {
        self.collect(|record| record.resource_type == resource_type)
    }

    /// 获取全部资源中处于指定状态的记录（无序）
    #[must_use]
    pub fn get_by_status(&self, status: HealthStatus) -> Vec<HealthRecord> {
        self.collect(|record| record.status == status)
    }

    /// 缓存中的记录数
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    fn collect(&self, predicate: impl Fn(&HealthRecord) -> bool) -> Vec<HealthRecord> {
        self.cache
            .iter()
            .filter(|entry| predicate(entry.value()))
            .map(|entry| entry.value().as_ref().clone())
            .collect()
    }

    /// 仅当期间没有新写入时才放回被删除的记录
    fn restore_after_failed_delete(
        &self,
        key: HealthKey,
        removed: Option<Arc<HealthRecord>>,
    ) -> bool {
        match (removed, self.cache.entry(key)) {
            (Some(previous), Entry::Vacant(slot)) => {
                slot.insert(previous);
                true
            }
            _ => false,
        }
    }

    fn restore_after_failed_set(
        &self,
        key: HealthKey,
        written: &Arc<HealthRecord>,
        previous: Option<Arc<HealthRecord>>,
    ) -> bool {
        let Entry::Occupied(entry) = self.cache.entry(key) else {
            return false;
        };
        if !Arc::ptr_eq(entry.get(), written) {
            return false;
        }
        match previous {
            Some(previous) => {
                entry.replace_entry(previous);
            }
            None => {
                entry.remove();
            }
        }
        true
    }
}

impl TryFrom<health::Model> for HealthRecord {
    type Error = HealthError;

    fn try_from(row: health::Model) -> Result<Self> {
        let resource_type = ResourceType::from_i16(row.resource_type).ok_or_else(|| {
            crate::error!(Validation, "非法的资源类型: {}", row.resource_type)
        })?;
        let status = HealthStatus::from_i16(row.status)
            .filter(|status| status.is_persistable())
            .ok_or_else(|| crate::error!(Validation, "非法的健康状态: {}", row.status))?;

        Ok(Self {
            resource_type,
            resource_id: row.resource_id,
            status,
            retry_count: row.retry_count,
            next_available_at: row.next_available_at,
            backoff_duration: row.backoff_duration,
            last_error: row.last_error,
            last_error_code: row.last_error_code,
            last_check_at: row.last_check_at,
            last_success_at: row.last_success_at,
            success_count: row.success_count,
            error_count: row.error_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl From<&HealthRecord> for health::ActiveModel {
    fn from(record: &HealthRecord) -> Self {
        Self {
            id: NotSet,
            resource_type: Set(record.resource_type.as_i16()),
            resource_id: Set(record.resource_id),
            status: Set(record.status.as_i16()),
            retry_count: Set(record.retry_count),
            next_available_at: Set(record.next_available_at),
            backoff_duration: Set(record.backoff_duration),
            last_error: Set(record.last_error.clone()),
            last_error_code: Set(record.last_error_code),
            last_check_at: Set(record.last_check_at),
            last_success_at: Set(record.last_success_at),
            success_count: Set(record.success_count),
            error_count: Set(record.error_count),
            created_at: Set(record.created_at),
            updated_at: Set(record.updated_at),
        }
    }
}
