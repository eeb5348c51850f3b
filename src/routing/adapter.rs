//! # 路由健康状态适配器
//!
//! 路由引擎词汇与健康记录之间的逐字段转换，不含业务逻辑。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::{HealthRepository, HealthState, ResourceHealth, ResourceKind};
use crate::error::{HealthError, Result};
use crate::health::{HealthRecord, HealthStatus, HealthStorage, ResourceType};
use crate::ldebug;
use crate::logging::{LogComponent, LogStage};

/// 基于 `HealthStorage` 的 `HealthRepository` 实现，只做类型转换
pub struct RoutingHealthAdapter {
    storage: Arc<HealthStorage>,
}

impl RoutingHealthAdapter {
    #[must_use]
    pub const fn new(storage: Arc<HealthStorage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl HealthRepository for RoutingHealthAdapter {
    async fn get(&self, kind: ResourceKind, resource_id: i32) -> Result<Option<ResourceHealth>> {
        self.storage
            .get(kind.into(), resource_id)
            .map(ResourceHealth::try_from)
            .transpose()
    }

    async fn set(&self, health: ResourceHealth) -> Result<()> {
        let record = HealthRecord::try_from(health)?;
        ldebug!(
            "routing",
            LogStage::Routing,
            LogComponent::RoutingAdapter,
            "set",
            "路由引擎写入健康状态",
            key = %record.key(),
            status = %record.status
        );
        self.storage.set(record).await
    }

    async fn delete(&self, kind: ResourceKind, resource_id: i32) -> Result<()> {
        self.storage.delete(kind.into(), resource_id).await
    }
}

impl From<ResourceKind> for ResourceType {
    fn from(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::Platform => Self::Platform,
            ResourceKind::ApiKey => Self::ApiKey,
            ResourceKind::Model => Self::Model,
        }
    }
}

impl From<ResourceType> for ResourceKind {
    fn from(resource_type: ResourceType) -> Self {
        match resource_type {
            ResourceType::Platform => Self::Platform,
            ResourceType::ApiKey => Self::ApiKey,
            ResourceType::Model => Self::Model,
        }
    }
}

impl From<HealthState> for HealthStatus {
    fn from(state: HealthState) -> Self {
        match state {
            HealthState::Unknown => Self::Unknown,
            HealthState::Healthy => Self::Available,
            HealthState::Degraded => Self::Warning,
            HealthState::Unhealthy => Self::Unavailable,
        }
    }
}

impl From<HealthStatus> for HealthState {
    fn from(status: HealthStatus) -> Self {
        match status {
            HealthStatus::Unknown => Self::Unknown,
            HealthStatus::Available => Self::Healthy,
            HealthStatus::Warning => Self::Degraded,
            HealthStatus::Unavailable => Self::Unhealthy,
        }
    }
}

/// 计数与退避窗口在两侧的整数类型不同，越界视为校验错误。退避窗口按整秒存储。
impl TryFrom<ResourceHealth> for HealthRecord {
    type Error = HealthError;

    fn try_from(health: ResourceHealth) -> Result<Self> {
        Ok(Self {
            resource_type: health.kind.into(),
            resource_id: health.resource_id,
            status: health.state.into(),
            retry_count: to_i32("retry_count", health.retry_count)?,
            next_available_at: health.next_available_at,
            backoff_duration: i64::try_from(health.backoff.as_secs()).map_err(|_| {
                HealthError::validation(format!("backoff 超出范围: {:?}", health.backoff))
            })?,
            last_error: health.last_error,
            last_error_code: health.last_error_code,
            last_check_at: health.last_check_at,
            last_success_at: health.last_success_at,
            success_count: to_i32("success_count", health.success_count)?,
            error_count: to_i32("error_count", health.error_count)?,
            created_at: health.created_at,
            updated_at: health.updated_at,
        })
    }
}

impl TryFrom<HealthRecord> for ResourceHealth {
    type Error = HealthError;

    fn try_from(record: HealthRecord) -> Result<Self> {
        Ok(Self {
            kind: record.resource_type.into(),
            resource_id: record.resource_id,
            state: record.status.into(),
            retry_count: to_u32("retry_count", record.retry_count)?,
            next_available_at: record.next_available_at,
            backoff: u64::try_from(record.backoff_duration)
                .map(Duration::from_secs)
                .map_err(|_| {
                    HealthError::validation(format!(
                        "backoff_duration 不能为负数: {}",
                        record.backoff_duration
                    ))
                })?,
            last_error: record.last_error,
            last_error_code: record.last_error_code,
            last_check_at: record.last_check_at,
            last_success_at: record.last_success_at,
            success_count: to_u32("success_count", record.success_count)?,
            error_count: to_u32("error_count", record.error_count)?,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

fn to_i32(field: &str, value: u32) -> Result<i32> {
    i32::try_from(value)
        .map_err(|_| HealthError::validation(format!("{field} 超出范围: {value}")))
}

fn to_u32(field: &str, value: i32) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| HealthError::validation(format!("{field} 不能为负数: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::create_test_db;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn engine_health(kind: ResourceKind, resource_id: i32, state: HealthState) -> ResourceHealth {
        let now = Utc::now();
        ResourceHealth {
            kind,
            resource_id,
            state,
            retry_count: 2,
            next_available_at: Some(now + chrono::Duration::seconds(30)),
            backoff: Duration::from_secs(30),
            last_error: "upstream timeout".to_string(),
            last_error_code: 504,
            last_check_at: now,
            last_success_at: None,
            success_count: 10,
            error_count: 2,
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    #[case(HealthState::Unknown, HealthStatus::Unknown)]
    #[case(HealthState::Healthy, HealthStatus::Available)]
    #[case(HealthState::Degraded, HealthStatus::Warning)]
    #[case(HealthState::Unhealthy, HealthStatus::Unavailable)]
    fn test_state_mapping_is_bijective(#[case] state: HealthState, #[case] status: HealthStatus) {
        assert_eq!(HealthStatus::from(state), status);
        assert_eq!(HealthState::from(status), state);
    }

    #[rstest]
    #[case(ResourceKind::Platform, ResourceType::Platform)]
    #[case(ResourceKind::ApiKey, ResourceType::ApiKey)]
    #[case(ResourceKind::Model, ResourceType::Model)]
    fn test_kind_mapping_is_bijective(
        #[case] kind: ResourceKind,
        #[case] resource_type: ResourceType,
    ) {
        assert_eq!(ResourceType::from(kind), resource_type);
        assert_eq!(ResourceKind::from(resource_type), kind);
    }

    #[test]
    fn test_negative_counters_are_rejected() {
        let mut record =
            HealthRecord::new(ResourceType::Model, 1, HealthStatus::Warning, Utc::now());
        record.backoff_duration = -5;
        let err = ResourceHealth::try_from(record).unwrap_err();
        assert!(matches!(err, HealthError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_backoff_is_stored_in_whole_seconds() {
        let storage = Arc::new(HealthStorage::new(create_test_db().await).await.unwrap());
        let adapter = RoutingHealthAdapter::new(Arc::clone(&storage));

        let mut health = engine_health(ResourceKind::Platform, 8, HealthState::Unhealthy);
        health.backoff = Duration::from_millis(1500);
        adapter.set(health).await.unwrap();

        assert_eq!(storage.get(ResourceType::Platform, 8).unwrap().backoff_duration, 1);
        let loaded = adapter.get(ResourceKind::Platform, 8).await.unwrap().unwrap();
        assert_eq!(loaded.backoff, Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_negative_counters_never_reach_the_engine() {
        let storage = Arc::new(HealthStorage::new(create_test_db().await).await.unwrap());
        let adapter = RoutingHealthAdapter::new(Arc::clone(&storage));

        let mut record =
            HealthRecord::new(ResourceType::ApiKey, 6, HealthStatus::Warning, Utc::now());
        record.error_count = -2;
        assert!(storage.set(record).await.is_err());
        assert_eq!(adapter.get(ResourceKind::ApiKey, 6).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_adapter_round_trips_through_storage() {
        let storage = Arc::new(HealthStorage::new(create_test_db().await).await.unwrap());
        let adapter = RoutingHealthAdapter::new(Arc::clone(&storage));

        assert_eq!(adapter.get(ResourceKind::ApiKey, 4).await.unwrap(), None);

        let health = engine_health(ResourceKind::ApiKey, 4, HealthState::Degraded);
        adapter.set(health.clone()).await.unwrap();

        let record = storage.get(ResourceType::ApiKey, 4).unwrap();
        assert_eq!(record.status, HealthStatus::Warning);
        assert_eq!(record.backoff_duration, 30);
        assert_eq!(adapter.get(ResourceKind::ApiKey, 4).await.unwrap(), Some(health));

        adapter.delete(ResourceKind::ApiKey, 4).await.unwrap();
        assert_eq!(adapter.get(ResourceKind::ApiKey, 4).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_adapter_rejects_unknown_state() {
        let storage = Arc::new(HealthStorage::new(create_test_db().await).await.unwrap());
        let adapter = RoutingHealthAdapter::new(storage);

        let err = adapter
            .set(engine_health(ResourceKind::Model, 1, HealthState::Unknown))
            .await
            .unwrap_err();
        assert!(matches!(err, HealthError::Validation { .. }));
    }
}
