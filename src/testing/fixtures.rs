//! # 测试数据 Fixtures

use chrono::{DateTime, Duration, Utc};

use crate::health::{HealthRecord, HealthStatus, ResourceType};

/// 以指定检查时间构造健康记录
#[must_use]
pub fn record_at(
    resource_type: ResourceType,
    resource_id: i32,
    status: HealthStatus,
    last_check_at: DateTime<Utc>,
) -> HealthRecord {
    HealthRecord::new(resource_type, resource_id, status, last_check_at)
}

/// 健康记录构建器，用于需要失败信息、退避等字段的场景
pub struct HealthRecordFixture {
    record: HealthRecord,
}

impl HealthRecordFixture {
    #[must_use]
    pub fn new(resource_type: ResourceType, resource_id: i32) -> Self {
        Self {
            record: HealthRecord::new(
                resource_type,
                resource_id,
                HealthStatus::Available,
                Utc::now(),
            ),
        }
    }

    #[must_use]
    pub fn status(mut self, status: HealthStatus) -> Self {
        self.record.status = status;
        self
    }

    /// 同时设置检查、创建与更新时间
    #[must_use]
    pub fn checked_at(mut self, at: DateTime<Utc>) -> Self {
        self.record.last_check_at = at;
        self.record.created_at = at;
        self.record.updated_at = at;
        self
    }

    /// 模拟一次失败：累计重试、记录错误并设置退避窗口
    #[must_use]
    pub fn failing(mut self, error: &str, code: i32, backoff_seconds: i64) -> Self {
        self.record.retry_count += 1;
        self.record.error_count += 1;
        self.record.last_error = error.to_string();
        self.record.last_error_code = code;
        self.record.backoff_duration = backoff_seconds;
        self.record.next_available_at =
            Some(self.record.last_check_at + Duration::seconds(backoff_seconds));
        self
    }

    #[must_use]
    pub fn succeeded(mut self, count: i32) -> Self {
        self.record.success_count += count;
        self.record.last_success_at = Some(self.record.last_check_at);
        self
    }

    #[must_use]
    pub fn build(self) -> HealthRecord {
        self.record
    }
}
