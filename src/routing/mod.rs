//! # 路由引擎边界
//!
//! 路由引擎使用自己的健康状态词汇（`ResourceKind`、`HealthState`、`ResourceHealth`），
//! 通过 `HealthRepository` 读写健康状态。`RoutingHealthAdapter` 把这套接口落到
//! `HealthStorage` 上。

mod adapter;

pub use adapter::RoutingHealthAdapter;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;

/// 路由引擎中的资源种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Platform,
    ApiKey,
    Model,
}

/// 路由引擎中的健康状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HealthState {
    /// 尚未评估
    #[default]
    Unknown,
    Healthy,
    Degraded,
    Unhealthy,
}

/// 路由引擎维护的单个资源健康信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceHealth {
    pub kind: ResourceKind,
    pub resource_id: i32,
    pub state: HealthState,
    pub retry_count: u32,
    pub next_available_at: Option<DateTime<Utc>>,
    pub backoff: Duration,
    pub last_error: String,
    pub last_error_code: i32,
    pub last_check_at: DateTime<Utc>,
    pub last_success_at: Option<DateTime<Utc>>,
    pub success_count: u32,
    pub error_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 路由引擎依赖的健康状态仓库
#[async_trait]
pub trait HealthRepository: Send + Sync {
    /// 没有记录时返回 `None`
    async fn get(&self, kind: ResourceKind, resource_id: i32) -> Result<Option<ResourceHealth>>;

    /// 整条覆盖写入
    async fn set(&self, health: ResourceHealth) -> Result<()>;

    /// 删除记录，资源回到未评估状态
    async fn delete(&self, kind: ResourceKind, resource_id: i32) -> Result<()>;
}
