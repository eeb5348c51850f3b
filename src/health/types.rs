//! # 健康状态类型定义
//!
//! 资源类型、健康状态枚举以及单条健康记录。数据库中两个枚举均以 SMALLINT 存储，
//! 取值固定，调整顺序会破坏已有数据。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 被追踪可用性的资源类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    /// 上游平台
    Platform,
    /// 平台下的 API 密钥
    ApiKey,
    /// 平台下的模型
    Model,
}

impl ResourceType {
    /// 全部资源类型，按汇总输出顺序排列
    pub const ALL: [Self; 3] = [Self::Platform, Self::ApiKey, Self::Model];

    /// 数据库存储值
    #[must_use]
    pub const fn as_i16(self) -> i16 {
        match self {
            Self::Platform => 1,
            Self::ApiKey => 2,
            Self::Model => 3,
        }
    }

    /// 从数据库存储值解析
    #[must_use]
    pub const fn from_i16(value: i16) -> Option<Self> {
        match value {
            1 => Some(Self::Platform),
            2 => Some(Self::ApiKey),
            3 => Some(Self::Model),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Platform => "platform",
            Self::ApiKey => "api_key",
            Self::Model => "model",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "platform" | "platforms" => Ok(Self::Platform),
            "api_key" | "apikey" | "api-key" | "key" => Ok(Self::ApiKey),
            "model" | "models" => Ok(Self::Model),
            _ => Err(format!("Unknown resource type: {s}")),
        }
    }
}

/// 资源健康状态
///
/// `Unknown` 只表示“没有记录”，永远不会被缓存或持久化。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// 没有健康记录
    #[default]
    Unknown,
    /// 可用
    Available,
    /// 可用但近期有失败
    Warning,
    /// 不可用，路由应跳过
    Unavailable,
}

impl HealthStatus {
    #[must_use]
    pub const fn as_i16(self) -> i16 {
        match self {
            Self::Unknown => 0,
            Self::Available => 1,
            Self::Warning => 2,
            Self::Unavailable => 3,
        }
    }

    #[must_use]
    pub const fn from_i16(value: i16) -> Option<Self> {
        match value {
            0 => Some(Self::Unknown),
            1 => Some(Self::Available),
            2 => Some(Self::Warning),
            3 => Some(Self::Unavailable),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Available => "available",
            Self::Warning => "warning",
            Self::Unavailable => "unavailable",
        }
    }

    /// 是否是可以落库的状态
    #[must_use]
    pub const fn is_persistable(self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 缓存与持久化共用的键：`(resource_type, resource_id)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HealthKey {
    /// 资源类型
    pub resource_type: ResourceType,
    /// 资源在所属注册表中的 ID
    pub resource_id: i32,
}

impl HealthKey {
    #[must_use]
    pub const fn new(resource_type: ResourceType, resource_id: i32) -> Self {
        Self {
            resource_type,
            resource_id,
        }
    }
}

impl fmt::Display for HealthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource_type.as_i16(), self.resource_id)
    }
}

/// 单个资源的健康记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthRecord {
    pub resource_type: ResourceType,
    pub resource_id: i32,
    pub status: HealthStatus,
    /// 连续失败次数
    pub retry_count: i32,
    /// 最早允许重试的时间
    pub next_available_at: Option<DateTime<Utc>>,
    /// 当前退避窗口（秒）
    pub backoff_duration: i64,
    pub last_error: String,
    pub last_error_code: i32,
    pub last_check_at: DateTime<Utc>,
    pub last_success_at: Option<DateTime<Utc>>,
    pub success_count: i32,
    pub error_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HealthRecord {
    /// 以给定状态创建一条新记录，计数与退避均为零，时间戳取 `now`
    #[must_use]
    pub fn new(
        resource_type: ResourceType,
        resource_id: i32,
        status: HealthStatus,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            resource_type,
            resource_id,
            status,
            retry_count: 0,
            next_available_at: None,
            backoff_duration: 0,
            last_error: String::new(),
            last_error_code: 0,
            last_check_at: now,
            last_success_at: None,
            success_count: 0,
            error_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub const fn key(&self) -> HealthKey {
        HealthKey::new(self.resource_type, self.resource_id)
    }
}

/// 单个资源类型下各状态的数量（不含 Unknown）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub available: u64,
    pub warning: u64,
    pub unavailable: u64,
}

impl StatusCounts {
    /// 已缓存记录总数
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.available + self.warning + self.unavailable
    }
}
