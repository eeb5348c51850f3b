//! # 资源健康状态模块
//!
//! 平台、API 密钥、模型三类资源的健康记录：类型定义与缓存 + 数据库双写存储。
//! 没有记录的资源视为 Unknown。

pub mod storage;
pub mod types;

pub use storage::HealthStorage;
pub use types::{HealthKey, HealthRecord, HealthStatus, ResourceType, StatusCounts};
