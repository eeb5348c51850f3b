//! # 资源健康状态实体定义
//!
//! 平台、API 密钥与模型共用的健康状态表。`(resource_type, resource_id)` 唯一。

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 资源健康状态实体
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "health")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub resource_type: i16,
    pub resource_id: i32,
    pub status: i16,
    pub retry_count: i32,
    pub next_available_at: Option<DateTimeUtc>,
    /// 退避窗口（秒）
    pub backoff_duration: i64,
    #[sea_orm(column_type = "Text")]
    pub last_error: String,
    pub last_error_code: i32,
    pub last_check_at: DateTimeUtc,
    pub last_success_at: Option<DateTimeUtc>,
    pub success_count: i32,
    pub error_count: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
