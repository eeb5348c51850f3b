//! 集成测试公共工具：内存数据库与注册表数据

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use entity::{api_keys, models, platforms};
use resource_health::health::{HealthRecord, HealthStatus, ResourceType};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;

/// 已执行迁移的单连接内存数据库
pub async fn create_test_db() -> Arc<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await.expect("连接内存数据库失败");
    migration::Migrator::up(&db, None)
        .await
        .expect("运行迁移失败");
    Arc::new(db)
}

/// 固定基准时间之后 `seconds` 秒
pub fn at(seconds: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap() + Duration::seconds(seconds)
}

pub fn record(
    resource_type: ResourceType,
    resource_id: i32,
    status: HealthStatus,
    checked_at: DateTime<Utc>,
) -> HealthRecord {
    HealthRecord::new(resource_type, resource_id, status, checked_at)
}

pub async fn seed_platform(db: &DatabaseConnection, name: &str) -> i32 {
    platforms::ActiveModel {
        name: Set(name.to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("插入平台失败")
    .id
}

pub async fn seed_api_key(db: &DatabaseConnection, platform_id: i32, value: &str) -> i32 {
    api_keys::ActiveModel {
        platform_id: Set(platform_id),
        value: Set(value.to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("插入密钥失败")
    .id
}

pub async fn seed_model(
    db: &DatabaseConnection,
    platform_id: i32,
    name: &str,
    alias: Option<&str>,
) -> i32 {
    models::ActiveModel {
        platform_id: Set(platform_id),
        name: Set(name.to_string()),
        alias: Set(alias.map(str::to_string)),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("插入模型失败")
    .id
}
