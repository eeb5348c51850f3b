//! # 测试辅助函数
//!
//! 内存数据库、临时文件数据库与注册表数据填充

use std::sync::Arc;

use chrono::Utc;
use entity::{api_keys, models, platforms};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;
use tempfile::TempDir;

/// 初始化测试日志（多次调用安全）
pub fn init_test_env() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init()
        .ok();
}

/// 创建已执行迁移的内存数据库
///
/// 内存库只能使用单连接，否则每个连接看到的是不同的数据库。
pub async fn create_test_db() -> Arc<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(options).await.expect("连接内存数据库失败");
    migration::Migrator::up(&db, None)
        .await
        .expect("运行迁移失败");
    Arc::new(db)
}

/// 创建临时文件数据库，`TempDir` 被释放时删除
pub async fn create_temp_db() -> (Arc<DatabaseConnection>, TempDir) {
    let temp_dir = tempfile::tempdir().expect("创建临时目录失败");
    let db_url = format!("sqlite://{}?mode=rwc", temp_dir.path().join("test.db").display());

    let db = Database::connect(&db_url).await.expect("连接临时数据库失败");
    migration::Migrator::up(&db, None)
        .await
        .expect("运行迁移失败");
    (Arc::new(db), temp_dir)
}

/// 插入平台并返回 ID
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

/// 插入 API 密钥并返回 ID
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

/// 插入模型并返回 ID
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
