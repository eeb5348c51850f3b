//! # 健康状态存储集成测试
//!
//! 缓存与数据库双写的一致性、幂等删除、并发写入与重启加载

mod common;

use std::sync::Arc;

use common::{at, create_test_db, record};
use entity::health;
use pretty_assertions::assert_eq;
use resource_health::health::{HealthStatus, HealthStorage, ResourceType};
use sea_orm::{EntityTrait, PaginatorTrait};

#[tokio::test]
async fn test_set_then_get_returns_equal_record() {
    let storage = HealthStorage::new(create_test_db().await).await.unwrap();
    let mut written = record(ResourceType::ApiKey, 42, HealthStatus::Warning, at(0));
    written.retry_count = 3;
    written.backoff_duration = 120;
    written.next_available_at = Some(at(120));
    written.last_error = "rate limited".to_string();
    written.last_error_code = 429;

    storage.set(written.clone()).await.unwrap();
    assert_eq!(storage.get(ResourceType::ApiKey, 42), Some(written));
    assert_eq!(storage.get(ResourceType::Platform, 42), None);
}

#[tokio::test]
async fn test_delete_is_idempotent_and_clears_all_views() {
    let storage = HealthStorage::new(create_test_db().await).await.unwrap();
    storage
        .set(record(ResourceType::Model, 5, HealthStatus::Unavailable, at(0)))
        .await
        .unwrap();

    storage.delete(ResourceType::Model, 5).await.unwrap();
    storage.delete(ResourceType::Model, 5).await.unwrap();

    assert!(storage.get(ResourceType::Model, 5).is_none());
    assert!(storage.get_by_resource_type(ResourceType::Model).is_empty());
    assert!(storage.get_by_status(HealthStatus::Unavailable).is_empty());
}

#[tokio::test]
async fn test_counts_match_records_per_type() {
    let storage = HealthStorage::new(create_test_db().await).await.unwrap();
    let statuses = [
        HealthStatus::Available,
        HealthStatus::Available,
        HealthStatus::Warning,
        HealthStatus::Unavailable,
    ];
    for (id, status) in (1..).zip(statuses) {
        storage
            .set(record(ResourceType::Platform, id, status, at(i64::from(id))))
            .await
            .unwrap();
    }
    storage
        .set(record(ResourceType::Model, 1, HealthStatus::Warning, at(0)))
        .await
        .unwrap();

    for resource_type in ResourceType::ALL {
        let counts = storage.count_by_resource_type(resource_type);
        let records = storage.get_by_resource_type(resource_type);
        assert_eq!(counts.total() as usize, records.len());
    }

    let counts = storage.count_by_resource_type(ResourceType::Platform);
    assert_eq!((counts.available, counts.warning, counts.unavailable), (2, 1, 1));
    assert_eq!(storage.get_by_status(HealthStatus::Warning).len(), 2);
}

#[tokio::test]
async fn test_full_overwrite_replaces_every_field() {
    let db = create_test_db().await;
    let storage = HealthStorage::new(Arc::clone(&db)).await.unwrap();

    let mut failing = record(ResourceType::Platform, 1, HealthStatus::Unavailable, at(0));
    failing.retry_count = 4;
    failing.error_count = 4;
    failing.last_error = "connection refused".to_string();
    storage.set(failing).await.unwrap();

    let recovered = record(ResourceType::Platform, 1, HealthStatus::Available, at(60));
    storage.set(recovered.clone()).await.unwrap();

    assert_eq!(storage.get(ResourceType::Platform, 1), Some(recovered));
    assert_eq!(health::Entity::find().count(db.as_ref()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_concurrent_sets_leave_one_complete_record() {
    let db = create_test_db().await;
    let storage = Arc::new(HealthStorage::new(Arc::clone(&db)).await.unwrap());

    let candidates: Vec<_> = (0..16)
        .map(|i| {
            let status = match i % 3 {
                0 => HealthStatus::Available,
                1 => HealthStatus::Warning,
                _ => HealthStatus::Unavailable,
            };
            let mut candidate = record(ResourceType::ApiKey, 7, status, at(i));
            candidate.success_count = i32::try_from(i).unwrap();
            candidate
        })
        .collect();

    let handles: Vec<_> = candidates
        .iter()
        .cloned()
        .map(|candidate| {
            let storage = Arc::clone(&storage);
            tokio::spawn(async move { storage.set(candidate).await })
        })
        .collect();
    for result in futures::future::join_all(handles).await {
        result.unwrap().unwrap();
    }

    assert_eq!(storage.len(), 1);
    let cached = storage.get(ResourceType::ApiKey, 7).unwrap();
    assert!(candidates.contains(&cached));

    assert_eq!(health::Entity::find().count(db.as_ref()).await.unwrap(), 1);
    let reloaded = HealthStorage::new(db).await.unwrap();
    let persisted = reloaded.get(ResourceType::ApiKey, 7).unwrap();
    assert!(candidates.contains(&persisted));
}

#[tokio::test]
async fn test_restart_reloads_persisted_state() {
    let db = create_test_db().await;
    let storage = HealthStorage::new(Arc::clone(&db)).await.unwrap();

    let mut platform = record(ResourceType::Platform, 1, HealthStatus::Available, at(0));
    platform.success_count = 12;
    platform.last_success_at = Some(at(0));
    let key = record(ResourceType::ApiKey, 2, HealthStatus::Unavailable, at(30));
    let model = record(ResourceType::Model, 3, HealthStatus::Warning, at(45));
    for r in [&platform, &key, &model] {
        storage.set(r.clone()).await.unwrap();
    }
    storage.delete(ResourceType::ApiKey, 2).await.unwrap();
    drop(storage);

    let restarted = HealthStorage::new(db).await.unwrap();
    assert_eq!(restarted.len(), 2);
    assert_eq!(restarted.get(ResourceType::Platform, 1), Some(platform));
    assert_eq!(restarted.get(ResourceType::Model, 3), Some(model));
    assert_eq!(restarted.get(ResourceType::ApiKey, 2), None);
}
