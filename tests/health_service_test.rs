//! # 健康状态管理服务集成测试
//!
//! 基于真实注册表表数据验证分页、排序、手动启用/禁用与汇总

mod common;

use std::sync::Arc;

use common::{at, create_test_db, record, seed_api_key, seed_model, seed_platform};
use pretty_assertions::assert_eq;
use resource_health::config::HealthConfig;
use resource_health::health::{HealthStatus, HealthStorage, ResourceType};
use resource_health::management::{HealthService, services::MANUALLY_DISABLED};
use resource_health::registry::DatabaseResourceRegistry;
use sea_orm::DatabaseConnection;

async fn build_service(db: Arc<DatabaseConnection>) -> HealthService {
    let storage = Arc::new(HealthStorage::new(Arc::clone(&db)).await.unwrap());
    let registry = Arc::new(DatabaseResourceRegistry::new(db));
    HealthService::new(storage, registry, HealthConfig::default())
}

#[tokio::test]
async fn test_platform_list_pagination_and_ordering() {
    let db = create_test_db().await;
    let mut ids = Vec::new();
    for i in 0..25 {
        ids.push(seed_platform(&db, &format!("platform-{i:02}")).await);
    }
    let service = build_service(db).await;

    for (offset, id) in (0_i64..).zip(&ids) {
        service
            .storage()
            .set(record(ResourceType::Platform, *id, HealthStatus::Available, at(offset)))
            .await
            .unwrap();
    }

    let first = service.get_platform_health_list(1, Some(10)).await.unwrap();
    assert_eq!(first.total, 25);
    assert_eq!(first.items.len(), 10);
    assert_eq!(first.dropped, 0);
    assert_eq!(first.pages, 3);
    assert_eq!(first.items[0].name, "platform-24");
    assert!(
        first
            .items
            .windows(2)
            .all(|pair| pair[0].health.last_check_at >= pair[1].health.last_check_at)
    );

    let last = service.get_platform_health_list(3, Some(10)).await.unwrap();
    assert_eq!(last.items.len(), 5);
    assert_eq!(last.items[4].name, "platform-00");

    let beyond = service.get_platform_health_list(4, Some(10)).await.unwrap();
    assert!(beyond.items.is_empty());
    assert_eq!(beyond.total, 25);

    let zero_page = service.get_platform_health_list(0, Some(10)).await.unwrap();
    assert_eq!(zero_page.page, 1);
    assert_eq!(zero_page.items[0].name, first.items[0].name);
}

#[tokio::test]
async fn test_overwrite_is_visible_in_model_list() {
    let db = create_test_db().await;
    let platform = seed_platform(&db, "openai").await;
    let model = seed_model(&db, platform, "gpt-4o", Some("default")).await;
    let service = build_service(db).await;

    service
        .storage()
        .set(record(ResourceType::Model, model, HealthStatus::Unavailable, at(0)))
        .await
        .unwrap();
    service
        .storage()
        .set(record(ResourceType::Model, model, HealthStatus::Available, at(60)))
        .await
        .unwrap();

    let page = service.get_model_health_list(1, None).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].alias.as_deref(), Some("default"));
    assert_eq!(page.items[0].health.status, HealthStatus::Available);
    assert_eq!(page.items[0].health.last_check_at, at(60));
    assert!(service.get_issues().await.unwrap().items.is_empty());
}

#[tokio::test]
async fn test_enable_without_record_succeeds() {
    let service = build_service(create_test_db().await).await;
    service.enable_health(ResourceType::Model, 7).await.unwrap();
    assert!(service.storage().get(ResourceType::Model, 7).is_none());
}

#[tokio::test]
async fn test_disable_shows_up_in_issues() {
    let db = create_test_db().await;
    let platform = seed_platform(&db, "openai").await;
    let mut key = 0;
    for value in ["sk-first-key-0001", "sk-second-key-002", "sk-third-key-0003"] {
        key = seed_api_key(&db, platform, value).await;
    }
    assert_eq!(key, 3);
    let service = build_service(db).await;

    service.disable_health(ResourceType::ApiKey, 3).await.unwrap();

    let issues = service.get_issues().await.unwrap();
    assert_eq!(issues.items.len(), 1);
    let issue = &issues.items[0];
    assert_eq!(issue.health.resource_type, ResourceType::ApiKey);
    assert_eq!(issue.health.resource_id, 3);
    assert_eq!(issue.health.last_error, MANUALLY_DISABLED);
    assert_eq!(issue.health.retry_count, 0);
    assert_eq!(issue.name, "sk-t****0003");

    let keys = service.get_api_key_health_list(1, None).await.unwrap();
    assert_eq!(keys.items.len(), 1);
    assert_eq!(keys.items[0].health.status, HealthStatus::Unavailable);
}

#[tokio::test]
async fn test_summary_counts_unknown_resources() {
    let db = create_test_db().await;
    let openai = seed_platform(&db, "openai").await;
    let anthropic = seed_platform(&db, "anthropic").await;
    seed_platform(&db, "gemini").await;
    seed_model(&db, openai, "gpt-4o", None).await;
    let service = build_service(db).await;

    service
        .storage()
        .set(record(ResourceType::Platform, openai, HealthStatus::Available, at(0)))
        .await
        .unwrap();
    service
        .disable_health(ResourceType::Platform, anthropic)
        .await
        .unwrap();

    let summary = service.get_health_summary().await.unwrap();
    assert_eq!(summary.platform.total, 3);
    assert_eq!(summary.platform.available, 1);
    assert_eq!(summary.platform.unavailable, 1);
    assert_eq!(summary.platform.unknown, 1);
    assert_eq!(summary.model.total, 1);
    assert_eq!(summary.model.unknown, 1);
    assert_eq!(summary.api_key.total, 0);
}

#[tokio::test]
async fn test_issues_drop_resources_missing_from_registry() {
    let db = create_test_db().await;
    let platform = seed_platform(&db, "openai").await;
    let service = build_service(db).await;

    service
        .disable_health(ResourceType::Platform, platform)
        .await
        .unwrap();
    service.disable_health(ResourceType::Model, 99).await.unwrap();

    let issues = service.get_issues().await.unwrap();
    assert_eq!(issues.items.len(), 1);
    assert_eq!(issues.dropped, 1);
    assert_eq!(issues.items[0].name, "openai");
}
