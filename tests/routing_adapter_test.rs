//! # 路由适配器集成测试
//!
//! 路由引擎通过 `HealthRepository` 写入的状态对管理视图可见

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{at, create_test_db, seed_model, seed_platform};
use pretty_assertions::assert_eq;
use resource_health::config::HealthConfig;
use resource_health::health::{HealthStatus, HealthStorage, ResourceType};
use resource_health::management::HealthService;
use resource_health::registry::DatabaseResourceRegistry;
use resource_health::routing::{
    HealthRepository, HealthState, ResourceHealth, ResourceKind, RoutingHealthAdapter,
};

fn unhealthy_model(resource_id: i32) -> ResourceHealth {
    ResourceHealth {
        kind: ResourceKind::Model,
        resource_id,
        state: HealthState::Unhealthy,
        retry_count: 3,
        next_available_at: Some(at(300)),
        backoff: Duration::from_secs(300),
        last_error: "model overloaded".to_string(),
        last_error_code: 529,
        last_check_at: at(0),
        last_success_at: None,
        success_count: 0,
        error_count: 3,
        created_at: at(0),
        updated_at: at(0),
    }
}

#[tokio::test]
async fn test_engine_writes_are_visible_to_admin_views() {
    let db = create_test_db().await;
    let platform = seed_platform(&db, "anthropic").await;
    let model = seed_model(&db, platform, "claude-sonnet", None).await;

    let storage = Arc::new(HealthStorage::new(Arc::clone(&db)).await.unwrap());
    let adapter = RoutingHealthAdapter::new(Arc::clone(&storage));
    let service = HealthService::new(
        Arc::clone(&storage),
        Arc::new(DatabaseResourceRegistry::new(db)),
        HealthConfig::default(),
    );

    adapter.set(unhealthy_model(model)).await.unwrap();

    let issues = service.get_issues().await.unwrap();
    assert_eq!(issues.items.len(), 1);
    assert_eq!(issues.items[0].name, "claude-sonnet");
    assert_eq!(issues.items[0].health.backoff_duration, 300);
    assert_eq!(issues.items[0].health.last_error_code, 529);

    // 管理员启用后，引擎看到的是未评估状态
    service.enable_health(ResourceType::Model, model).await.unwrap();
    assert_eq!(adapter.get(ResourceKind::Model, model).await.unwrap(), None);
}

#[tokio::test]
async fn test_admin_disable_is_visible_to_engine() {
    let storage = Arc::new(HealthStorage::new(create_test_db().await).await.unwrap());
    let adapter = RoutingHealthAdapter::new(Arc::clone(&storage));

    let mut record = common::record(ResourceType::Platform, 4, HealthStatus::Unavailable, at(0));
    record.last_error = "manually disabled".to_string();
    storage.set(record).await.unwrap();

    let health = adapter.get(ResourceKind::Platform, 4).await.unwrap().unwrap();
    assert_eq!(health.state, HealthState::Unhealthy);
    assert_eq!(health.backoff, Duration::ZERO);
    assert_eq!(health.last_error, "manually disabled");
}
