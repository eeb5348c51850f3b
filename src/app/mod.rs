//! # 应用上下文
//!
//! 统一持有跨模块共享的服务实例。启动顺序：数据库连接 → 迁移 → 健康状态全量加载 →
//! 管理服务与路由适配器。

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::database::{init_database, run_migrations};
use crate::error::{HealthError, Result};
use crate::health::HealthStorage;
use crate::linfo;
use crate::logging::{LogComponent, LogStage};
use crate::management::HealthService;
use crate::registry::{DatabaseResourceRegistry, ResourceRegistry};
use crate::routing::RoutingHealthAdapter;

#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub db: Arc<DatabaseConnection>,
    pub storage: Arc<HealthStorage>,
    pub health_service: Arc<HealthService>,
    pub routing: Arc<RoutingHealthAdapter>,
}

impl AppContext {
    /// 按配置连接数据库、运行迁移并装配全部服务
    pub async fn bootstrap(config: AppConfig) -> Result<Self> {
        // init_database 会为 SQLite 文件创建父目录
        let db = init_database(&config.database).await?;
        run_migrations(&db)
            .await
            .map_err(|e| HealthError::database_with_source("数据库迁移失败", e))?;

        Self::with_database(config, Arc::new(db)).await
    }

    /// 基于已迁移的数据库连接装配服务
    pub async fn with_database(config: AppConfig, db: Arc<DatabaseConnection>) -> Result<Self> {
        let storage = Arc::new(HealthStorage::new(Arc::clone(&db)).await?);
        let registry: Arc<dyn ResourceRegistry> =
            Arc::new(DatabaseResourceRegistry::new(Arc::clone(&db)));
        let health_service = Arc::new(HealthService::new(
            Arc::clone(&storage),
            registry,
            config.health.clone(),
        ));
        let routing = Arc::new(RoutingHealthAdapter::new(Arc::clone(&storage)));

        linfo!(
            "system",
            LogStage::Startup,
            LogComponent::Main,
            "context_ready",
            "应用上下文初始化完成",
            cached_records = storage.len()
        );

        Ok(Self {
            config: Arc::new(config),
            db,
            storage,
            health_service,
            routing,
        })
    }
}
