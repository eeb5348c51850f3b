//! # 资源注册表
//!
//! 平台、API 密钥、模型的只读视图。健康状态服务用它统计资源总数，并批量解析展示名称。
//! 这些表的增删改不属于本子系统。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use entity::{api_keys, models, platforms};
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter};
use serde::Serialize;

use crate::error::{Context, Result};
use crate::health::ResourceType;

/// 资源的展示信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceLabel {
    /// 平台名、模型名或脱敏后的密钥
    pub name: String,
    /// 模型别名（仅模型有）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl ResourceLabel {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }
}

/// 资源注册表抽象
#[async_trait]
pub trait ResourceRegistry: Send + Sync {
    /// 某类资源的总数（包含从未被评估过的资源）
    async fn count(&self, resource_type: ResourceType) -> Result<u64>;

    /// 批量解析展示信息；不存在的 ID 不会出现在返回结果中
    async fn resolve_labels(
        &self,
        resource_type: ResourceType,
        ids: &[i32],
    ) -> Result<HashMap<i32, ResourceLabel>>;
}

/// 基于数据库的资源注册表
pub struct DatabaseResourceRegistry {
    db: Arc<DatabaseConnection>,
}

impl DatabaseResourceRegistry {
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ResourceRegistry for DatabaseResourceRegistry {
    async fn count(&self, resource_type: ResourceType) -> Result<u64> {
        let db = self.db.as_ref();
        let total = match resource_type {
            ResourceType::Platform => platforms::Entity::find().count(db).await,
            ResourceType::ApiKey => api_keys::Entity::find().count(db).await,
            ResourceType::Model => models::Entity::find().count(db).await,
        };
        total.with_context(|| format!("统计资源总数失败: {resource_type}"))
    }

    async fn resolve_labels(
        &self,
        resource_type: ResourceType,
        ids: &[i32],
    ) -> Result<HashMap<i32, ResourceLabel>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let db = self.db.as_ref();
        let ids = ids.to_vec();
        let labels: std::result::Result<HashMap<i32, ResourceLabel>, DbErr> = match resource_type {
            ResourceType::Platform => platforms::Entity::find()
                .filter(platforms::Column::Id.is_in(ids))
                .all(db)
                .await
                .map(|rows| {
                    rows.into_iter()
                        .map(|p| (p.id, ResourceLabel::named(p.name)))
                        .collect()
                }),
            ResourceType::ApiKey => api_keys::Entity::find()
                .filter(api_keys::Column::Id.is_in(ids))
                .all(db)
                .await
                .map(|rows| {
                    rows.into_iter()
                        .map(|k| (k.id, ResourceLabel::named(mask_api_key(&k.value))))
                        .collect()
                }),
            ResourceType::Model => models::Entity::find()
                .filter(models::Column::Id.is_in(ids))
                .all(db)
                .await
                .map(|rows| {
                    rows.into_iter()
                        .map(|m| {
                            let alias = m.alias.filter(|alias| !alias.is_empty());
                            (m.id, ResourceLabel { name: m.name, alias })
                        })
                        .collect()
                }),
        };

        labels.with_context(|| format!("批量解析资源名称失败: {resource_type}"))
    }
}

/// 密钥脱敏：保留首尾各 4 位
#[must_use]
pub fn mask_api_key(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}****{tail}")
    } else {
        "****".to_string()
    }
}
