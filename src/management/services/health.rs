//! # 健康状态管理服务
//!
//! 管理员视角的健康状态操作。所有读取都走 `HealthStorage` 缓存，
//! 展示名称通过 `ResourceRegistry` 按页批量解析；注册表中已不存在的资源
//! 不会出现在结果里，只计入 `dropped`。

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use super::shared::{PaginationParams, build_page};
use crate::config::HealthConfig;
use crate::error::{Context, Result};
use crate::health::{HealthKey, HealthRecord, HealthStatus, HealthStorage, ResourceType};
use crate::logging::{LogComponent, LogStage};
use crate::registry::{ResourceLabel, ResourceRegistry};
use crate::{ldebug, linfo, lwarn};

/// 手动禁用时写入的错误信息
pub const MANUALLY_DISABLED: &str = "manually disabled";

/// 带展示名称的健康记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthItem {
    /// 平台名、模型名或脱敏后的密钥
    pub name: String,
    /// 模型别名
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// 展开输出的健康记录字段
    #[serde(flatten)]
    pub health: HealthRecord,
}

impl HealthItem {
    fn new(label: ResourceLabel, health: HealthRecord) -> Self {
        Self {
            name: label.name,
            alias: label.alias,
            health,
        }
    }
}

/// 分类型健康列表的一页
#[derive(Debug, Clone, Serialize)]
pub struct HealthListPage {
    pub items: Vec<HealthItem>,
    /// 该类型缓存记录总数（解析名称之前）
    pub total: u64,
    /// 实际使用的页码（从 1 开始）
    pub page: u64,
    /// 实际使用的每页条数
    pub page_size: u64,
    /// 按 `total` 计算的总页数
    pub pages: u64,
    /// 本页因注册表查不到而被丢弃的条数
    pub dropped: usize,
}

/// 当前不可用的资源
#[derive(Debug, Clone, Serialize)]
pub struct IssueList {
    pub items: Vec<HealthItem>,
    pub dropped: usize,
}

/// 单个资源类型的健康汇总
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResourceTypeSummary {
    /// 注册表中的资源总数
    pub total: u64,
    pub available: u64,
    pub warning: u64,
    pub unavailable: u64,
    /// 没有健康记录的资源数
    pub unknown: u64,
}

/// 全部资源类型的健康汇总
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HealthSummary {
    pub platform: ResourceTypeSummary,
    pub api_key: ResourceTypeSummary,
    pub model: ResourceTypeSummary,
}

impl HealthSummary {
    #[must_use]
    pub const fn get(&self, resource_type: ResourceType) -> &ResourceTypeSummary {
        match resource_type {
            ResourceType::Platform => &self.platform,
            ResourceType::ApiKey => &self.api_key,
            ResourceType::Model => &self.model,
        }
    }
}

/// 健康状态管理服务
pub struct HealthService {
    storage: Arc<HealthStorage>,
    registry: Arc<dyn ResourceRegistry>,
    config: HealthConfig,
}

impl HealthService {
    #[must_use]
    pub fn new(
        storage: Arc<HealthStorage>,
        registry: Arc<dyn ResourceRegistry>,
        config: HealthConfig,
    ) -> Self {
        Self {
            storage,
            registry,
            config,
        }
    }

    #[must_use]
    pub const fn storage(&self) -> &Arc<HealthStorage> {
        &self.storage
    }

    /// 启用资源：删除健康记录，资源回到 Unknown，由路由引擎重新评估
    pub async fn enable_health(&self, resource_type: ResourceType, resource_id: i32) -> Result<()> {
        let key = HealthKey::new(resource_type, resource_id);
        self.storage
            .delete(resource_type, resource_id)
            .await
            .with_context(|| format!("启用资源失败: {key}"))?;

        linfo!(
            "admin",
            LogStage::Management,
            LogComponent::HealthService,
            "enable_health",
            "资源已手动启用",
            key = %key
        );
        Ok(())
    }

    /// 禁用资源：以一条全新的 Unavailable 记录覆盖原有状态
    pub async fn disable_health(
        &self,
        resource_type: ResourceType,
        resource_id: i32,
    ) -> Result<HealthRecord> {
        let mut record =
            HealthRecord::new(resource_type, resource_id, HealthStatus::Unavailable, Utc::now());
        record.last_error = MANUALLY_DISABLED.to_string();

        let key = record.key();
        self.storage
            .set(record.clone())
            .await
            .with_context(|| format!("禁用资源失败: {key}"))?;

        linfo!(
            "admin",
            LogStage::Management,
            LogComponent::HealthService,
            "disable_health",
            "资源已手动禁用",
            key = %key
        );
        Ok(record)
    }

    /// 各资源类型的健康汇总
    pub async fn get_health_summary(&self) -> Result<HealthSummary> {
        let (platform, api_key, model) = futures::try_join!(
            self.summarize(ResourceType::Platform),
            self.summarize(ResourceType::ApiKey),
            self.summarize(ResourceType::Model),
        )?;
        Ok(HealthSummary {
            platform,
            api_key,
            model,
        })
    }

    pub async fn get_platform_health_list(
        &self,
        page: u64,
        page_size: Option<u64>,
    ) -> Result<HealthListPage> {
        self.list_by_type(ResourceType::Platform, page, page_size).await
    }

    pub async fn get_api_key_health_list(
        &self,
        page: u64,
        page_size: Option<u64>,
    ) -> Result<HealthListPage> {
        self.list_by_type(ResourceType::ApiKey, page, page_size).await
    }

    pub async fn get_model_health_list(
        &self,
        page: u64,
        page_size: Option<u64>,
    ) -> Result<HealthListPage> {
        self.list_by_type(ResourceType::Model, page, page_size).await
    }

    /// 某类资源的健康列表，按最近检查时间倒序分页
    pub async fn list_by_type(
        &self,
        resource_type: ResourceType,
        page: u64,
        page_size: Option<u64>,
    ) -> Result<HealthListPage> {
        let params = PaginationParams::new(
            Some(page),
            page_size,
            self.config.default_page_size,
            self.config.max_page_size,
        );

        let mut records = self.storage.get_by_resource_type(resource_type);
        sort_latest_first(&mut records);

        let pagination = build_page(records.len() as u64, params);
        let window = params.window(records.len());
        let page_records: Vec<HealthRecord> = records.drain(window).collect();

        let mut labels = self
            .registry
            .resolve_labels(resource_type, &resource_ids(&page_records))
            .await
            .with_context(|| format!("解析资源名称失败: {resource_type}"))?;

        let (items, dropped) = attach_labels(page_records, |record| {
            labels.remove(&record.resource_id)
        });

        Ok(HealthListPage {
            items,
            total: pagination.total,
            page: pagination.page,
            page_size: pagination.limit,
            pages: pagination.pages,
            dropped,
        })
    }

    /// 所有不可用资源，按最近检查时间倒序
    pub async fn get_issues(&self) -> Result<IssueList> {
        let mut records = self.storage.get_by_status(HealthStatus::Unavailable);
        sort_latest_first(&mut records);

        let mut labels: HashMap<ResourceType, HashMap<i32, ResourceLabel>> = HashMap::new();
        for resource_type in ResourceType::ALL {
            let ids: Vec<i32> = records
                .iter()
                .filter(|record| record.resource_type == resource_type)
                .map(|record| record.resource_id)
                .collect();
            if ids.is_empty() {
                continue;
            }
            let resolved = self
                .registry
                .resolve_labels(resource_type, &ids)
                .await
                .with_context(|| format!("解析资源名称失败: {resource_type}"))?;
            labels.insert(resource_type, resolved);
        }

        let (items, dropped) = attach_labels(records, |record| {
            labels
                .get_mut(&record.resource_type)
                .and_then(|by_id| by_id.remove(&record.resource_id))
        });

        Ok(IssueList { items, dropped })
    }

    async fn summarize(&self, resource_type: ResourceType) -> Result<ResourceTypeSummary> {
        let total = self
            .registry
            .count(resource_type)
            .await
            .with_context(|| format!("统计资源总数失败: {resource_type}"))?;
        let counts = self.storage.count_by_resource_type(resource_type);

        let cached = counts.total();
        if cached > total {
            lwarn!(
                "admin",
                LogStage::Management,
                LogComponent::HealthService,
                "summary_mismatch",
                "缓存中存在注册表已不存在的资源记录",
                resource_type = %resource_type,
                registry_total = total,
                cached = cached
            );
        }

        Ok(ResourceTypeSummary {
            total,
            available: counts.available,
            warning: counts.warning,
            unavailable: counts.unavailable,
            unknown: total.saturating_sub(cached),
        })
    }
}

fn sort_latest_first(records: &mut [HealthRecord]) {
    records.sort_by(|a, b| {
        b.last_check_at
            .cmp(&a.last_check_at)
            .then_with(|| a.key().cmp(&b.key()))
    });
}

fn resource_ids(records: &[HealthRecord]) -> Vec<i32> {
    records.iter().map(|record| record.resource_id).collect()
}

/// 为记录附上展示名称；查不到的记录被丢弃并返回丢弃条数
fn attach_labels(
    records: Vec<HealthRecord>,
    mut lookup: impl FnMut(&HealthRecord) -> Option<ResourceLabel>,
) -> (Vec<HealthItem>, usize) {
    let mut items = Vec::with_capacity(records.len());
    let mut dropped = 0usize;

    for record in records {
        if let Some(label) = lookup(&record) {
            items.push(HealthItem::new(label, record));
        } else {
            dropped += 1;
            ldebug!(
                "admin",
                LogStage::Management,
                LogComponent::HealthService,
                "lookup_gap",
                "注册表中找不到资源，已从结果中省略",
                key = %record.key()
            );
        }
    }

    (items, dropped)
}
