//! # 应用配置结构定义

use serde::{Deserialize, Serialize};

use crate::ensure_config;
use crate::error::Result;

/// 应用主配置结构
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 数据库配置
    pub database: super::DatabaseConfig,
    /// 健康状态视图配置
    pub health: HealthConfig,
    /// 日志配置
    pub logging: LoggingConfig,
}

/// 健康状态列表配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// 未指定时的每页条数
    pub default_page_size: u64,
    /// 每页条数上限
    pub max_page_size: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别（`RUST_LOG` 优先）
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// 验证配置的有效性
    pub fn validate(&self) -> Result<()> {
        ensure_config!(!self.database.url.is_empty(), "Database URL cannot be empty");
        ensure_config!(
            self.database.max_connections > 0,
            "Database max_connections must be greater than 0"
        );
        ensure_config!(
            self.health.default_page_size >= 1,
            "health.default_page_size 必须大于 0"
        );
        ensure_config!(
            self.health.default_page_size <= self.health.max_page_size,
            "health.default_page_size ({}) 不能超过 health.max_page_size ({})",
            self.health.default_page_size,
            self.health.max_page_size
        );
        Ok(())
    }
}
