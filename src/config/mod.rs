//! # 配置管理模块
//!
//! 处理应用配置加载、环境变量覆盖与验证

mod app_config;
mod database;

pub use app_config::{AppConfig, HealthConfig, LoggingConfig};
pub use database::DatabaseConfig;

use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Context, Result};
use crate::linfo;
use crate::logging::{LogComponent, LogStage};

/// 指定配置文件路径的环境变量
pub const CONFIG_PATH_ENV: &str = "RESOURCE_HEALTH_CONFIG";

/// 解析配置文件路径：优先环境变量，其次 `config/config.{RUST_ENV}.toml`
#[must_use]
pub fn config_path() -> PathBuf {
    env::var(CONFIG_PATH_ENV).map_or_else(
        |_| {
            let env = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
            PathBuf::from(format!("config/config.{env}.toml"))
        },
        PathBuf::from,
    )
}

/// 加载配置文件；文件不存在时使用默认配置
pub fn load_config() -> Result<AppConfig> {
    load_config_from(config_path())
}

/// 从指定路径加载配置并应用环境变量覆盖
pub fn load_config_from(path: impl AsRef<Path>) -> Result<AppConfig> {
    let path = path.as_ref();

    let mut config = if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
        parse_config(&content)?
    } else {
        linfo!(
            "system",
            LogStage::Startup,
            LogComponent::Config,
            "config_default",
            &format!("配置文件不存在，使用默认配置: {}", path.display())
        );
        AppConfig::default()
    };

    apply_env_overrides(&mut config);
    config.validate()?;
    Ok(config)
}

/// 解析 TOML 配置内容
pub fn parse_config(content: &str) -> Result<AppConfig> {
    Ok(toml::from_str(content)?)
}

fn apply_env_overrides(config: &mut AppConfig) {
    if let Ok(url) = env::var("DATABASE_URL")
        && !url.is_empty()
    {
        config.database.url = url;
    }
}
