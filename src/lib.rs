//! # Resource Health
//!
//! 平台、API 密钥、模型的健康状态子系统：缓存 + 数据库双写的存储、
//! 管理端视图服务，以及面向路由引擎的健康状态适配器。

pub mod app;
pub mod config;
pub mod database;
pub mod error;
pub mod health;
pub mod logging;
pub mod management;
pub mod registry;
pub mod routing;
pub mod testing;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{HealthError, Result};
