//! # Entity 模块
//!
//! 包含健康状态表以及只读注册表（平台、密钥、模型）的 Sea-ORM 实体定义

pub mod api_keys;
pub mod health;
pub mod models;
pub mod platforms;

pub use api_keys::Entity as ApiKeys;
pub use health::Entity as Health;
pub use models::Entity as Models;
pub use platforms::Entity as Platforms;
