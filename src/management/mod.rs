//! # 管理模块
//!
//! 面向管理员的健康状态操作

pub mod services;

pub use services::HealthService;
