//! # 管理端服务层
//!
//! 健康状态的管理视图：汇总、分类型列表、问题列表以及手动启用/禁用。
//! 供 CLI 或其它管理入口复用，返回值均可直接序列化。

pub mod health;
pub mod shared;

pub use health::{
    HealthItem, HealthListPage, HealthService, HealthSummary, IssueList, MANUALLY_DISABLED,
    ResourceTypeSummary,
};
pub use shared::{PaginationInfo, PaginationParams, build_page};
