//! # 服务层共享工具
//!
//! 分页参数解析与窗口计算，供各列表查询复用。

pub mod pagination;

pub use pagination::{PaginationInfo, PaginationParams, build_page};

#[cfg(test)]
mod tests;
