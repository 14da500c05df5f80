//! 数据模型定义
//!
//! 业务实体、请求与响应结构，与 `entity` 中的数据库实体分离。

pub mod assignments;
pub mod auth;
pub mod common;
pub mod submissions;
pub mod users;

pub use common::{ApiResponse, ErrorCode};

/// 程序启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}
