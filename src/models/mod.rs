//! 数据模型定义
//!
//! 业务实体与 API 请求/响应模型，与 entity 模块中的数据库实体分离。

pub mod analytics;
pub mod common;
pub mod courses;
pub mod dashboards;
pub mod progress;
pub mod promotions;
pub mod submissions;
pub mod users;

pub use common::response::{ApiResponse, ServiceError};

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 程序启动时间（用于系统信息）
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// 业务错误码
///
/// 与 HTTP 状态码解耦：路由层负责把 ServiceError 映射为 HTTP 状态，
/// 前端只依赖 code 字段分支。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/api.ts")]
pub enum ErrorCode {
    Success = 0,

    // 请求类错误
    BadRequest = 40000,
    InvalidUpdateType = 40001,
    Unauthorized = 40100,
    Forbidden = 40300,

    // 资源类错误
    NotFound = 40400,
    UserNotFound = 40401,
    CourseNotFound = 40402,
    PromotionNotFound = 40403,
    StudentNotEnrolled = 40410,
    CourseNotInPromotion = 40411,

    // 服务端错误
    InternalServerError = 50000,
    AggregationFailed = 50001,
}
