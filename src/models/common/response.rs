use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::ErrorCode;

// 统一的API响应结构
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/api.ts")]
pub struct ApiResponse<T: TS> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl<T: TS> ApiResponse<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Success as i32,
            message: message.into(),
            data: Some(data),
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn error(code: ErrorCode, data: T, message: impl Into<String>) -> Self {
        Self {
            code: code as i32,
            message: message.into(),
            data: Some(data),
            timestamp: chrono::Utc::now(),
        }
    }
}

impl ApiResponse<()> {
    pub fn success_empty(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Success as i32,
            message: message.into(),
            data: None,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn error_empty(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code as i32,
            message: message.into(),
            data: None,
            timestamp: chrono::Utc::now(),
        }
    }
}

/// 业务层预期失败
///
/// 聚合/更新服务返回 `Result<T, ServiceError>`，由路由层统一映射为
/// HTTP 状态码和 ApiResponse 错误体；不会作为 panic 或基础设施错误抛出。
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceError {
    pub code: ErrorCode,
    pub message: String,
}

impl ServiceError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn user_not_found(user_id: i64) -> Self {
        Self::new(ErrorCode::UserNotFound, format!("用户不存在: {user_id}"))
    }

    pub fn course_not_found(course_id: i64) -> Self {
        Self::new(ErrorCode::CourseNotFound, format!("课程不存在: {course_id}"))
    }

    pub fn student_not_enrolled(student_id: i64) -> Self {
        Self::new(
            ErrorCode::StudentNotEnrolled,
            format!("学生未加入任何班期: {student_id}"),
        )
    }

    pub fn course_not_in_promotion(course_id: i64) -> Self {
        Self::new(
            ErrorCode::CourseNotInPromotion,
            format!("课程不在学生所在班期中: {course_id}"),
        )
    }

    pub fn invalid_update_type(update_type: &str) -> Self {
        Self::new(
            ErrorCode::InvalidUpdateType,
            format!("无效的进度更新类型: {update_type}"),
        )
    }

    pub fn aggregation_failed(reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::AggregationFailed, reason)
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code as i32, self.message)
    }
}

impl From<crate::errors::LPSystemError> for ServiceError {
    fn from(err: crate::errors::LPSystemError) -> Self {
        Self::aggregation_failed(format!("聚合查询失败: {err}"))
    }
}
