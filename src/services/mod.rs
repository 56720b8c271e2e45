pub mod achievements;
pub mod analytics;
pub mod dashboards;
pub mod progress;
pub mod query_guard;

pub use analytics::AnalyticsService;
pub use dashboards::DashboardService;
pub use progress::ProgressService;

use actix_web::HttpResponse;

use crate::models::{ApiResponse, ErrorCode, ServiceError};

/// 把业务层预期失败映射为 HTTP 响应
///
/// 状态码映射是路由/服务外层的职责，计算函数只返回 ServiceError。
pub(crate) fn service_error_to_response(err: &ServiceError) -> HttpResponse {
    let body = ApiResponse::<()>::error_empty(err.code, err.message.clone());
    match err.code {
        ErrorCode::BadRequest | ErrorCode::InvalidUpdateType => {
            HttpResponse::BadRequest().json(body)
        }
        ErrorCode::Unauthorized => HttpResponse::Unauthorized().json(body),
        ErrorCode::Forbidden => HttpResponse::Forbidden().json(body),
        ErrorCode::NotFound
        | ErrorCode::UserNotFound
        | ErrorCode::CourseNotFound
        | ErrorCode::PromotionNotFound
        | ErrorCode::StudentNotEnrolled
        | ErrorCode::CourseNotInPromotion => HttpResponse::NotFound().json(body),
        _ => HttpResponse::InternalServerError().json(body),
    }
}
