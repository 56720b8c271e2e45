use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::users::entities::UserRole;
use crate::services::AnalyticsService;
use crate::utils::SafeCourseIdI64;

// 懒加载的全局 AnalyticsService 实例
static ANALYTICS_SERVICE: Lazy<AnalyticsService> = Lazy::new(AnalyticsService::new_lazy);

// 课程分析
pub async fn get_course_analytics(
    req: HttpRequest,
    path: SafeCourseIdI64,
) -> ActixResult<HttpResponse> {
    ANALYTICS_SERVICE.get_course_analytics(&req, path.0).await
}

// 配置路由
pub fn configure_analytics_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/analytics")
            .wrap(middlewares::RequireJWT)
            // 课程分析 - 仅教师和管理员
            .service(
                web::resource("/courses/{course_id}")
                    .route(web::get().to(get_course_analytics))
                    .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
            ),
    );
}
