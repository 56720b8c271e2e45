use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RequireJWT};
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::DashboardService;
use crate::utils::SafeStudentIdI64;

// 懒加载的全局 DashboardService 实例
static DASHBOARD_SERVICE: Lazy<DashboardService> = Lazy::new(DashboardService::new_lazy);

// 学生仪表盘
pub async fn get_student_dashboard(
    req: HttpRequest,
    path: SafeStudentIdI64,
) -> ActixResult<HttpResponse> {
    DASHBOARD_SERVICE.get_student_dashboard(&req, path.0).await
}

// 教师仪表盘（以当前登录用户为准，不接受路径参数）
pub async fn get_teacher_dashboard(req: HttpRequest) -> ActixResult<HttpResponse> {
    let teacher_id = match RequireJWT::extract_user_id(&req) {
        Some(id) => id,
        None => {
            return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
                ErrorCode::Unauthorized,
                "无法获取用户信息",
            )));
        }
    };

    DASHBOARD_SERVICE.get_teacher_dashboard(&req, teacher_id).await
}

// 管理员仪表盘
pub async fn get_admin_dashboard(req: HttpRequest) -> ActixResult<HttpResponse> {
    DASHBOARD_SERVICE.get_admin_dashboard(&req).await
}

// 配置路由
pub fn configure_dashboard_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/dashboards")
            .wrap(middlewares::RequireJWT)
            // 学生仪表盘 - 所有登录用户可访问
            .service(
                web::resource("/student/{student_id}")
                    .route(web::get().to(get_student_dashboard)),
            )
            // 教师仪表盘 - 仅教师和管理员
            .service(
                web::resource("/teacher")
                    .route(web::get().to(get_teacher_dashboard))
                    .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
            )
            // 管理员仪表盘 - 仅管理员
            .service(
                web::resource("/admin")
                    .route(web::get().to(get_admin_dashboard))
                    .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
            ),
    );
}
