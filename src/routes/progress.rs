use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::progress::requests::UpdateProgressRequest;
use crate::services::ProgressService;
use crate::utils::{SafeCourseIdI64, SafeStudentIdI64};

// 懒加载的全局 ProgressService 实例
static PROGRESS_SERVICE: Lazy<ProgressService> = Lazy::new(ProgressService::new_lazy);

// 上报学习进度（幂等合并）
pub async fn update_student_progress(
    req: HttpRequest,
    student: SafeStudentIdI64,
    course: SafeCourseIdI64,
    body: web::Json<UpdateProgressRequest>,
) -> ActixResult<HttpResponse> {
    PROGRESS_SERVICE
        .update_student_progress(&req, student.0, course.0, body.into_inner())
        .await
}

// 配置路由
pub fn configure_progress_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/progress")
            .wrap(middlewares::RequireJWT)
            // 进度上报 - 所有登录用户可访问（幂等，重复上报安全）
            .service(
                web::resource("/students/{student_id}/courses/{course_id}")
                    .route(web::put().to(update_student_progress)),
            ),
    );
}
