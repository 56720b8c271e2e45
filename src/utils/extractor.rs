//! 路径参数安全提取器
//!
//! 把路径里的 ID 段解析为正整数 i64，解析失败时直接以
//! 统一的 JSON 错误体返回 400，处理函数里拿到的一定是合法值。

use crate::models::{ApiResponse, ErrorCode};
use actix_web::{FromRequest, HttpRequest, dev::Payload, error::InternalError};
use futures_util::future::{Ready, ready};

/// 按路径参数名声明一个 i64 提取器
macro_rules! declare_safe_id_extractor {
    ($(($name:ident, $param:literal)),* $(,)?) => {
        $(
            #[derive(Debug, Clone, Copy)]
            pub struct $name(pub i64);

            impl FromRequest for $name {
                type Error = actix_web::Error;
                type Future = Ready<Result<Self, Self::Error>>;

                fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
                    let parsed = req
                        .match_info()
                        .get($param)
                        .and_then(|raw| raw.parse::<i64>().ok())
                        .filter(|id| *id > 0);

                    ready(match parsed {
                        Some(id) => Ok($name(id)),
                        None => {
                            let body = ApiResponse::<()>::error_empty(
                                ErrorCode::BadRequest,
                                format!("无效的路径参数: {}", $param),
                            );
                            Err(InternalError::from_response(
                                "invalid path parameter",
                                actix_web::HttpResponse::BadRequest().json(body),
                            )
                            .into())
                        }
                    })
                }
            }
        )*
    };
}

declare_safe_id_extractor! {
    (SafeStudentIdI64, "student_id"),
    (SafeCourseIdI64, "course_id"),
}
