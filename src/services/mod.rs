pub mod admin;
pub mod auth;
pub mod catalog;
pub mod course_ops;
pub mod export;
pub mod learning;
pub mod live;
pub mod notifications;
pub mod payments;
pub mod system;
pub mod teacher;
pub mod websocket;

pub use admin::AdminService;
pub use auth::AuthService;
pub use catalog::CatalogService;
pub use learning::LearningService;
pub use live::LiveService;
pub use notifications::NotificationService;
pub use payments::PaymentService;
pub use system::SystemService;
pub use teacher::TeacherService;

use actix_web::{HttpRequest, HttpResponse};
use tracing::{error, warn};

use crate::errors::LearnHubError;
use crate::middlewares::RequireJWT;
use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode};

/// 存储层错误转为统一响应
pub(crate) fn storage_error(err: LearnHubError, context: &str) -> HttpResponse {
    match err {
        LearnHubError::NotFound(msg) => {
            HttpResponse::NotFound().json(ApiResponse::error_empty(ErrorCode::NotFound, msg))
        }
        LearnHubError::Conflict(msg) => {
            warn!("{context}: {msg}");
            HttpResponse::Conflict().json(ApiResponse::error_empty(ErrorCode::Conflict, msg))
        }
        LearnHubError::Validation(msg) | LearnHubError::DateParse(msg) => HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::ValidationFailed, msg)),
        LearnHubError::Authorization(msg) => {
            HttpResponse::Forbidden().json(ApiResponse::error_empty(ErrorCode::Forbidden, msg))
        }
        other => {
            error!("{context}: {other}");
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("{context}: {}", other.message()),
            ))
        }
    }
}

/// 当前登录用户；路由未挂 RequireJWT 时返回 401
pub(crate) fn current_user(request: &HttpRequest) -> Result<User, HttpResponse> {
    RequireJWT::extract_user_claims(request).ok_or_else(|| {
        HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized access, please login",
        ))
    })
}

/// WebSocket 握手无法挂中间件，用查询参数里的 token 认证
pub(crate) async fn socket_user(
    token: &str,
    storage: &std::sync::Arc<dyn crate::storage::Storage>,
    cache: &std::sync::Arc<dyn crate::cache::ObjectCache>,
) -> Result<User, HttpResponse> {
    crate::middlewares::require_jwt::authenticate(token, storage, cache)
        .await
        .map_err(|rejection| {
            crate::middlewares::create_error_response(
                rejection.status,
                rejection.code,
                &rejection.message,
            )
        })
}

pub(crate) fn not_found(code: ErrorCode, message: &str) -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(code, message))
}

pub(crate) fn bad_request(code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(code, message))
}

pub(crate) fn conflict(code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::Conflict().json(ApiResponse::error_empty(code, message))
}

pub(crate) fn forbidden(code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::Forbidden().json(ApiResponse::error_empty(code, message))
}

/// 从 app_data 取存储与缓存，各服务共用
macro_rules! service_handles {
    ($service:ident) => {
        impl $service {
            pub fn new_lazy() -> Self {
                Self { storage: None }
            }

            pub(crate) fn get_storage(
                &self,
                request: &actix_web::HttpRequest,
            ) -> std::sync::Arc<dyn crate::storage::Storage> {
                if let Some(storage) = &self.storage {
                    storage.clone()
                } else {
                    request
                        .app_data::<actix_web::web::Data<std::sync::Arc<dyn crate::storage::Storage>>>()
                        .expect("Storage not found in app data")
                        .get_ref()
                        .clone()
                }
            }

            #[allow(dead_code)]
            pub(crate) fn get_cache(
                &self,
                request: &actix_web::HttpRequest,
            ) -> std::sync::Arc<dyn crate::cache::ObjectCache> {
                request
                    .app_data::<actix_web::web::Data<std::sync::Arc<dyn crate::cache::ObjectCache>>>()
                    .expect("Cache not found in app data")
                    .get_ref()
                    .clone()
            }
        }
    };
}

pub(crate) use service_handles;
