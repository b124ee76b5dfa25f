use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::middlewares::{RequireJWT, require_jwt::bearer_token};
use crate::models::ApiResponse;
use crate::utils::jwt::JwtUtils;

use super::AuthService;

/// 处理用户登出
/// 失效缓存中的会话，并下发空的 refresh_token cookie
pub async fn handle_logout(service: &AuthService, request: &HttpRequest) -> ActixResult<HttpResponse> {
    if let Some(token) = bearer_token(request) {
        let cache = service.get_cache(request);
        RequireJWT::evict_token(&cache, &token).await;
    }

    // max_age=0 会让浏览器删除该 cookie
    let empty_cookie = JwtUtils::create_empty_refresh_token_cookie();

    Ok(HttpResponse::Ok()
        .cookie(empty_cookie)
        .json(ApiResponse::<()>::success_empty("Logged out")))
}
