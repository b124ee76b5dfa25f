/*!
 * JWT 认证中间件
 *
 * 校验 `Authorization: Bearer <access_token>`，通过后把当前用户放入请求扩展。
 *
 * ```rust,ignore
 * web::scope("")
 *     .wrap(RequireJWT)
 *     .route("/me", web::get().to(me_handler))
 * ```
 *
 * 用户信息按 `user:{token}` 缓存，并带上读库之前取到的会话代数
 * `user_session_gen:{id}`。锁定、改角色、改密码时换一个新代数，
 * 旧代数的缓存条目（包括并发请求稍后写入的）一律视为未命中。
 */

use crate::cache::{CacheResult, ObjectCache};
use crate::config::AppConfig;
use crate::models::ErrorCode;
use crate::models::users::entities::User;
use crate::storage::Storage;
use crate::utils::jwt::JwtUtils;
use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpRequest, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use serde::{Deserialize, Serialize};
use std::{rc::Rc, sync::Arc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::create_error_response;

const BEARER_PREFIX: &str = "Bearer ";
const AUTHORIZATION_HEADER: &str = "Authorization";

#[derive(Clone)]
pub struct RequireJWT;

/// 认证失败
#[derive(Debug)]
pub struct AuthRejection {
    pub status: StatusCode,
    pub code: ErrorCode,
    pub message: String,
}

impl AuthRejection {
    fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            code: ErrorCode::Unauthorized,
            message: message.into(),
        }
    }
}

fn user_cache_key(token: &str) -> String {
    format!("user:{token}")
}

fn session_generation_key(user_id: i64) -> String {
    format!("user_session_gen:{user_id}")
}

#[derive(Serialize, Deserialize)]
struct CachedSession {
    generation: String,
    user: User,
}

fn session_ttl() -> u64 {
    AppConfig::get().cache.default_ttl
}

/// 当前会话代数；缺失时新建，丢失代数只会让旧条目失效
async fn session_generation(cache: &Arc<dyn ObjectCache>, user_id: i64) -> String {
    let key = session_generation_key(user_id);
    match cache.get_raw(&key).await {
        CacheResult::Found(generation) => generation,
        _ => {
            let generation = Uuid::new_v4().to_string();
            cache.insert_raw(key, generation.clone(), session_ttl()).await;
            generation
        }
    }
}

/// 从 Authorization 头取出 Bearer token
pub fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix(BEARER_PREFIX))
        .map(|s| s.trim().to_string())
}

/// 校验 access token 并加载用户；WebSocket 握手等无法挂中间件的入口也走这里
pub async fn authenticate(
    token: &str,
    storage: &Arc<dyn Storage>,
    cache: &Arc<dyn ObjectCache>,
) -> Result<User, AuthRejection> {
    let claims = JwtUtils::verify_access_token(token).map_err(|err| {
        info!("JWT token validation failed: {}", err);
        AuthRejection::unauthorized("Invalid or expired token")
    })?;

    let user_id = claims
        .user_id()
        .ok_or_else(|| AuthRejection::unauthorized("Invalid user ID in token"))?;

    // 必须先于读库取代数
    let generation = session_generation(cache, user_id).await;
    if let CacheResult::Found(session) = cache
        .get_json::<CachedSession>(&user_cache_key(token))
        .await
        && session.generation == generation
        && session.user.id == user_id
    {
        debug!("User {} loaded from cache", user_id);
        return Ok(session.user);
    }

    let user = storage
        .get_user_by_id(user_id)
        .await
        .map_err(|e| {
            warn!("Failed to load user {user_id} for authentication: {e}");
            AuthRejection {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                code: ErrorCode::InternalServerError,
                message: "Failed to retrieve user".to_string(),
            }
        })?
        .ok_or_else(|| AuthRejection::unauthorized("User not found"))?;

    if !user.is_active() {
        return Err(AuthRejection {
            status: StatusCode::FORBIDDEN,
            code: ErrorCode::AccountLocked,
            message: "Account is locked".to_string(),
        });
    }

    let session = CachedSession { generation, user };
    cache
        .insert_json(user_cache_key(token), &session, session_ttl())
        .await;
    Ok(session.user)
}

impl<S, B> Transform<S, ServiceRequest> for RequireJWT
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireJWTMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireJWTMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireJWTMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireJWTMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        Box::pin(async move {
            // 预检请求直接放行
            if req.method() == actix_web::http::Method::OPTIONS {
                return Ok(req.into_response(HttpResponse::NoContent().finish().map_into_right_body()));
            }

            let Some(token) = bearer_token(req.request()) else {
                info!("Missing Authorization header for {}", req.path());
                return Ok(req.into_response(
                    create_error_response(
                        StatusCode::UNAUTHORIZED,
                        ErrorCode::Unauthorized,
                        "Missing or invalid Authorization header",
                    )
                    .map_into_right_body(),
                ));
            };

            let storage = req
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone();
            let cache = req
                .app_data::<actix_web::web::Data<Arc<dyn ObjectCache>>>()
                .expect("Cache not found in app data")
                .get_ref()
                .clone();

            match authenticate(&token, &storage, &cache).await {
                Ok(user) => {
                    debug!("JWT authentication successful for ID: {}", user.id);
                    req.extensions_mut().insert(user);
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Err(rejection) => {
                    info!(
                        "JWT authentication failed for request to {}: {}",
                        req.path(),
                        rejection.message
                    );
                    Ok(req.into_response(
                        create_error_response(rejection.status, rejection.code, &rejection.message)
                            .map_into_right_body(),
                    ))
                }
            }
        })
    }
}

impl RequireJWT {
    /// 当前用户（需挂载 RequireJWT）
    pub fn extract_user_claims(req: &HttpRequest) -> Option<User> {
        req.extensions().get::<User>().cloned()
    }

    /// 注销时失效单个 token
    pub async fn evict_token(cache: &Arc<dyn ObjectCache>, token: &str) {
        cache.remove(&user_cache_key(token)).await;
    }

    /// 失效某用户的全部缓存会话
    pub async fn evict_user(cache: &Arc<dyn ObjectCache>, user_id: i64) {
        cache
            .insert_raw(
                session_generation_key(user_id),
                Uuid::new_v4().to_string(),
                session_ttl(),
            )
            .await;
        debug!("Evicted cached sessions for user {user_id}");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::cache::object_cache::moka::MokaObjectCache;
    use crate::models::users::entities::{UserRole, UserStatus};
    use crate::models::users::requests::NewUser;
    use crate::storage::sea_orm_storage::SeaOrmStorage;

    async fn setup() -> (Arc<dyn Storage>, Arc<dyn ObjectCache>, User) {
        let storage: Arc<dyn Storage> = Arc::new(SeaOrmStorage::in_memory().await.unwrap());
        let cache: Arc<dyn ObjectCache> =
            Arc::new(MokaObjectCache::new(1000, Duration::from_secs(60)));
        let user = storage
            .create_user(NewUser {
                username: "dijkstra".to_string(),
                email: "dijkstra@example.com".to_string(),
                password_hash: "x".to_string(),
                full_name: "Edsger".to_string(),
                role: UserRole::User,
            })
            .await
            .unwrap();
        (storage, cache, user)
    }

    fn access_token(user: &User, minutes: i64) -> String {
        user.generate_token_pair(chrono::TimeDelta::minutes(minutes), chrono::TimeDelta::days(1))
            .unwrap()
            .access_token
    }

    #[test_log::test(tokio::test)]
    async fn test_evict_user_drops_every_cached_token() {
        let (storage, cache, user) = setup().await;
        let laptop = access_token(&user, 5);
        let phone = access_token(&user, 10);
        assert_ne!(laptop, phone);
        for token in [&laptop, &phone] {
            assert_eq!(authenticate(token, &storage, &cache).await.unwrap().id, user.id);
        }

        storage
            .set_users_status(&[user.id], UserStatus::Locked, 0)
            .await
            .unwrap();
        // 未失效前命中缓存
        assert!(authenticate(&laptop, &storage, &cache).await.is_ok());

        RequireJWT::evict_user(&cache, user.id).await;
        for token in [&laptop, &phone] {
            let rejection = authenticate(token, &storage, &cache).await.unwrap_err();
            assert_eq!(rejection.status, StatusCode::FORBIDDEN);
            assert_eq!(rejection.code, ErrorCode::AccountLocked);
        }
    }

    #[test_log::test(tokio::test)]
    async fn test_entry_written_after_eviction_is_stale() {
        let (storage, cache, user) = setup().await;
        let token = access_token(&user, 5);

        // 请求 A 取到代数并读到未锁定的用户
        let generation = session_generation(&cache, user.id).await;
        let loaded = storage.get_user_by_id(user.id).await.unwrap().unwrap();

        // 管理员锁定并失效会话
        storage
            .set_users_status(&[user.id], UserStatus::Locked, 0)
            .await
            .unwrap();
        RequireJWT::evict_user(&cache, user.id).await;

        // 请求 A 随后才写入缓存
        cache
            .insert_json(
                user_cache_key(&token),
                &CachedSession {
                    generation,
                    user: loaded,
                },
                60,
            )
            .await;

        let rejection = authenticate(&token, &storage, &cache).await.unwrap_err();
        assert_eq!(rejection.code, ErrorCode::AccountLocked);
    }
}
