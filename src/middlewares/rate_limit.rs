/*!
 * 固定窗口限流
 *
 * 挂在登录、注册、刷新令牌三个资源上。已认证请求按用户计数，
 * 其余按客户端 IP 计数；超限返回 429 并带 `Retry-After`。
 *
 * ```rust,ignore
 * web::resource("/login")
 *     .wrap(RateLimit::login())
 *     .route(web::post().to(login))
 * ```
 */

use std::net::IpAddr;
use std::rc::Rc;
use std::time::{Duration, Instant};

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    http::header::{CONTENT_TYPE, HeaderName, HeaderValue},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use moka::future::Cache;
use once_cell::sync::Lazy;
use tracing::warn;

use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode};

const LIMIT_HEADER: HeaderName = HeaderName::from_static("x-ratelimit-limit");
const REMAINING_HEADER: HeaderName = HeaderName::from_static("x-ratelimit-remaining");

/// 一个计数窗口
#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    hits: u32,
}

/// 所有预设共用；条目最长保留一小时，足够覆盖任何窗口
static WINDOWS: Lazy<Cache<String, Window>> = Lazy::new(|| {
    Cache::builder()
        .time_to_idle(Duration::from_secs(3600))
        .max_capacity(100_000)
        .build()
});

/// 一次计数的结论
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Allowed { remaining: u32 },
    Limited { retry_after: u64 },
}

#[derive(Clone)]
pub struct RateLimit {
    max_requests: u32,
    window: Duration,
    scope: &'static str,
}

impl RateLimit {
    pub fn new(scope: &'static str, max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
            scope,
        }
    }

    /// 5 次/分钟
    pub fn login() -> Self {
        Self::new("login", 5, 60)
    }

    /// 3 次/分钟
    pub fn register() -> Self {
        Self::new("register", 3, 60)
    }

    /// 10 次/分钟
    pub fn refresh_token() -> Self {
        Self::new("refresh", 10, 60)
    }

    fn key(&self, subject: &str) -> String {
        format!("{}:{subject}", self.scope)
    }

    /// 记一次请求；窗口过期则重新开窗
    async fn hit(&self, key: String, now: Instant) -> Verdict {
        let window = self.window;
        let entry = WINDOWS
            .entry(key)
            .and_upsert_with(|existing| async move {
                match existing.map(|e| e.into_value()) {
                    Some(w) if now.duration_since(w.started) < window => Window {
                        started: w.started,
                        hits: w.hits.saturating_add(1),
                    },
                    _ => Window {
                        started: now,
                        hits: 1,
                    },
                }
            })
            .await;
        self.judge(entry.into_value(), now)
    }

    fn judge(&self, window: Window, now: Instant) -> Verdict {
        if window.hits <= self.max_requests {
            return Verdict::Allowed {
                remaining: self.max_requests - window.hits,
            };
        }
        let elapsed = now.duration_since(window.started);
        let left = self.window.saturating_sub(elapsed);
        // 向上取整，至少 1 秒
        Verdict::Limited {
            retry_after: left.as_secs() + u64::from(left.subsec_nanos() > 0 || left.is_zero()),
        }
    }
}

/// 连接地址优先，其次 X-Forwarded-For 第一跳，再次 X-Real-IP
fn client_ip(req: &ServiceRequest) -> String {
    let from_header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|ip| ip.parse::<IpAddr>().is_ok())
            .map(str::to_string)
    };

    let peer = req.connection_info().realip_remote_addr().map(str::to_string);
    peer.clone()
        .filter(|ip| ip.parse::<IpAddr>().is_ok())
        .or_else(|| from_header("X-Forwarded-For"))
        .or_else(|| from_header("X-Real-IP"))
        .or(peer)
        .unwrap_or_else(|| "unknown".to_string())
}

fn subject(req: &ServiceRequest) -> String {
    match req.extensions().get::<User>() {
        Some(user) => format!("user:{}", user.id),
        None => format!("ip:{}", client_ip(req)),
    }
}

fn too_many_requests(retry_after: u64, limit: u32) -> HttpResponse {
    HttpResponse::build(StatusCode::TOO_MANY_REQUESTS)
        .insert_header((CONTENT_TYPE, "application/json; charset=utf-8"))
        .insert_header(("Retry-After", retry_after.to_string()))
        .insert_header((LIMIT_HEADER, limit.to_string()))
        .insert_header((REMAINING_HEADER, "0"))
        .json(ApiResponse::<()>::error_empty(
            ErrorCode::RateLimitExceeded,
            "Too many requests, please try again later",
        ))
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service: Rc::new(service),
            limit: self.clone(),
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
    limit: RateLimit,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    actix_service::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let limit = self.limit.clone();

        Box::pin(async move {
            let key = limit.key(&subject(&req));
            match limit.hit(key.clone(), Instant::now()).await {
                Verdict::Limited { retry_after } => {
                    warn!("Rate limit exceeded for {key}, retry in {retry_after}s");
                    let response = too_many_requests(retry_after, limit.max_requests);
                    Ok(req.into_response(response.map_into_right_body()))
                }
                Verdict::Allowed { remaining } => {
                    let mut res = srv.call(req).await?;
                    let headers = res.headers_mut();
                    headers.insert(LIMIT_HEADER, HeaderValue::from(limit.max_requests));
                    headers.insert(REMAINING_HEADER, HeaderValue::from(remaining));
                    Ok(res.map_into_left_body())
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let login = RateLimit::login();
        assert_eq!((login.max_requests, login.window.as_secs()), (5, 60));
        assert_eq!(login.key("ip:1.2.3.4"), "login:ip:1.2.3.4");
        assert_eq!(RateLimit::register().max_requests, 3);
        assert_eq!(RateLimit::refresh_token().scope, "refresh");
    }

    #[test]
    fn test_judge_retry_after_rounds_up() {
        let limit = RateLimit::new("t", 2, 60);
        let start = Instant::now();
        let within = Window { started: start, hits: 2 };
        assert_eq!(limit.judge(within, start), Verdict::Allowed { remaining: 0 });

        let over = Window { started: start, hits: 3 };
        let later = start + Duration::from_millis(20_500);
        assert_eq!(limit.judge(over, later), Verdict::Limited { retry_after: 40 });
    }

    #[test_log::test(tokio::test)]
    async fn test_window_counts_then_resets() {
        let limit = RateLimit::new("window-test", 2, 10);
        let key = limit.key("ip:10.0.0.1");
        let start = Instant::now();

        assert_eq!(
            limit.hit(key.clone(), start).await,
            Verdict::Allowed { remaining: 1 }
        );
        assert_eq!(
            limit.hit(key.clone(), start).await,
            Verdict::Allowed { remaining: 0 }
        );
        assert!(matches!(
            limit.hit(key.clone(), start + Duration::from_secs(3)).await,
            Verdict::Limited { retry_after: 7 }
        ));

        // 窗口过后重新计数
        assert_eq!(
            limit.hit(key, start + Duration::from_secs(11)).await,
            Verdict::Allowed { remaining: 1 }
        );
    }

    #[actix_web::test]
    async fn test_middleware_rejects_with_envelope() {
        use actix_web::{App, test, web};

        let app = test::init_service(
            App::new().service(
                web::resource("/limited")
                    .wrap(RateLimit::new("mw-test", 1, 60))
                    .route(web::post().to(HttpResponse::Ok)),
            ),
        )
        .await;

        let ok = test::call_service(&app, test::TestRequest::post().uri("/limited").to_request()).await;
        assert_eq!(ok.status(), StatusCode::OK);
        assert_eq!(ok.headers().get(REMAINING_HEADER).unwrap(), "0");

        let limited =
            test::call_service(&app, test::TestRequest::post().uri("/limited").to_request()).await;
        assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(limited.headers().contains_key("Retry-After"));
        let body: serde_json::Value = test::read_body_json(limited).await;
        assert_eq!(body["success"], false);
    }
}
