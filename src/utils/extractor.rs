//! 路径参数提取器
//!
//! 解析失败时直接返回统一的 JSON 错误包体，而不是 actix 默认的纯文本 404。

use actix_web::{
    FromRequest, HttpRequest, HttpResponse, dev::Payload, error::InternalError,
};
use futures_util::future::{Ready, ready};

use crate::models::{ApiResponse, ErrorCode};

fn bad_path(message: String) -> actix_web::Error {
    InternalError::from_response(
        message.clone(),
        HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, message)),
    )
    .into()
}

fn parse_positive_id(req: &HttpRequest, name: &str) -> Result<i64, actix_web::Error> {
    let raw = req
        .match_info()
        .get(name)
        .ok_or_else(|| bad_path(format!("Missing path parameter '{name}'")))?;
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(bad_path(format!("Invalid {name}: '{raw}'"))),
    }
}

macro_rules! define_id_extractor {
    ($(#[$meta:meta])* $name:ident, $param:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy)]
        pub struct $name(pub i64);

        impl FromRequest for $name {
            type Error = actix_web::Error;
            type Future = Ready<Result<Self, Self::Error>>;

            fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
                ready(parse_positive_id(req, $param).map($name))
            }
        }
    };
}

define_id_extractor!(
    /// 路径中的 `{id}`
    SafeIDI64,
    "id"
);
define_id_extractor!(SafeCourseIdI64, "course_id");
define_id_extractor!(SafeQuizIdI64, "quiz_id");

/// 直播房间 ID（UUID 字符串）
#[derive(Debug, Clone)]
pub struct SafeRoomId(pub String);

impl FromRequest for SafeRoomId {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = match req.match_info().get("room_id") {
            Some(raw) => uuid::Uuid::parse_str(raw)
                .map(|id| SafeRoomId(id.to_string()))
                .map_err(|_| bad_path(format!("Invalid room id: '{raw}'"))),
            None => Err(bad_path("Missing path parameter 'room_id'".to_string())),
        };
        ready(result)
    }
}

/// 系统设置键，只允许 `section.name` 形式
#[derive(Debug, Clone)]
pub struct SafeSettingKey(pub String);

impl FromRequest for SafeSettingKey {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = match req.match_info().get("key") {
            Some(raw)
                if !raw.is_empty()
                    && raw.len() <= 64
                    && raw
                        .chars()
                        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '_') =>
            {
                Ok(SafeSettingKey(raw.to_string()))
            }
            Some(raw) => Err(bad_path(format!("Invalid setting key: '{raw}'"))),
            None => Err(bad_path("Missing path parameter 'key'".to_string())),
        };
        ready(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[actix_web::test]
    async fn test_id_extractor_accepts_positive() {
        let req = TestRequest::default().param("id", "42").to_http_request();
        let id = SafeIDI64::extract(&req).await.unwrap();
        assert_eq!(id.0, 42);
    }

    #[actix_web::test]
    async fn test_id_extractor_rejects_garbage() {
        for raw in ["0", "-3", "abc", "1.5"] {
            let req = TestRequest::default().param("id", raw).to_http_request();
            assert!(SafeIDI64::extract(&req).await.is_err(), "{raw}");
        }
    }

    #[actix_web::test]
    async fn test_setting_key_charset() {
        let req = TestRequest::default()
            .param("key", "site.allow_registration")
            .to_http_request();
        assert!(SafeSettingKey::extract(&req).await.is_ok());

        let req = TestRequest::default().param("key", "../etc").to_http_request();
        assert!(SafeSettingKey::extract(&req).await.is_err());
    }
}
