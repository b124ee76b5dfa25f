//! 动态配置缓存
//!
//! 启动时从 `system_settings` 表加载，管理员修改后热更新。
//! 未加载或值无法解析时回落到 `AppConfig`。

use std::collections::HashMap;
use std::sync::OnceLock;
use tokio::sync::RwLock;

use crate::config::AppConfig;
use crate::models::system::keys;

static DYNAMIC_CONFIG: OnceLock<RwLock<HashMap<String, String>>> = OnceLock::new();

fn store() -> &'static RwLock<HashMap<String, String>> {
    DYNAMIC_CONFIG.get_or_init(|| RwLock::new(HashMap::new()))
}

/// 动态配置访问接口
pub struct DynamicConfig;

impl DynamicConfig {
    /// 用数据库中的全部配置项替换缓存内容
    pub async fn init(settings: Vec<(String, String)>) {
        let mut guard = store().write().await;
        guard.clear();
        guard.extend(settings);
        tracing::info!("动态配置缓存初始化完成，加载了 {} 个配置项", guard.len());
    }

    /// 更新单个配置项
    pub async fn update(key: &str, value: &str) {
        store()
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        tracing::debug!("动态配置更新: {} = {}", key, value);
    }

    async fn get_string(key: &str) -> Option<String> {
        DYNAMIC_CONFIG.get()?.read().await.get(key).cloned()
    }

    async fn get_i64(key: &str) -> Option<i64> {
        Self::get_string(key).await.and_then(|v| v.parse().ok())
    }

    async fn get_bool(key: &str) -> Option<bool> {
        Self::get_string(key).await.and_then(|v| v.parse().ok())
    }

    pub async fn site_name() -> String {
        Self::get_string(keys::SITE_NAME)
            .await
            .unwrap_or_else(|| AppConfig::get().app.system_name.clone())
    }

    pub async fn site_description() -> String {
        Self::get_string(keys::SITE_DESCRIPTION)
            .await
            .unwrap_or_default()
    }

    pub async fn contact_email() -> String {
        Self::get_string(keys::SITE_CONTACT_EMAIL)
            .await
            .unwrap_or_default()
    }

    /// 是否开放自助注册，默认开放
    pub async fn allow_registration() -> bool {
        Self::get_bool(keys::SITE_ALLOW_REGISTRATION)
            .await
            .unwrap_or(true)
    }

    pub async fn maintenance_mode() -> bool {
        Self::get_bool(keys::SITE_MAINTENANCE_MODE)
            .await
            .unwrap_or(false)
    }

    /// Access Token 有效期（分钟）
    pub async fn access_token_expiry() -> i64 {
        Self::get_i64(keys::JWT_ACCESS_TOKEN_EXPIRY)
            .await
            .filter(|v| *v > 0)
            .unwrap_or_else(|| AppConfig::get().jwt.access_token_expiry)
    }

    /// Refresh Token 有效期（天）
    pub async fn refresh_token_expiry() -> i64 {
        Self::get_i64(keys::JWT_REFRESH_TOKEN_EXPIRY)
            .await
            .filter(|v| *v > 0)
            .unwrap_or_else(|| AppConfig::get().jwt.refresh_token_expiry)
    }

    /// 记住我时的 Refresh Token 有效期（天）
    pub async fn refresh_token_remember_me_expiry() -> i64 {
        Self::get_i64(keys::JWT_REFRESH_TOKEN_REMEMBER_ME_EXPIRY)
            .await
            .filter(|v| *v > 0)
            .unwrap_or_else(|| AppConfig::get().jwt.refresh_token_remember_me_expiry)
    }

    /// CORS 预检缓存时间（秒）
    pub async fn cors_max_age() -> usize {
        Self::get_i64(keys::CORS_MAX_AGE)
            .await
            .and_then(|v| usize::try_from(v).ok())
            .unwrap_or_else(|| AppConfig::get().cors.max_age)
    }
}
