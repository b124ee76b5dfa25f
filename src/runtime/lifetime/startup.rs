use std::sync::Arc;

use rand::Rng;
use tracing::{debug, info, warn};

use crate::cache::{ObjectCache, register::get_object_cache_plugin};
use crate::config::AppConfig;
use crate::models::users::entities::UserRole;
use crate::models::users::requests::NewUser;
use crate::services::system::DynamicConfig;
use crate::storage::Storage;
use crate::utils::password::hash_password;

const FALLBACK_CACHE: &str = "moka";
const ADMIN_PASSWORD_ENV: &str = "ADMIN_PASSWORD";

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
}

/// 按配置创建缓存，失败时退回进程内缓存
async fn create_cache() -> Result<Arc<dyn ObjectCache>, String> {
    let configured = AppConfig::get().cache.cache_type.as_str();
    let mut candidates = vec![configured];
    if configured != FALLBACK_CACHE {
        candidates.push(FALLBACK_CACHE);
    }

    for backend in candidates {
        let Some(constructor) = get_object_cache_plugin(backend) else {
            warn!("Cache backend '{}' is not registered", backend);
            continue;
        };
        match constructor().await {
            Ok(cache) => {
                if backend != configured {
                    warn!("Using {} cache instead of {}", backend, configured);
                }
                return Ok(Arc::from(cache));
            }
            Err(e) => warn!("Failed to create {} cache: {}", backend, e),
        }
    }

    Err(format!("no cache backend available (configured: {configured})"))
}

fn generate_password(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz23456789!@#%";
    let mut rng = rand::rng();
    (0..length)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

/// 数据库中的设置覆盖配置文件
async fn init_dynamic_config(storage: &Arc<dyn Storage>) {
    let settings = match storage.list_all_settings().await {
        Ok(settings) => settings.into_iter().map(|s| (s.key, s.value)).collect(),
        Err(e) => {
            warn!("Failed to load settings from database, using defaults: {}", e);
            Vec::new()
        }
    };
    DynamicConfig::init(settings).await;
}

/// 空库时创建 admin 账号；密码未配置则生成一次并打印
async fn seed_admin(storage: &Arc<dyn Storage>) {
    match storage.count_users().await {
        Ok(0) => info!("Empty user table, creating the initial admin account"),
        Ok(count) => {
            debug!("{} users present, admin seed skipped", count);
            return;
        }
        Err(e) => {
            warn!("Failed to count users, admin seed skipped: {}", e);
            return;
        }
    }

    let password = std::env::var(ADMIN_PASSWORD_ENV).unwrap_or_else(|_| {
        let generated = generate_password(16);
        warn!("{} is not set, generated admin password: {}", ADMIN_PASSWORD_ENV, generated);
        warn!("Sign in as 'admin' and change it right away");
        generated
    });

    let password_hash = match hash_password(&password) {
        Ok(hash) => hash,
        Err(e) => {
            warn!("Failed to hash admin password, admin seed skipped: {}", e);
            return;
        }
    };

    let admin = NewUser {
        username: "admin".to_string(),
        email: "admin@localhost".to_string(),
        password_hash,
        full_name: "Administrator".to_string(),
        role: UserRole::Admin,
    };
    match storage.create_user(admin).await {
        Ok(user) => info!("Admin account created (id {})", user.id),
        Err(e) => warn!("Failed to create admin account: {}", e),
    }
}

/// 存储、迁移、动态配置、种子数据与缓存
pub async fn prepare_server_startup() -> StartupContext {
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    debug!(
        "Cache backends available: {:?}",
        crate::cache::register::registered_backends()
    );

    let storage = crate::storage::create_storage()
        .await
        .expect("Failed to create storage backend");
    warn!(
        "Storage ready on {} backend, migrations applied",
        storage.database_backend()
    );

    init_dynamic_config(&storage).await;
    seed_admin(&storage).await;

    let cache = create_cache().await.expect("Failed to create cache");
    warn!("Cache backend initialized");

    StartupContext { storage, cache }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_password_shape() {
        let password = generate_password(16);
        assert_eq!(password.chars().count(), 16);
        assert!(!password.contains('0') && !password.contains('O'));
    }
}
