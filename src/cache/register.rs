//! 缓存后端插件表
//!
//! 各后端通过 `declare_object_cache_plugin!` 在进程启动前登记构造函数。

use std::{future::Future, pin::Pin, sync::Arc};

use dashmap::DashMap;
use once_cell::sync::Lazy;

use crate::cache::ObjectCache;
use crate::errors::Result;

pub type CacheFuture = Pin<Box<dyn Future<Output = Result<Box<dyn ObjectCache>>> + Send>>;
pub type CacheConstructor = Arc<dyn Fn() -> CacheFuture + Send + Sync>;

static BACKENDS: Lazy<DashMap<&'static str, CacheConstructor>> = Lazy::new(DashMap::new);

/// 同名后端后登记者覆盖先登记者
pub fn register_object_cache_plugin(name: &'static str, constructor: CacheConstructor) {
    BACKENDS.insert(name, constructor);
}

pub fn get_object_cache_plugin(name: &str) -> Option<CacheConstructor> {
    BACKENDS.get(name).map(|entry| entry.value().clone())
}

pub fn registered_backends() -> Vec<&'static str> {
    let mut names: Vec<_> = BACKENDS.iter().map(|entry| *entry.key()).collect();
    names.sort_unstable();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_backends_registered() {
        let names = registered_backends();
        assert!(names.contains(&"moka"));
        assert!(names.contains(&"redis"));
        assert!(get_object_cache_plugin("memcached").is_none());
    }

    #[test_log::test(tokio::test)]
    async fn test_moka_constructor_builds_cache() {
        let constructor = get_object_cache_plugin("moka").expect("moka registered");
        let cache = constructor().await.expect("moka cache");
        cache.insert_raw("k".into(), "v".into(), 0).await;
        assert_eq!(
            cache.get_raw("k").await,
            crate::cache::CacheResult::Found("v".to_string())
        );
    }
}
