use std::sync::Arc;

use warden_application::{CacheAside, CacheSettings, CacheStore};
use warden_infrastructure::{InMemoryCacheStore, RedisCacheStore};

use crate::api_config::ApiConfig;

pub(super) fn build_cache(config: &ApiConfig, redis_client: Option<redis::Client>) -> CacheAside {
    let store: Arc<dyn CacheStore> = match redis_client {
        Some(redis_client) => Arc::new(RedisCacheStore::new(
            redis_client,
            config.cache_key_prefix.as_str(),
        )),
        None => Arc::new(InMemoryCacheStore::new()),
    };

    CacheAside::new(
        store,
        CacheSettings {
            ttl_seconds: config.cache_ttl_seconds,
        },
    )
}
