use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;
use warden_core::AppResult;

use crate::{CacheSettings, CacheStore};

/// Best-effort cache front for authority lookups.
///
/// Store failures and undecodable entries are logged and treated as misses;
/// they never reach the caller. Only resolver errors propagate.
#[derive(Clone)]
pub struct CacheAside {
    store: Arc<dyn CacheStore>,
    settings: CacheSettings,
}

impl CacheAside {
    /// Creates a cache front over a store.
    #[must_use]
    pub fn new(store: Arc<dyn CacheStore>, settings: CacheSettings) -> Self {
        Self { store, settings }
    }

    /// Returns the configured entry lifetime.
    #[must_use]
    pub fn ttl_seconds(&self) -> u32 {
        self.settings.ttl_seconds
    }

    /// Reads and decodes a JSON entry.
    pub async fn lookup<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let bytes = self.read(key).await?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(error) => {
                warn!(cache_key = key, error = %error, "discarding undecodable cache entry");
                None
            }
        }
    }

    /// Reads a plain text entry.
    pub async fn lookup_text(&self, key: &str) -> Option<String> {
        let bytes = self.read(key).await?;
        match String::from_utf8(bytes) {
            Ok(value) => Some(value),
            Err(error) => {
                warn!(cache_key = key, error = %error, "discarding non-utf8 cache entry");
                None
            }
        }
    }

    /// Encodes and writes a JSON entry.
    pub async fn store<T: Serialize + Sync>(&self, key: &str, value: &T) {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.write(key, bytes).await,
            Err(error) => {
                warn!(cache_key = key, error = %error, "failed to encode cache entry");
            }
        }
    }

    /// Writes a plain text entry.
    pub async fn store_text(&self, key: &str, value: &str) {
        self.write(key, value.as_bytes().to_vec()).await;
    }

    /// Removes an entry.
    pub async fn evict(&self, key: &str) {
        if let Err(error) = self.store.delete(key).await {
            warn!(cache_key = key, error = %error, "failed to evict cache entry");
        }
    }

    /// Returns the value assembled from cache, or defers to the authority on a miss.
    ///
    /// Every cache-then-authority path goes through here. The resolver owns
    /// any cache refresh, so an authority error is the only error surfaced.
    pub async fn lookup_or_resolve<T, C, F, Fut>(&self, cached: C, resolve: F) -> AppResult<T>
    where
        C: Future<Output = Option<T>> + Send,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = AppResult<T>> + Send,
    {
        if let Some(value) = cached.await {
            return Ok(value);
        }

        resolve().await
    }

    /// Accepts a cached text value when `accept` holds, otherwise defers to the authority.
    ///
    /// The resolver owns any cache refresh for `key`.
    pub async fn check_or_resolve<P, F, Fut>(
        &self,
        key: &str,
        accept: P,
        resolve: F,
    ) -> AppResult<bool>
    where
        P: FnOnce(&str) -> bool + Send,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = AppResult<bool>> + Send,
    {
        let cached = async {
            self.lookup_text(key)
                .await
                .filter(|cached| accept(cached.as_str()))
                .map(|_| true)
        };

        self.lookup_or_resolve(cached, resolve).await
    }

    async fn read(&self, key: &str) -> Option<Vec<u8>> {
        match self.store.get(key).await {
            Ok(value) => value,
            Err(error) => {
                warn!(cache_key = key, error = %error, "cache read failed, falling back to authority");
                None
            }
        }
    }

    async fn write(&self, key: &str, bytes: Vec<u8>) {
        if let Err(error) = self.store.set(key, bytes, self.settings.ttl_seconds).await {
            warn!(cache_key = key, error = %error, "cache write failed");
        }
    }
}
