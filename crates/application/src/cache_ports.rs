use async_trait::async_trait;
use warden_core::AppResult;

/// Default lifetime of every cached authorization artifact.
pub const DEFAULT_CACHE_TTL_SECONDS: u32 = 60 * 60;

/// Key/value store with per-key expiry used for derived authorization data.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Reads a cached value, returning `None` on miss or expiry.
    async fn get(&self, key: &str) -> AppResult<Option<Vec<u8>>>;

    /// Writes a value that expires after `ttl_seconds`. A zero TTL skips the write.
    async fn set(&self, key: &str, value: Vec<u8>, ttl_seconds: u32) -> AppResult<()>;

    /// Removes a cached value. Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> AppResult<()>;
}

/// Cache behavior shared by every resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    /// Lifetime of cached entries.
    pub ttl_seconds: u32,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_seconds: DEFAULT_CACHE_TTL_SECONDS,
        }
    }
}
