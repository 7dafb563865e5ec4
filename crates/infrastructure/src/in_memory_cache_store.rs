use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;
use warden_application::CacheStore;
use warden_core::AppResult;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Vec<u8>,
    expires_at: Instant,
}

/// Process-local cache adapter for single-node deployments and tests.
#[derive(Default)]
pub struct InMemoryCacheStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl InMemoryCacheStore {
    /// Creates an empty in-memory cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn get(&self, key: &str) -> AppResult<Option<Vec<u8>>> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Ok(Some(entry.value.clone()));
                }
                Some(_) => {}
                None => return Ok(None),
            }
        }

        let mut entries = self.entries.write().await;
        if entries
            .get(key)
            .is_some_and(|entry| entry.expires_at <= Instant::now())
        {
            entries.remove(key);
        }

        Ok(None)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl_seconds: u32) -> AppResult<()> {
        if ttl_seconds == 0 {
            return Ok(());
        }

        let now = Instant::now();
        let expires_at = now
            .checked_add(Duration::from_secs(u64::from(ttl_seconds)))
            .unwrap_or(now);

        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(key.to_owned(), CacheEntry { value, expires_at });

        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use warden_application::CacheStore;

    use super::InMemoryCacheStore;

    #[tokio::test]
    async fn stored_value_is_returned_until_deleted() {
        let cache = InMemoryCacheStore::new();
        assert!(cache.set("k", b"v".to_vec(), 60).await.is_ok());
        assert_eq!(cache.get("k").await.ok().flatten(), Some(b"v".to_vec()));

        assert!(cache.delete("k").await.is_ok());
        assert_eq!(cache.get("k").await.ok().flatten(), None);
        assert!(cache.delete("k").await.is_ok());
    }

    #[tokio::test]
    async fn expired_entries_are_dropped_on_next_write() {
        let cache = InMemoryCacheStore::new();
        assert!(cache.set("token_validity_key.1.old", b"old".to_vec(), 1).await.is_ok());

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert!(cache.set("token_validity_key.1.new", b"new".to_vec(), 60).await.is_ok());

        {
            let entries = cache.entries.read().await;
            assert!(!entries.contains_key("token_validity_key.1.old"));
            assert!(entries.contains_key("token_validity_key.1.new"));
        }
        assert_eq!(
            cache.get("token_validity_key.1.old").await.ok().flatten(),
            None
        );
    }

    #[tokio::test]
    async fn expired_entry_is_a_miss() {
        let cache = InMemoryCacheStore::new();
        assert!(cache.set("k", b"v".to_vec(), 1).await.is_ok());

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(cache.get("k").await.ok().flatten(), None);
        assert!(cache.entries.read().await.is_empty());
    }

    #[tokio::test]
    async fn zero_ttl_skips_write() {
        let cache = InMemoryCacheStore::new();
        assert!(cache.set("k", b"v".to_vec(), 0).await.is_ok());
        assert_eq!(cache.get("k").await.ok().flatten(), None);
    }
}
