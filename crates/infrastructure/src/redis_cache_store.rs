//! Redis-backed cache shared by every service in a deployment.

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;
use warden_application::CacheStore;
use warden_core::{AppError, AppResult};

/// Redis implementation of the cache port.
///
/// Keys are namespaced as `{prefix}:{key}` so several deployments can share one server.
#[derive(Clone)]
pub struct RedisCacheStore {
    client: redis::Client,
    key_prefix: String,
}

impl RedisCacheStore {
    /// Creates a cache adapter with a configured Redis client and key prefix.
    #[must_use]
    pub fn new(client: redis::Client, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
        }
    }

    fn key_for(&self, key: &str) -> String {
        format!("{}:{key}", self.key_prefix)
    }

    async fn connection(&self) -> AppResult<MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| AppError::Internal(format!("failed to connect to redis: {error}")))
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> AppResult<Option<Vec<u8>>> {
        let mut connection = self.connection().await?;
        connection.get(self.key_for(key)).await.map_err(|error| {
            AppError::Internal(format!("failed to read cache entry '{key}': {error}"))
        })
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl_seconds: u32) -> AppResult<()> {
        if ttl_seconds == 0 {
            return Ok(());
        }

        let mut connection = self.connection().await?;
        connection
            .set_ex(self.key_for(key), value, u64::from(ttl_seconds))
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to write cache entry '{key}': {error}"))
            })
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let mut connection = self.connection().await?;
        let _: i64 = connection.del(self.key_for(key)).await.map_err(|error| {
            AppError::Internal(format!("failed to delete cache entry '{key}': {error}"))
        })?;

        Ok(())
    }
}
