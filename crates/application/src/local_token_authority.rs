use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use warden_core::{AppError, AppResult, UserId};

use crate::{CacheAside, TokenAuthority, UserTokenRepository, cache_keys};

/// Token authority backed by the identity service's own database.
#[derive(Clone)]
pub struct LocalTokenAuthority {
    repository: Arc<dyn UserTokenRepository>,
    cache: CacheAside,
}

impl LocalTokenAuthority {
    /// Creates a local token authority.
    #[must_use]
    pub fn new(repository: Arc<dyn UserTokenRepository>, cache: CacheAside) -> Self {
        Self { repository, cache }
    }
}

#[async_trait]
impl TokenAuthority for LocalTokenAuthority {
    async fn validate_security_stamp(
        &self,
        cache_key: &str,
        user_id: UserId,
        security_stamp: &str,
    ) -> AppResult<bool> {
        ensure_expected_key(cache_key, &cache_keys::security_stamp(user_id))?;

        let Some(current) = self.repository.find_security_stamp(user_id).await? else {
            return Ok(false);
        };

        self.cache.store_text(cache_key, current.as_str()).await;
        Ok(current.matches(security_stamp))
    }

    async fn validate_token_key(
        &self,
        cache_key: &str,
        user_id: UserId,
        token_key: &str,
    ) -> AppResult<bool> {
        ensure_expected_key(cache_key, &cache_keys::token_validity(user_id, token_key))?;

        let is_active = self
            .repository
            .token_is_active(user_id, token_key, Utc::now())
            .await?;
        if is_active {
            self.cache.store_text(cache_key, token_key).await;
        }

        Ok(is_active)
    }
}

fn ensure_expected_key(cache_key: &str, expected: &str) -> AppResult<()> {
    if cache_key != expected {
        return Err(AppError::Validation(format!(
            "cache key '{cache_key}' does not match the validated principal"
        )));
    }

    Ok(())
}
