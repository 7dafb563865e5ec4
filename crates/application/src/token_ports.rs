use async_trait::async_trait;
use chrono::{DateTime, Utc};
use warden_core::{AppResult, UserId};
use warden_domain::{SecurityStamp, TokenValidityRecord, User};

/// Relational authority for security stamps and token validity records.
#[async_trait]
pub trait UserTokenRepository: Send + Sync {
    /// Finds a user with the fields needed for token issuance.
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>>;

    /// Reads the user's current security stamp.
    async fn find_security_stamp(&self, user_id: UserId) -> AppResult<Option<SecurityStamp>>;

    /// Replaces the user's security stamp.
    async fn update_security_stamp(&self, user_id: UserId, stamp: &SecurityStamp)
    -> AppResult<()>;

    /// Persists a validity record for a newly issued token.
    async fn create_token(&self, record: &TokenValidityRecord) -> AppResult<()>;

    /// Deletes a validity record, returning whether one existed.
    async fn delete_token(&self, user_id: UserId, token_key: &str) -> AppResult<bool>;

    /// Returns whether a non-expired validity record exists.
    async fn token_is_active(
        &self,
        user_id: UserId,
        token_key: &str,
        now: DateTime<Utc>,
    ) -> AppResult<bool>;

    /// Deletes every record expired at `now`, returning how many were removed.
    async fn delete_expired_tokens(&self, now: DateTime<Utc>) -> AppResult<u64>;
}

/// System of record for stamp and token-key checks.
///
/// Implementations refresh the cache entry named by `cache_key` when they
/// read the authoritative value.
#[async_trait]
pub trait TokenAuthority: Send + Sync {
    /// Returns whether `security_stamp` is the user's current stamp.
    async fn validate_security_stamp(
        &self,
        cache_key: &str,
        user_id: UserId,
        security_stamp: &str,
    ) -> AppResult<bool>;

    /// Returns whether a non-expired validity record exists for the token key.
    async fn validate_token_key(
        &self,
        cache_key: &str,
        user_id: UserId,
        token_key: &str,
    ) -> AppResult<bool>;
}
