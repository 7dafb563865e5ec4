use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;
use warden_core::{AppError, AppResult, UserId};
use warden_domain::{
    SecurityStamp, TokenClaims, TokenType, TokenValidityRecord, User, generate_token_key,
};

use crate::{CacheAside, JwtCodec, UserTokenRepository, cache_keys};

/// Default access token lifetime.
pub const DEFAULT_ACCESS_TOKEN_TTL_SECONDS: i64 = 24 * 60 * 60;

/// Default refresh token lifetime.
pub const DEFAULT_REFRESH_TOKEN_TTL_SECONDS: i64 = 30 * 24 * 60 * 60;

/// Signing and lifetime settings shared by issuer and validators.
#[derive(Debug, Clone)]
pub struct TokenSettings {
    /// HS256 signing secret shared by every service.
    pub secret_key: String,
    /// Expected `iss` claim.
    pub issuer: String,
    /// Expected `aud` claim.
    pub audience: String,
    /// Access token lifetime.
    pub access_token_ttl: Duration,
    /// Refresh token lifetime.
    pub refresh_token_ttl: Duration,
}

impl TokenSettings {
    /// Creates settings with the default token lifetimes.
    #[must_use]
    pub fn new(
        secret_key: impl Into<String>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Self {
        Self {
            secret_key: secret_key.into(),
            issuer: issuer.into(),
            audience: audience.into(),
            access_token_ttl: Duration::seconds(DEFAULT_ACCESS_TOKEN_TTL_SECONDS),
            refresh_token_ttl: Duration::seconds(DEFAULT_REFRESH_TOKEN_TTL_SECONDS),
        }
    }
}

/// One minted token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedToken {
    /// Signed compact token.
    pub token: String,
    /// Validity key embedded in the token.
    pub token_key: String,
    /// Seconds until the token expires.
    pub expires_in_seconds: i64,
}

/// Access and refresh tokens minted together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenPair {
    /// Access token referencing the refresh token key.
    pub access: IssuedToken,
    /// Refresh token.
    pub refresh: IssuedToken,
}

/// Mints, revokes, and invalidates bearer tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    repository: Arc<dyn UserTokenRepository>,
    codec: JwtCodec,
    settings: TokenSettings,
    cache: CacheAside,
}

impl TokenIssuer {
    /// Creates a token issuer.
    pub fn new(
        repository: Arc<dyn UserTokenRepository>,
        settings: TokenSettings,
        cache: CacheAside,
    ) -> AppResult<Self> {
        Ok(Self {
            repository,
            codec: JwtCodec::new(settings.secret_key.as_str())?,
            settings,
            cache,
        })
    }

    /// Mints an access token, optionally linked to a refresh token key.
    pub async fn issue_access_token(
        &self,
        user: &User,
        refresh_token_key: Option<&str>,
    ) -> AppResult<IssuedToken> {
        self.issue(
            user,
            TokenType::Access,
            self.settings.access_token_ttl,
            refresh_token_key,
        )
        .await
    }

    /// Mints a refresh token.
    pub async fn issue_refresh_token(&self, user: &User) -> AppResult<IssuedToken> {
        self.issue(user, TokenType::Refresh, self.settings.refresh_token_ttl, None)
            .await
    }

    /// Mints a refresh token and an access token linked to it.
    pub async fn issue_token_pair(&self, user_id: UserId) -> AppResult<TokenPair> {
        let user = self.load_user(user_id).await?;
        let refresh = self.issue_refresh_token(&user).await?;
        let access = self
            .issue_access_token(&user, Some(refresh.token_key.as_str()))
            .await?;

        Ok(TokenPair { access, refresh })
    }

    /// Loads the user a token is minted for.
    pub async fn load_user(&self, user_id: UserId) -> AppResult<User> {
        self.repository
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))
    }

    /// Revokes the token named by `claims` and the refresh token it references.
    ///
    /// Revoking a key that no longer exists succeeds.
    pub async fn revoke_user_tokens(&self, user_id: UserId, claims: &TokenClaims) -> AppResult<()> {
        let token_key = claims
            .token_validity_key
            .as_deref()
            .ok_or_else(|| AppError::Validation("invalid token key".to_owned()))?;

        self.revoke_key(user_id, token_key).await?;
        if let Some(refresh_token_key) = claims.refresh_token_validity_key.as_deref() {
            self.revoke_key(user_id, refresh_token_key).await?;
        }

        Ok(())
    }

    /// Replaces the user's security stamp, invalidating every issued token.
    pub async fn rotate_security_stamp(&self, user_id: UserId) -> AppResult<SecurityStamp> {
        let stamp = SecurityStamp::generate();
        self.repository
            .update_security_stamp(user_id, &stamp)
            .await?;
        self.cache.evict(&cache_keys::security_stamp(user_id)).await;

        info!(user_id = %user_id, "security stamp rotated");
        Ok(stamp)
    }

    /// Deletes expired validity records.
    pub async fn purge_expired_tokens(&self) -> AppResult<u64> {
        self.repository.delete_expired_tokens(Utc::now()).await
    }

    async fn issue(
        &self,
        user: &User,
        token_type: TokenType,
        ttl: Duration,
        refresh_token_key: Option<&str>,
    ) -> AppResult<IssuedToken> {
        let now = Utc::now();
        let expires_at = now + ttl;
        let token_key = generate_token_key();

        let claims = TokenClaims {
            sub: user.id().to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: expires_at.timestamp(),
            iss: Some(self.settings.issuer.clone()),
            aud: Some(self.settings.audience.clone()),
            token_type: token_type.as_str().to_owned(),
            security_stamp: Some(user.security_stamp().as_str().to_owned()),
            token_validity_key: Some(token_key.clone()),
            refresh_token_validity_key: refresh_token_key.map(str::to_owned),
        };
        let token = self.codec.encode(&claims)?;

        self.repository
            .create_token(&TokenValidityRecord {
                user_id: user.id(),
                token_key: token_key.clone(),
                expires_at,
            })
            .await?;
        self.cache
            .store_text(
                &cache_keys::token_validity(user.id(), token_key.as_str()),
                token_key.as_str(),
            )
            .await;

        Ok(IssuedToken {
            token,
            token_key,
            expires_in_seconds: ttl.num_seconds(),
        })
    }

    async fn revoke_key(&self, user_id: UserId, token_key: &str) -> AppResult<()> {
        let removed = self.repository.delete_token(user_id, token_key).await?;
        if !removed {
            warn!(user_id = %user_id, "revoked token key was already absent");
        }
        self.cache
            .evict(&cache_keys::token_validity(user_id, token_key))
            .await;

        Ok(())
    }
}
