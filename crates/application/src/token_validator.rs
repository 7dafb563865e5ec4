use std::sync::Arc;

use warden_core::{AppResult, TokenRejection, UserId};
use warden_domain::{TokenClaims, TokenType};

use crate::{CacheAside, JwtCodec, TokenAuthority, TokenSettings, cache_keys};

/// Principal and claims of a token that passed every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedToken {
    /// Authenticated user.
    pub user_id: UserId,
    /// Verified claims.
    pub claims: TokenClaims,
}

/// Verifies bearer tokens against signature, claims, stamp, and validity key.
#[derive(Clone)]
pub struct TokenValidator {
    codec: JwtCodec,
    issuer: String,
    audience: String,
    authority: Arc<dyn TokenAuthority>,
    cache: CacheAside,
}

impl TokenValidator {
    /// Creates a validator over a local or remote token authority.
    pub fn new(
        settings: &TokenSettings,
        authority: Arc<dyn TokenAuthority>,
        cache: CacheAside,
    ) -> AppResult<Self> {
        Ok(Self {
            codec: JwtCodec::new(settings.secret_key.as_str())?,
            issuer: settings.issuer.clone(),
            audience: settings.audience.clone(),
            authority,
            cache,
        })
    }

    /// Runs the validation steps in order, stopping at the first failure.
    ///
    /// Rejections surface as `AppError::InvalidToken`; authority outages
    /// surface as their own error and also reject the token.
    pub async fn validate_token(&self, token: &str, expected: TokenType) -> AppResult<ValidatedToken> {
        let claims = self.codec.decode(token)?;

        if !claims.has_type(expected) {
            return Err(TokenRejection::WrongTokenType.into());
        }
        if claims.iss.as_deref() != Some(self.issuer.as_str()) {
            return Err(TokenRejection::InvalidIssuer.into());
        }
        if claims.aud.as_deref() != Some(self.audience.as_str()) {
            return Err(TokenRejection::InvalidAudience.into());
        }

        let user_id = claims.user_id()?;
        self.check_security_stamp(user_id, &claims).await?;
        self.check_token_key(user_id, &claims).await?;

        Ok(ValidatedToken { user_id, claims })
    }

    async fn check_security_stamp(&self, user_id: UserId, claims: &TokenClaims) -> AppResult<()> {
        let Some(stamp) = claims.security_stamp.as_deref() else {
            return Err(TokenRejection::StampMismatch.into());
        };

        let key = cache_keys::security_stamp(user_id);
        let is_valid = self
            .cache
            .check_or_resolve(
                &key,
                |cached| cached == stamp,
                || self.authority.validate_security_stamp(&key, user_id, stamp),
            )
            .await?;

        if !is_valid {
            return Err(TokenRejection::StampMismatch.into());
        }

        Ok(())
    }

    async fn check_token_key(&self, user_id: UserId, claims: &TokenClaims) -> AppResult<()> {
        let Some(token_key) = claims.token_validity_key.as_deref() else {
            return Err(TokenRejection::RevokedOrExpiredToken.into());
        };

        let key = cache_keys::token_validity(user_id, token_key);
        let is_valid = self
            .cache
            .check_or_resolve(
                &key,
                |_| true,
                || self.authority.validate_token_key(&key, user_id, token_key),
            )
            .await?;

        if !is_valid {
            return Err(TokenRejection::RevokedOrExpiredToken.into());
        }

        Ok(())
    }
}
