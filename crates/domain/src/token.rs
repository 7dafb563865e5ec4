use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use warden_core::{AppError, TokenRejection, UserId};

/// Bearer token kinds issued by the identity service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Short-lived token presented on every request.
    Access,
    /// Long-lived token exchanged for new access tokens.
    Refresh,
}

impl TokenType {
    /// Returns the claim value for this token type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

impl Display for TokenType {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for TokenType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "access" => Ok(Self::Access),
            "refresh" => Ok(Self::Refresh),
            _ => Err(AppError::Validation(format!(
                "unknown token type '{value}'"
            ))),
        }
    }
}

/// Generates a fresh random token validity key.
#[must_use]
pub fn generate_token_key() -> String {
    Uuid::new_v4().to_string()
}

/// Signed claim set carried by access and refresh tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Principal id rendered as a decimal string.
    #[serde(default)]
    pub sub: String,
    /// Unique token id.
    #[serde(default)]
    pub jti: String,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Not-before, seconds since the epoch.
    pub nbf: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
    /// Issuer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Audience.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    /// Token type discriminator, see [`TokenType`].
    #[serde(default)]
    pub token_type: String,
    /// Security stamp of the user at issue time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_stamp: Option<String>,
    /// Validity key persisted for this token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_validity_key: Option<String>,
    /// Validity key of the refresh token this access token was minted with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token_validity_key: Option<String>,
}

impl TokenClaims {
    /// Parses the subject claim into a user id.
    ///
    /// The subject must be plain decimal digits; padding and signs are rejected.
    pub fn user_id(&self) -> Result<UserId, TokenRejection> {
        if self.sub.is_empty() || !self.sub.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(TokenRejection::MalformedSubject);
        }

        self.sub
            .parse::<i64>()
            .map(UserId::new)
            .map_err(|_| TokenRejection::MalformedSubject)
    }

    /// Returns whether the token type claim names the expected type.
    #[must_use]
    pub fn has_type(&self, expected: TokenType) -> bool {
        self.token_type == expected.as_str()
    }
}

/// Server-side record whose presence keeps one issued token valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenValidityRecord {
    /// Token owner.
    pub user_id: UserId,
    /// Key embedded in the token claims.
    pub token_key: String,
    /// Instant after which the record no longer validates.
    pub expires_at: DateTime<Utc>,
}

impl TokenValidityRecord {
    /// Returns whether the record still validates at `now`.
    #[must_use]
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}
