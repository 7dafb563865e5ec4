use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Terminal reasons a bearer token is rejected, in validation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenRejection {
    /// Token could not be parsed, its signature did not verify, or it is outside its validity window.
    #[error("token signature or lifetime is invalid")]
    InvalidSignature,
    /// Token type claim does not match the expected type.
    #[error("token type does not match the expected type")]
    WrongTokenType,
    /// Token was issued by an unexpected issuer.
    #[error("token issuer is not accepted")]
    InvalidIssuer,
    /// Token was issued for a different audience.
    #[error("token audience is not accepted")]
    InvalidAudience,
    /// Subject claim is missing or not a user id.
    #[error("token subject is malformed")]
    MalformedSubject,
    /// Embedded security stamp no longer matches the user's current stamp.
    #[error("security stamp does not match")]
    StampMismatch,
    /// Token validity key was revoked or has expired.
    #[error("token has been revoked or expired")]
    RevokedOrExpiredToken,
}

impl TokenRejection {
    /// Returns a stable machine-readable code for this rejection.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidSignature => "invalid_signature",
            Self::WrongTokenType => "wrong_token_type",
            Self::InvalidIssuer => "invalid_issuer",
            Self::InvalidAudience => "invalid_audience",
            Self::MalformedSubject => "malformed_subject",
            Self::StampMismatch => "stamp_mismatch",
            Self::RevokedOrExpiredToken => "revoked_or_expired_token",
        }
    }
}
