use serde::{Deserialize, Serialize};
use ts_rs::TS;
use warden_application::IssuedToken;
use warden_core::UserId;
use warden_domain::PermissionSet;

/// The authenticated principal and what it may do.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/current-user-response.ts"
)]
pub struct CurrentUserResponse {
    pub user_id: i64,
    pub permissions: Vec<String>,
}

impl CurrentUserResponse {
    pub fn new(user_id: UserId, permissions: PermissionSet) -> Self {
        Self {
            user_id: user_id.as_i64(),
            permissions: permissions.into_iter().collect(),
        }
    }
}

/// Incoming payload for the refresh flow.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/refresh-token-request.ts"
)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Newly minted bearer token.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/token-response.ts"
)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in_seconds: i64,
}

impl From<IssuedToken> for TokenResponse {
    fn from(value: IssuedToken) -> Self {
        Self {
            access_token: value.token,
            token_type: "Bearer".to_owned(),
            expires_in_seconds: value.expires_in_seconds,
        }
    }
}
