//! Wire types of the identity service's internal RPC endpoints.
//!
//! Shared by the HTTP authority clients and the API handlers serving them.

use serde::{Deserialize, Serialize};
use warden_domain::PermissionSet;

/// Path of the effective-permission lookup.
pub const USER_PERMISSIONS_PATH: &str = "/api/internal/permissions/user";

/// Path of the security stamp check.
pub const VALIDATE_SECURITY_STAMP_PATH: &str = "/api/internal/identity/validate-security-stamp";

/// Path of the token key check.
pub const VALIDATE_TOKEN_KEY_PATH: &str = "/api/internal/identity/validate-token-key";

/// Request for a user's effective permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPermissionsRequest {
    /// Subject user.
    pub user_id: i64,
}

/// Flattened permission set returned by the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPermissionsResponse {
    /// Granted permission names.
    pub permissions: PermissionSet,
}

/// Request to compare a claimed security stamp with the stored one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateSecurityStampRequest {
    /// Cache entry the identity service refreshes on read.
    pub cache_key: String,
    /// Subject user.
    pub user_id: i64,
    /// Stamp carried by the token.
    pub security_stamp: String,
}

/// Request to check that a token validity record still exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateTokenKeyRequest {
    /// Cache entry the identity service refreshes on read.
    pub cache_key: String,
    /// Subject user.
    pub user_id: i64,
    /// Key carried by the token.
    pub token_key: String,
}

/// Boolean answer of a validity check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidityResponse {
    /// Whether the checked value is current.
    pub is_valid: bool,
}
