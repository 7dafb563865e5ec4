//! Deterministic cache keys shared by every service reading the same store.

use warden_core::{RoleId, UserId};

/// Key of a user's cached role memberships.
#[must_use]
pub fn user_role_membership(user_id: UserId) -> String {
    format!("permissions.user_roles.{user_id}")
}

/// Key of a user's cached grant/prohibit snapshot.
#[must_use]
pub fn user_permission_grants(user_id: UserId) -> String {
    format!("permissions.user_grants.{user_id}")
}

/// Key of a role's cached permission set.
#[must_use]
pub fn role_permissions(role_id: RoleId) -> String {
    format!("permissions.role_grants.{role_id}")
}

/// Key of a user's cached security stamp.
#[must_use]
pub fn security_stamp(user_id: UserId) -> String {
    format!("security_stamp.{user_id}")
}

/// Key of the validity marker for one issued token.
#[must_use]
pub fn token_validity(user_id: UserId, token_key: &str) -> String {
    format!("token_validity_key.{user_id}.{token_key}")
}
