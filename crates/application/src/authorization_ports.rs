use async_trait::async_trait;
use warden_core::{AppResult, RoleId, UserId};
use warden_domain::{PermissionGrant, PermissionSet, Role};

/// Read access to the relational authority for roles and grants.
#[async_trait]
pub trait AuthorizationRepository: Send + Sync {
    /// Finds a role by id.
    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>>;

    /// Lists every grant and prohibit row stored for a role.
    async fn list_role_grants(&self, role_id: RoleId) -> AppResult<Vec<PermissionGrant>>;

    /// Lists a user's role memberships, or `None` when the user does not exist.
    async fn list_user_role_ids(&self, user_id: UserId) -> AppResult<Option<Vec<RoleId>>>;

    /// Lists every grant and prohibit row stored for a user.
    async fn list_user_grants(&self, user_id: UserId) -> AppResult<Vec<PermissionGrant>>;
}

/// Write access used by permission administration.
#[async_trait]
pub trait AuthorizationAdminRepository: Send + Sync {
    /// Replaces all grant rows of a role in one transaction.
    async fn replace_role_grants(&self, role_id: RoleId, grants: &[PermissionGrant])
    -> AppResult<()>;

    /// Replaces all grant rows of a user in one transaction.
    async fn replace_user_grants(&self, user_id: UserId, grants: &[PermissionGrant])
    -> AppResult<()>;

    /// Replaces a user's role memberships in one transaction.
    async fn replace_user_roles(&self, user_id: UserId, role_ids: &[RoleId]) -> AppResult<()>;
}

/// System of record answering "which permissions does this user hold".
///
/// Satisfied locally by [`crate::UserAuthority`] and remotely by an RPC client
/// to the identity service. Errors mean the authority could not answer and
/// must never be read as allow or deny.
#[async_trait]
pub trait PermissionAuthority: Send + Sync {
    /// Returns the user's effective permission set.
    async fn granted_permissions(&self, user_id: UserId) -> AppResult<PermissionSet>;
}
