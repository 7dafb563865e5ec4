use std::sync::Arc;

use tracing::{debug, warn};
use warden_core::{AppError, AppResult, UserId};
use warden_domain::{
    CachedRoleMembership, PermissionSet, RolePermissionSnapshot, UserPermissionGrants,
    merge_user_permissions,
};

use crate::{CacheAside, PermissionAuthority, cache_keys};

/// Per-request permission gate.
///
/// Assembles the effective set from cached pieces when all of them are
/// present and falls back to the wired [`PermissionAuthority`] otherwise, so
/// cache behavior is identical whether the authority is local or remote.
#[derive(Clone)]
pub struct AuthorizationService {
    authority: Arc<dyn PermissionAuthority>,
    cache: CacheAside,
}

impl AuthorizationService {
    /// Creates a gate over an authority and a shared cache.
    #[must_use]
    pub fn new(authority: Arc<dyn PermissionAuthority>, cache: CacheAside) -> Self {
        Self { authority, cache }
    }

    /// Returns the user's effective permission set.
    pub async fn granted_permissions(&self, user_id: UserId) -> AppResult<PermissionSet> {
        self.cache
            .lookup_or_resolve(self.cached_permissions(user_id), || async move {
                debug!(user_id = %user_id, "permission cache miss, asking authority");
                self.authority.granted_permissions(user_id).await
            })
            .await
    }

    /// Returns whether the user holds the permission.
    ///
    /// An `Err` means the authorization subsystem could not decide; callers
    /// must treat it as a denial distinct from `Ok(false)`.
    pub async fn authorize(&self, user_id: UserId, permission_name: &str) -> AppResult<bool> {
        match self.granted_permissions(user_id).await {
            Ok(permissions) => Ok(permissions.contains(permission_name)),
            Err(error) => {
                warn!(
                    user_id = %user_id,
                    permission = permission_name,
                    error = %error,
                    "permission check could not be resolved"
                );
                Err(error)
            }
        }
    }

    /// Ensures the user holds the permission.
    pub async fn require_permission(&self, user_id: UserId, permission_name: &str) -> AppResult<()> {
        if self.authorize(user_id, permission_name).await? {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "user '{user_id}' is missing permission '{permission_name}'"
        )))
    }

    async fn cached_permissions(&self, user_id: UserId) -> Option<PermissionSet> {
        let membership: CachedRoleMembership = self
            .cache
            .lookup(&cache_keys::user_role_membership(user_id))
            .await?;
        let grants: UserPermissionGrants = self
            .cache
            .lookup(&cache_keys::user_permission_grants(user_id))
            .await?;

        let mut role_sets = Vec::with_capacity(membership.role_ids.len());
        for role_id in membership.role_ids {
            let snapshot: RolePermissionSnapshot = self
                .cache
                .lookup(&cache_keys::role_permissions(role_id))
                .await?;
            role_sets.push(snapshot.granted);
        }

        Some(merge_user_permissions(&grants, role_sets.iter()))
    }
}

#[cfg(test)]
mod tests;
