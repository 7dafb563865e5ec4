use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use warden_core::{AppError, AppResult, UserId};
use warden_domain::{
    CachedRoleMembership, PermissionSet, UserPermissionGrants, merge_user_permissions,
};

use crate::{AuthorizationRepository, CacheAside, PermissionAuthority, RoleAuthority, cache_keys};

/// Authoritative resolver for a user's effective permissions.
#[derive(Clone)]
pub struct UserAuthority {
    repository: Arc<dyn AuthorizationRepository>,
    roles: RoleAuthority,
    cache: CacheAside,
}

impl UserAuthority {
    /// Creates a user resolver on top of a role resolver.
    #[must_use]
    pub fn new(
        repository: Arc<dyn AuthorizationRepository>,
        roles: RoleAuthority,
        cache: CacheAside,
    ) -> Self {
        Self {
            repository,
            roles,
            cache,
        }
    }

    /// Returns the role resolver this authority delegates to.
    #[must_use]
    pub fn roles(&self) -> &RoleAuthority {
        &self.roles
    }

    /// Resolves `(user grants ∪ role sets) \ user prohibits` from stored rows.
    ///
    /// Refreshes the membership, user grant, and role set cache entries on the way.
    pub async fn resolve_user_permissions(&self, user_id: UserId) -> AppResult<PermissionSet> {
        let role_ids = self
            .repository
            .list_user_role_ids(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))?;

        self.cache
            .store(
                &cache_keys::user_role_membership(user_id),
                &CachedRoleMembership {
                    user_id,
                    role_ids: role_ids.clone(),
                },
            )
            .await;

        let rows = self.repository.list_user_grants(user_id).await?;
        let grants = UserPermissionGrants::from_rows(user_id, &rows);
        self.cache
            .store(&cache_keys::user_permission_grants(user_id), &grants)
            .await;

        let mut role_sets = Vec::with_capacity(role_ids.len());
        for role_id in role_ids {
            role_sets.push(self.roles.resolve_role_permissions(role_id).await?);
        }

        let effective = merge_user_permissions(&grants, role_sets.iter());
        debug!(
            user_id = %user_id,
            permissions = effective.len(),
            "resolved user permissions from authority"
        );

        Ok(effective)
    }

    /// Returns whether the resolved set contains the permission.
    pub async fn is_granted(&self, user_id: UserId, permission_name: &str) -> AppResult<bool> {
        Ok(self
            .resolve_user_permissions(user_id)
            .await?
            .contains(permission_name))
    }

    /// Drops the cached role membership so the next resolution re-reads roles.
    pub async fn remove_user_role_caches(&self, user_id: UserId) {
        self.cache
            .evict(&cache_keys::user_role_membership(user_id))
            .await;
    }

    /// Drops the cached user grant snapshot after user-level rows change.
    pub async fn remove_user_permission_caches(&self, user_id: UserId) {
        self.cache
            .evict(&cache_keys::user_permission_grants(user_id))
            .await;
    }
}

#[async_trait]
impl PermissionAuthority for UserAuthority {
    async fn granted_permissions(&self, user_id: UserId) -> AppResult<PermissionSet> {
        self.resolve_user_permissions(user_id).await
    }
}
