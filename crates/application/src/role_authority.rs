use std::sync::Arc;

use warden_core::{AppError, AppResult, RoleId};
use warden_domain::{PermissionCatalog, PermissionSet, RolePermissionSnapshot, resolve_role_permissions};

use crate::{AuthorizationRepository, CacheAside, cache_keys};

/// Authoritative resolver for role permission sets.
#[derive(Clone)]
pub struct RoleAuthority {
    repository: Arc<dyn AuthorizationRepository>,
    catalog: Arc<PermissionCatalog>,
    cache: CacheAside,
    admin_role_name: String,
}

impl RoleAuthority {
    /// Creates a role resolver.
    #[must_use]
    pub fn new(
        repository: Arc<dyn AuthorizationRepository>,
        catalog: Arc<PermissionCatalog>,
        cache: CacheAside,
        admin_role_name: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            catalog,
            cache,
            admin_role_name: admin_role_name.into(),
        }
    }

    /// Resolves a role's permission set from stored rows and refreshes its cache entry.
    pub async fn resolve_role_permissions(&self, role_id: RoleId) -> AppResult<PermissionSet> {
        let role = self
            .repository
            .find_role(role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))?;
        let rows = self.repository.list_role_grants(role_id).await?;

        let granted = resolve_role_permissions(
            &self.catalog,
            &rows,
            role.is_admin(self.admin_role_name.as_str()),
        );

        self.cache
            .store(
                &cache_keys::role_permissions(role_id),
                &RolePermissionSnapshot {
                    role_id,
                    granted: granted.clone(),
                },
            )
            .await;

        Ok(granted)
    }

    /// Drops the cached set of a role after its grants change.
    pub async fn evict_role_permissions(&self, role_id: RoleId) {
        self.cache
            .evict(&cache_keys::role_permissions(role_id))
            .await;
    }
}
