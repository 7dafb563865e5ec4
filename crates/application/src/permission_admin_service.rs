use std::collections::HashSet;
use std::sync::Arc;

use tracing::info;
use warden_core::{AppError, AppResult, RoleId, UserId};
use warden_domain::{AppPermission, PermissionCatalog, PermissionGrant};

use crate::{
    AuthorizationAdminRepository, AuthorizationRepository, AuthorizationService, UserAuthority,
};

/// Administrative edits of role and user grants, owned by the identity service.
///
/// Every write commits to the authority first and evicts the affected cache
/// entries afterwards.
#[derive(Clone)]
pub struct PermissionAdminService {
    authorization_service: AuthorizationService,
    repository: Arc<dyn AuthorizationRepository>,
    admin_repository: Arc<dyn AuthorizationAdminRepository>,
    user_authority: UserAuthority,
    catalog: Arc<PermissionCatalog>,
}

impl PermissionAdminService {
    /// Creates the administration service.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        repository: Arc<dyn AuthorizationRepository>,
        admin_repository: Arc<dyn AuthorizationAdminRepository>,
        user_authority: UserAuthority,
        catalog: Arc<PermissionCatalog>,
    ) -> Self {
        Self {
            authorization_service,
            repository,
            admin_repository,
            user_authority,
            catalog,
        }
    }

    /// Returns the permission catalog.
    #[must_use]
    pub fn catalog(&self) -> &PermissionCatalog {
        &self.catalog
    }

    /// Lists the explicit grant rows of a user.
    pub async fn user_permission_grants(
        &self,
        actor: UserId,
        user_id: UserId,
    ) -> AppResult<Vec<PermissionGrant>> {
        self.authorization_service
            .require_permission(actor, AppPermission::UsersChangePermissions.as_str())
            .await?;

        self.repository.list_user_grants(user_id).await
    }

    /// Replaces a role's grant rows.
    pub async fn update_role_permissions(
        &self,
        actor: UserId,
        role_id: RoleId,
        grants: Vec<PermissionGrant>,
    ) -> AppResult<()> {
        self.authorization_service
            .require_permission(actor, AppPermission::RolesEdit.as_str())
            .await?;
        self.validate_grants(&grants)?;

        self.admin_repository
            .replace_role_grants(role_id, &grants)
            .await?;
        self.user_authority
            .roles()
            .evict_role_permissions(role_id)
            .await;

        info!(actor = %actor, role_id = %role_id, grants = grants.len(), "role permissions updated");
        Ok(())
    }

    /// Replaces a user's grant and prohibit rows.
    pub async fn update_user_permissions(
        &self,
        actor: UserId,
        user_id: UserId,
        grants: Vec<PermissionGrant>,
    ) -> AppResult<()> {
        self.authorization_service
            .require_permission(actor, AppPermission::UsersChangePermissions.as_str())
            .await?;
        self.validate_grants(&grants)?;

        self.admin_repository
            .replace_user_grants(user_id, &grants)
            .await?;
        self.user_authority
            .remove_user_permission_caches(user_id)
            .await;

        info!(actor = %actor, user_id = %user_id, grants = grants.len(), "user permissions updated");
        Ok(())
    }

    /// Removes every user-level row so the user inherits role grants only.
    pub async fn reset_user_permissions(&self, actor: UserId, user_id: UserId) -> AppResult<()> {
        self.authorization_service
            .require_permission(actor, AppPermission::UsersChangePermissions.as_str())
            .await?;

        self.admin_repository
            .replace_user_grants(user_id, &[])
            .await?;
        self.user_authority
            .remove_user_permission_caches(user_id)
            .await;

        info!(actor = %actor, user_id = %user_id, "user permissions reset");
        Ok(())
    }

    /// Replaces a user's role memberships.
    pub async fn update_user_roles(
        &self,
        actor: UserId,
        user_id: UserId,
        role_ids: Vec<RoleId>,
    ) -> AppResult<()> {
        self.authorization_service
            .require_permission(actor, AppPermission::UsersEdit.as_str())
            .await?;

        let mut unique = HashSet::new();
        let role_ids: Vec<RoleId> = role_ids
            .into_iter()
            .filter(|role_id| unique.insert(*role_id))
            .collect();
        for role_id in &role_ids {
            if self.repository.find_role(*role_id).await?.is_none() {
                return Err(AppError::NotFound(format!(
                    "role '{role_id}' does not exist"
                )));
            }
        }

        self.admin_repository
            .replace_user_roles(user_id, &role_ids)
            .await?;
        self.user_authority.remove_user_role_caches(user_id).await;

        info!(actor = %actor, user_id = %user_id, roles = role_ids.len(), "user roles updated");
        Ok(())
    }

    fn validate_grants(&self, grants: &[PermissionGrant]) -> AppResult<()> {
        self.catalog
            .validate_names(grants.iter().map(|grant| grant.permission_name.as_str()))?;

        let mut seen = HashSet::new();
        for grant in grants {
            if !seen.insert(grant.permission_name.as_str()) {
                return Err(AppError::Validation(format!(
                    "permission '{}' is listed more than once",
                    grant.permission_name
                )));
            }
        }

        Ok(())
    }
}
