use serde::{Deserialize, Serialize};
use warden_core::{RoleId, UserId};

use crate::permission::{PermissionCatalog, PermissionSet};

/// Explicit grant or prohibit row attached to a role or a user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionGrant {
    /// Permission name the row refers to.
    pub permission_name: String,
    /// `true` grants the permission, `false` prohibits it.
    pub is_granted: bool,
}

impl PermissionGrant {
    /// Creates a granting row.
    #[must_use]
    pub fn granted(permission_name: impl Into<String>) -> Self {
        Self {
            permission_name: permission_name.into(),
            is_granted: true,
        }
    }

    /// Creates a prohibiting row.
    #[must_use]
    pub fn prohibited(permission_name: impl Into<String>) -> Self {
        Self {
            permission_name: permission_name.into(),
            is_granted: false,
        }
    }
}

/// Cached list of a user's role memberships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedRoleMembership {
    /// User the memberships belong to.
    pub user_id: UserId,
    /// Roles the user currently belongs to.
    pub role_ids: Vec<RoleId>,
}

/// Cached snapshot of one role's resolved permission set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePermissionSnapshot {
    /// Role the set was resolved for.
    pub role_id: RoleId,
    /// Granted permission names.
    pub granted: PermissionSet,
}

/// User-level grants and prohibits partitioned from stored rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPermissionGrants {
    /// User the rows belong to.
    pub user_id: UserId,
    /// Names explicitly granted to the user.
    pub granted: PermissionSet,
    /// Names explicitly prohibited for the user.
    pub prohibited: PermissionSet,
}

impl UserPermissionGrants {
    /// Partitions stored user rows into granted and prohibited names.
    #[must_use]
    pub fn from_rows(user_id: UserId, rows: &[PermissionGrant]) -> Self {
        let mut grants = Self {
            user_id,
            granted: PermissionSet::new(),
            prohibited: PermissionSet::new(),
        };
        for row in rows {
            let name = row.permission_name.clone();
            if row.is_granted {
                grants.granted.insert(name);
            } else {
                grants.prohibited.insert(name);
            }
        }

        grants
    }
}

/// Resolves a role's permission set from its stored rows.
///
/// The admin role starts from the whole catalog and only loses names it
/// explicitly prohibits. Every other role gets exactly its granting rows.
#[must_use]
pub fn resolve_role_permissions(
    catalog: &PermissionCatalog,
    rows: &[PermissionGrant],
    is_admin_role: bool,
) -> PermissionSet {
    if is_admin_role {
        let mut granted = catalog.all_names();
        for row in rows.iter().filter(|row| !row.is_granted) {
            granted.remove(row.permission_name.as_str());
        }
        return granted;
    }

    rows.iter()
        .filter(|row| row.is_granted)
        .map(|row| row.permission_name.clone())
        .collect()
}

/// Merges user-level grants with the sets of every role the user belongs to.
///
/// Result is `(granted ∪ role sets) \ prohibited`; a user prohibit always wins.
#[must_use]
pub fn merge_user_permissions<'a>(
    user_grants: &UserPermissionGrants,
    role_sets: impl IntoIterator<Item = &'a PermissionSet>,
) -> PermissionSet {
    let mut effective: PermissionSet = user_grants
        .granted
        .iter()
        .filter(|name| !user_grants.prohibited.contains(*name))
        .cloned()
        .collect();

    for role_set in role_sets {
        for name in role_set {
            if !user_grants.prohibited.contains(name) {
                effective.insert(name.clone());
            }
        }
    }

    effective
}
