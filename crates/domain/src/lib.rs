//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod grant;
mod permission;
mod role;
mod token;
mod user;

pub use grant::{
    CachedRoleMembership, PermissionGrant, RolePermissionSnapshot, UserPermissionGrants,
    merge_user_permissions, resolve_role_permissions,
};
pub use permission::{AppPermission, Permission, PermissionCatalog, PermissionGroup, PermissionSet};
pub use role::{DEFAULT_ADMIN_ROLE_NAME, Role};
pub use token::{TokenClaims, TokenType, TokenValidityRecord, generate_token_key};
pub use user::{SecurityStamp, User};
