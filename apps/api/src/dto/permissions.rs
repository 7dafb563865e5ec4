use serde::{Deserialize, Serialize};
use ts_rs::TS;
use warden_domain::{Permission, PermissionGrant};

/// Catalog entry.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permission-response.ts"
)]
pub struct PermissionResponse {
    pub name: String,
    pub display_name: String,
    pub group: String,
}

impl From<&Permission> for PermissionResponse {
    fn from(value: &Permission) -> Self {
        Self {
            name: value.name().to_owned(),
            display_name: value.display_name().to_owned(),
            group: value.group().to_owned(),
        }
    }
}

/// One explicit grant or prohibit row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permission-grant.ts"
)]
pub struct PermissionGrantDto {
    pub permission_name: String,
    pub is_granted: bool,
}

impl From<PermissionGrant> for PermissionGrantDto {
    fn from(value: PermissionGrant) -> Self {
        Self {
            permission_name: value.permission_name,
            is_granted: value.is_granted,
        }
    }
}

impl From<PermissionGrantDto> for PermissionGrant {
    fn from(value: PermissionGrantDto) -> Self {
        Self {
            permission_name: value.permission_name,
            is_granted: value.is_granted,
        }
    }
}

/// Replacement set of grant rows for a role or a user.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-permission-grants-request.ts"
)]
pub struct UpdatePermissionGrantsRequest {
    pub grants: Vec<PermissionGrantDto>,
}

/// Replacement set of role memberships for a user.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-user-roles-request.ts"
)]
pub struct UpdateUserRolesRequest {
    pub role_ids: Vec<i64>,
}
