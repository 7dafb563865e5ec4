mod auth;
mod common;
mod permissions;

pub use auth::{CurrentUserResponse, RefreshTokenRequest, TokenResponse};
pub use common::{HealthDependencyStatus, HealthResponse};
pub use permissions::{
    PermissionGrantDto, PermissionResponse, UpdatePermissionGrantsRequest, UpdateUserRolesRequest,
};
