use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use tracing::info;
use warden_application::ValidatedToken;
use warden_core::{RoleId, UserId};
use warden_domain::{AppPermission, PermissionGrant};

use crate::dto::{
    PermissionGrantDto, PermissionResponse, UpdatePermissionGrantsRequest, UpdateUserRolesRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_permissions_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<PermissionResponse>>> {
    let catalog = state.identity()?.permission_admin_service.catalog();

    Ok(Json(
        catalog
            .permissions()
            .iter()
            .map(PermissionResponse::from)
            .collect(),
    ))
}

pub async fn user_permission_grants_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<ValidatedToken>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<Vec<PermissionGrantDto>>> {
    let grants = state
        .identity()?
        .permission_admin_service
        .user_permission_grants(principal.user_id, UserId::new(user_id))
        .await?;

    Ok(Json(grants.into_iter().map(PermissionGrantDto::from).collect()))
}

pub async fn update_user_permissions_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<ValidatedToken>,
    Path(user_id): Path<i64>,
    Json(payload): Json<UpdatePermissionGrantsRequest>,
) -> ApiResult<StatusCode> {
    state
        .identity()?
        .permission_admin_service
        .update_user_permissions(
            principal.user_id,
            UserId::new(user_id),
            into_grants(payload),
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn reset_user_permissions_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<ValidatedToken>,
    Path(user_id): Path<i64>,
) -> ApiResult<StatusCode> {
    state
        .identity()?
        .permission_admin_service
        .reset_user_permissions(principal.user_id, UserId::new(user_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_user_roles_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<ValidatedToken>,
    Path(user_id): Path<i64>,
    Json(payload): Json<UpdateUserRolesRequest>,
) -> ApiResult<StatusCode> {
    state
        .identity()?
        .permission_admin_service
        .update_user_roles(
            principal.user_id,
            UserId::new(user_id),
            payload.role_ids.into_iter().map(RoleId::new).collect(),
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_role_permissions_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<ValidatedToken>,
    Path(role_id): Path<i64>,
    Json(payload): Json<UpdatePermissionGrantsRequest>,
) -> ApiResult<StatusCode> {
    state
        .identity()?
        .permission_admin_service
        .update_role_permissions(principal.user_id, RoleId::new(role_id), into_grants(payload))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Invalidates every token the user holds.
pub async fn rotate_security_stamp_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<ValidatedToken>,
    Path(user_id): Path<i64>,
) -> ApiResult<StatusCode> {
    let identity = state.identity()?;
    state
        .authorization_service
        .require_permission(principal.user_id, AppPermission::UsersEdit.as_str())
        .await?;

    identity
        .token_issuer
        .rotate_security_stamp(UserId::new(user_id))
        .await?;

    info!(actor = %principal.user_id, user_id, "security stamp rotated by administrator");
    Ok(StatusCode::NO_CONTENT)
}

fn into_grants(payload: UpdatePermissionGrantsRequest) -> Vec<PermissionGrant> {
    payload
        .grants
        .into_iter()
        .map(PermissionGrant::from)
        .collect()
}
