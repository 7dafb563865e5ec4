//! Endpoints other services call to reach this service's authorities.

use axum::Json;
use axum::extract::State;
use warden_application::TokenAuthority;
use warden_core::UserId;
use warden_infrastructure::internal_rpc::{
    UserPermissionsRequest, UserPermissionsResponse, ValidateSecurityStampRequest,
    ValidateTokenKeyRequest, ValidityResponse,
};

use crate::error::ApiResult;
use crate::state::AppState;

pub async fn user_permissions_handler(
    State(state): State<AppState>,
    Json(payload): Json<UserPermissionsRequest>,
) -> ApiResult<Json<UserPermissionsResponse>> {
    let permissions = state
        .identity()?
        .user_authority
        .resolve_user_permissions(UserId::new(payload.user_id))
        .await?;

    Ok(Json(UserPermissionsResponse { permissions }))
}

pub async fn validate_security_stamp_handler(
    State(state): State<AppState>,
    Json(payload): Json<ValidateSecurityStampRequest>,
) -> ApiResult<Json<ValidityResponse>> {
    let is_valid = state
        .identity()?
        .token_authority
        .validate_security_stamp(
            payload.cache_key.as_str(),
            UserId::new(payload.user_id),
            payload.security_stamp.as_str(),
        )
        .await?;

    Ok(Json(ValidityResponse { is_valid }))
}

pub async fn validate_token_key_handler(
    State(state): State<AppState>,
    Json(payload): Json<ValidateTokenKeyRequest>,
) -> ApiResult<Json<ValidityResponse>> {
    let is_valid = state
        .identity()?
        .token_authority
        .validate_token_key(
            payload.cache_key.as_str(),
            UserId::new(payload.user_id),
            payload.token_key.as_str(),
        )
        .await?;

    Ok(Json(ValidityResponse { is_valid }))
}
