use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use tracing::info;
use warden_application::ValidatedToken;
use warden_domain::TokenType;

use crate::dto::{CurrentUserResponse, RefreshTokenRequest, TokenResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn me_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<ValidatedToken>,
) -> ApiResult<Json<CurrentUserResponse>> {
    let permissions = state
        .authorization_service
        .granted_permissions(principal.user_id)
        .await?;

    Ok(Json(CurrentUserResponse::new(principal.user_id, permissions)))
}

/// Revokes the caller's access token and the refresh token it was minted with.
pub async fn sign_out_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<ValidatedToken>,
) -> ApiResult<StatusCode> {
    state
        .identity()?
        .token_issuer
        .revoke_user_tokens(principal.user_id, &principal.claims)
        .await?;

    info!(user_id = %principal.user_id, "user signed out");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn refresh_handler(
    State(state): State<AppState>,
    Json(payload): Json<RefreshTokenRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let identity = state.identity()?;
    let refresh = state
        .token_validator
        .validate_token(payload.refresh_token.as_str(), TokenType::Refresh)
        .await?;

    let user = identity.token_issuer.load_user(refresh.user_id).await?;
    let access = identity
        .token_issuer
        .issue_access_token(&user, refresh.claims.token_validity_key.as_deref())
        .await?;

    Ok(Json(access.into()))
}
