use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::post;
use warden_infrastructure::internal_rpc::{
    USER_PERMISSIONS_PATH, VALIDATE_SECURITY_STAMP_PATH, VALIDATE_TOKEN_KEY_PATH,
};

use crate::state::AppState;
use crate::{handlers, middleware};

pub(super) fn build_internal_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            USER_PERMISSIONS_PATH,
            post(handlers::internal::user_permissions_handler),
        )
        .route(
            VALIDATE_SECURITY_STAMP_PATH,
            post(handlers::internal::validate_security_stamp_handler),
        )
        .route(
            VALIDATE_TOKEN_KEY_PATH,
            post(handlers::internal::validate_token_key_handler),
        )
        .route_layer(from_fn_with_state(
            app_state,
            middleware::require_internal_auth,
        ))
}
