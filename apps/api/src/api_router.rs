use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, put};
use tower_http::trace::TraceLayer;
use warden_core::AppError;

use crate::state::AppState;
use crate::{handlers, middleware};

mod cors;
mod internal;

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let cors_layer = cors::build_cors_layer(frontend_url)?;

    let mut protected_routes =
        Router::new().route("/auth/me", get(handlers::auth::me_handler));
    let mut public_routes = Router::new().route("/health", get(handlers::health::health_handler));

    if app_state.identity.is_some() {
        protected_routes = protected_routes
            .route("/auth/sign-out", post(handlers::auth::sign_out_handler))
            .route(
                "/api/permissions",
                get(handlers::permissions::list_permissions_handler),
            )
            .route(
                "/api/users/{user_id}/permissions",
                get(handlers::permissions::user_permission_grants_handler)
                    .put(handlers::permissions::update_user_permissions_handler),
            )
            .route(
                "/api/users/{user_id}/permissions/reset",
                post(handlers::permissions::reset_user_permissions_handler),
            )
            .route(
                "/api/users/{user_id}/roles",
                put(handlers::permissions::update_user_roles_handler),
            )
            .route(
                "/api/users/{user_id}/security-stamp/rotate",
                post(handlers::permissions::rotate_security_stamp_handler),
            )
            .route(
                "/api/roles/{role_id}/permissions",
                put(handlers::permissions::update_role_permissions_handler),
            );

        public_routes = public_routes
            .route("/auth/refresh", post(handlers::auth::refresh_handler))
            .merge(internal::build_internal_routes(app_state.clone()));
    }

    let protected_routes = protected_routes.route_layer(from_fn_with_state(
        app_state.clone(),
        middleware::require_auth,
    ));

    Ok(Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(app_state))
}
