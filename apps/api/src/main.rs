//! Warden API composition root.

#![forbid(unsafe_code)]

mod api_cli;
mod api_config;
mod api_router;
mod api_services;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

#[cfg(test)]
mod test_support;

use tracing::info;
use warden_core::AppError;

use crate::api_config::{ApiCommand, ApiConfig, init_tracing};
use crate::api_services::{build_app_state, connect_and_migrate};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;
    let pool = match config.database_url() {
        Some(database_url) => Some(connect_and_migrate(database_url).await?),
        None => None,
    };

    match config.command {
        ApiCommand::Migrate => {
            if pool.is_none() {
                return Err(AppError::Validation(
                    "migrate requires AUTHORITY_MODE=local and IDENTITY_STORE=postgres".to_owned(),
                ));
            }
            info!("database migrations applied successfully");
            Ok(())
        }
        ApiCommand::IssueTokens(user_id) => {
            let app_state = build_app_state(&config, pool).await?;
            api_cli::issue_tokens(&app_state, user_id).await
        }
        ApiCommand::PurgeTokens => {
            let app_state = build_app_state(&config, pool).await?;
            api_cli::purge_tokens(&app_state).await
        }
        ApiCommand::Serve => serve(&config, pool).await,
    }
}

async fn serve(config: &ApiConfig, pool: Option<sqlx::PgPool>) -> Result<(), AppError> {
    let app_state = build_app_state(config, pool).await?;
    let is_identity_service = app_state.identity.is_some();
    let app = api_router::build_router(app_state, config.frontend_url.as_str())?;

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, identity_service = is_identity_service, "warden-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
