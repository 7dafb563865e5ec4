//! One-shot maintenance commands run instead of the HTTP server.

use tracing::info;
use warden_core::{AppError, UserId};

use crate::state::AppState;

/// Mints an access and refresh token pair and prints it as JSON.
pub async fn issue_tokens(state: &AppState, user_id: UserId) -> Result<(), AppError> {
    let pair = state
        .identity()?
        .token_issuer
        .issue_token_pair(user_id)
        .await?;

    let output = serde_json::to_string_pretty(&pair)
        .map_err(|error| AppError::Internal(format!("failed to encode tokens: {error}")))?;
    println!("{output}");

    info!(user_id = %user_id, "token pair issued");
    Ok(())
}

/// Deletes expired token validity records.
pub async fn purge_tokens(state: &AppState) -> Result<(), AppError> {
    let removed = state
        .identity()?
        .token_issuer
        .purge_expired_tokens()
        .await?;

    info!(removed, "expired token records purged");
    Ok(())
}
