use warden_core::AppError;

/// Maps a driver error to the application taxonomy.
///
/// Connectivity failures become `Unavailable`, unique violations become
/// `Conflict`, and everything else is an internal error.
pub(crate) fn map_query_error(context: &str, error: sqlx::Error) -> AppError {
    match error {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => AppError::Unavailable(format!("{context}: {error}")),
        sqlx::Error::Database(database_error) if database_error.is_unique_violation() => {
            AppError::Conflict(format!("{context}: {database_error}"))
        }
        other => AppError::Internal(format!("{context}: {other}")),
    }
}
