use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use warden_application::UserTokenRepository;
use warden_core::{AppError, AppResult, UserId};
use warden_domain::{SecurityStamp, TokenValidityRecord, User};

use crate::postgres_errors::map_query_error;

/// PostgreSQL-backed store for security stamps and token validity records.
#[derive(Clone)]
pub struct PostgresUserTokenRepository {
    pool: PgPool,
}

impl PostgresUserTokenRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    user_name: String,
    security_stamp: String,
}

#[async_trait]
impl UserTokenRepository for PostgresUserTokenRepository {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, user_name, security_stamp
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| map_query_error("failed to load user", error))?;

        row.map(|row| {
            User::new(
                UserId::new(row.id),
                row.user_name,
                SecurityStamp::new(row.security_stamp)?,
            )
        })
        .transpose()
    }

    async fn find_security_stamp(&self, user_id: UserId) -> AppResult<Option<SecurityStamp>> {
        let stamp = sqlx::query_scalar::<_, String>(
            "SELECT security_stamp FROM users WHERE id = $1",
        )
        .bind(user_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| map_query_error("failed to load security stamp", error))?;

        stamp.map(SecurityStamp::new).transpose()
    }

    async fn update_security_stamp(
        &self,
        user_id: UserId,
        stamp: &SecurityStamp,
    ) -> AppResult<()> {
        let result = sqlx::query("UPDATE users SET security_stamp = $2 WHERE id = $1")
            .bind(user_id.as_i64())
            .bind(stamp.as_str())
            .execute(&self.pool)
            .await
            .map_err(|error| map_query_error("failed to update security stamp", error))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("user '{user_id}' does not exist")));
        }

        Ok(())
    }

    async fn create_token(&self, record: &TokenValidityRecord) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_tokens (user_id, token_key, expiration_time)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(record.user_id.as_i64())
        .bind(record.token_key.as_str())
        .bind(record.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|error| map_query_error("failed to persist token validity record", error))?;

        Ok(())
    }

    async fn delete_token(&self, user_id: UserId, token_key: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM user_tokens WHERE user_id = $1 AND token_key = $2")
            .bind(user_id.as_i64())
            .bind(token_key)
            .execute(&self.pool)
            .await
            .map_err(|error| map_query_error("failed to delete token validity record", error))?;

        Ok(result.rows_affected() > 0)
    }

    async fn token_is_active(
        &self,
        user_id: UserId,
        token_key: &str,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM user_tokens
                WHERE user_id = $1
                    AND token_key = $2
                    AND expiration_time > $3
            )
            "#,
        )
        .bind(user_id.as_i64())
        .bind(token_key)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| map_query_error("failed to check token validity record", error))
    }

    async fn delete_expired_tokens(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM user_tokens WHERE expiration_time <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|error| map_query_error("failed to purge expired tokens", error))?;

        Ok(result.rows_affected())
    }
}
