use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use warden_application::{AuthorizationAdminRepository, AuthorizationRepository};
use warden_core::{AppError, AppResult, RoleId, UserId};
use warden_domain::{PermissionGrant, Role};

use crate::postgres_errors::map_query_error;

/// PostgreSQL-backed repository for roles, memberships, and grant rows.
#[derive(Clone)]
pub struct PostgresAuthorizationRepository {
    pool: PgPool,
}

impl PostgresAuthorizationRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RoleRow {
    id: i64,
    name: String,
    is_default: bool,
    is_static: bool,
}

#[derive(Debug, FromRow)]
struct GrantRow {
    name: String,
    is_granted: bool,
}

impl From<GrantRow> for PermissionGrant {
    fn from(row: GrantRow) -> Self {
        Self {
            permission_name: row.name,
            is_granted: row.is_granted,
        }
    }
}

#[async_trait]
impl AuthorizationRepository for PostgresAuthorizationRepository {
    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name, is_default, is_static
            FROM roles
            WHERE id = $1
            "#,
        )
        .bind(role_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| map_query_error("failed to load role", error))?;

        row.map(|row| Role::new(RoleId::new(row.id), row.name, row.is_default, row.is_static))
            .transpose()
    }

    async fn list_role_grants(&self, role_id: RoleId) -> AppResult<Vec<PermissionGrant>> {
        let rows = sqlx::query_as::<_, GrantRow>(
            r#"
            SELECT name, is_granted
            FROM role_permissions
            WHERE role_id = $1
            ORDER BY name
            "#,
        )
        .bind(role_id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| map_query_error("failed to load role permissions", error))?;

        Ok(rows.into_iter().map(PermissionGrant::from).collect())
    }

    async fn list_user_role_ids(&self, user_id: UserId) -> AppResult<Option<Vec<RoleId>>> {
        let rows = sqlx::query_scalar::<_, Option<i64>>(
            r#"
            SELECT user_roles.role_id
            FROM users
            LEFT JOIN user_roles ON user_roles.user_id = users.id
            WHERE users.id = $1
            ORDER BY user_roles.role_id
            "#,
        )
        .bind(user_id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| map_query_error("failed to load user roles", error))?;

        if rows.is_empty() {
            return Ok(None);
        }

        Ok(Some(rows.into_iter().flatten().map(RoleId::new).collect()))
    }

    async fn list_user_grants(&self, user_id: UserId) -> AppResult<Vec<PermissionGrant>> {
        let rows = sqlx::query_as::<_, GrantRow>(
            r#"
            SELECT name, is_granted
            FROM user_permissions
            WHERE user_id = $1
            ORDER BY name
            "#,
        )
        .bind(user_id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| map_query_error("failed to load user permissions", error))?;

        Ok(rows.into_iter().map(PermissionGrant::from).collect())
    }
}

#[async_trait]
impl AuthorizationAdminRepository for PostgresAuthorizationRepository {
    async fn replace_role_grants(
        &self,
        role_id: RoleId,
        grants: &[PermissionGrant],
    ) -> AppResult<()> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            map_query_error("failed to start role permission transaction", error)
        })?;

        let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM roles WHERE id = $1 FOR UPDATE")
            .bind(role_id.as_i64())
            .fetch_optional(&mut *transaction)
            .await
            .map_err(|error| map_query_error("failed to lock role", error))?;
        if exists.is_none() {
            return Err(AppError::NotFound(format!("role '{role_id}' does not exist")));
        }

        sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
            .bind(role_id.as_i64())
            .execute(&mut *transaction)
            .await
            .map_err(|error| map_query_error("failed to clear role permissions", error))?;

        for grant in grants {
            sqlx::query(
                r#"
                INSERT INTO role_permissions (role_id, name, is_granted)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(role_id.as_i64())
            .bind(grant.permission_name.as_str())
            .bind(grant.is_granted)
            .execute(&mut *transaction)
            .await
            .map_err(|error| map_query_error("failed to insert role permission", error))?;
        }

        transaction.commit().await.map_err(|error| {
            map_query_error("failed to commit role permission transaction", error)
        })
    }

    async fn replace_user_grants(
        &self,
        user_id: UserId,
        grants: &[PermissionGrant],
    ) -> AppResult<()> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            map_query_error("failed to start user permission transaction", error)
        })?;

        lock_user(&mut transaction, user_id).await?;

        sqlx::query("DELETE FROM user_permissions WHERE user_id = $1")
            .bind(user_id.as_i64())
            .execute(&mut *transaction)
            .await
            .map_err(|error| map_query_error("failed to clear user permissions", error))?;

        for grant in grants {
            sqlx::query(
                r#"
                INSERT INTO user_permissions (user_id, name, is_granted)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(user_id.as_i64())
            .bind(grant.permission_name.as_str())
            .bind(grant.is_granted)
            .execute(&mut *transaction)
            .await
            .map_err(|error| map_query_error("failed to insert user permission", error))?;
        }

        transaction.commit().await.map_err(|error| {
            map_query_error("failed to commit user permission transaction", error)
        })
    }

    async fn replace_user_roles(&self, user_id: UserId, role_ids: &[RoleId]) -> AppResult<()> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            map_query_error("failed to start user role transaction", error)
        })?;

        lock_user(&mut transaction, user_id).await?;

        sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
            .bind(user_id.as_i64())
            .execute(&mut *transaction)
            .await
            .map_err(|error| map_query_error("failed to clear user roles", error))?;

        for role_id in role_ids {
            sqlx::query(
                r#"
                INSERT INTO user_roles (user_id, role_id)
                VALUES ($1, $2)
                "#,
            )
            .bind(user_id.as_i64())
            .bind(role_id.as_i64())
            .execute(&mut *transaction)
            .await
            .map_err(|error| map_query_error("failed to insert user role", error))?;
        }

        transaction
            .commit()
            .await
            .map_err(|error| map_query_error("failed to commit user role transaction", error))
    }
}

async fn lock_user(
    transaction: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    user_id: UserId,
) -> AppResult<()> {
    let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE id = $1 FOR UPDATE")
        .bind(user_id.as_i64())
        .fetch_optional(&mut **transaction)
        .await
        .map_err(|error| map_query_error("failed to lock user", error))?;

    if exists.is_none() {
        return Err(AppError::NotFound(format!("user '{user_id}' does not exist")));
    }

    Ok(())
}

#[cfg(test)]
mod tests;
