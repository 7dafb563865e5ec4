use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use warden_application::{AuthorizationAdminRepository, AuthorizationRepository};
use warden_core::{AppError, RoleId, UserId};
use warden_domain::PermissionGrant;

use super::PostgresAuthorizationRepository;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres authorization tests: {error}");
    }

    Some(pool)
}

async fn insert_user(pool: &PgPool, user_name: &str) -> UserId {
    let id = sqlx::query_scalar::<_, i64>(
        r#"
            INSERT INTO users (user_name, security_stamp)
            VALUES ($1 || '-' || md5(random()::text), 'stamp')
            RETURNING id
            "#,
    )
    .bind(user_name)
    .fetch_one(pool)
    .await;

    match id {
        Ok(id) => UserId::new(id),
        Err(error) => panic!("failed to insert test user: {error}"),
    }
}

async fn insert_role(pool: &PgPool, name: &str) -> RoleId {
    let id = sqlx::query_scalar::<_, i64>(
        r#"
            INSERT INTO roles (name)
            VALUES ($1 || '-' || md5(random()::text))
            RETURNING id
            "#,
    )
    .bind(name)
    .fetch_one(pool)
    .await;

    match id {
        Ok(id) => RoleId::new(id),
        Err(error) => panic!("failed to insert test role: {error}"),
    }
}

#[tokio::test]
async fn replaced_grants_and_memberships_are_read_back() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresAuthorizationRepository::new(pool.clone());
    let user_id = insert_user(&pool, "grants").await;
    let role_id = insert_role(&pool, "Editor").await;

    let role_grants = vec![
        PermissionGrant::granted("Pages.Products"),
        PermissionGrant::prohibited("Pages.Products.Delete"),
    ];
    assert!(
        repository
            .replace_role_grants(role_id, &role_grants)
            .await
            .is_ok()
    );
    assert!(
        repository
            .replace_user_grants(user_id, &[PermissionGrant::granted("Pages.Categories")])
            .await
            .is_ok()
    );
    assert!(
        repository
            .replace_user_roles(user_id, &[role_id])
            .await
            .is_ok()
    );

    let stored_role_grants = repository.list_role_grants(role_id).await;
    assert_eq!(stored_role_grants.ok().map(|rows| rows.len()), Some(2));

    let memberships = repository.list_user_role_ids(user_id).await;
    assert_eq!(memberships.ok().flatten(), Some(vec![role_id]));

    let user_grants = repository.list_user_grants(user_id).await;
    assert_eq!(
        user_grants.ok(),
        Some(vec![PermissionGrant::granted("Pages.Categories")])
    );
}

#[tokio::test]
async fn user_without_roles_is_distinguished_from_missing_user() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresAuthorizationRepository::new(pool.clone());
    let user_id = insert_user(&pool, "lonely").await;

    let existing = repository.list_user_role_ids(user_id).await;
    assert_eq!(existing.ok().flatten(), Some(Vec::new()));

    let missing = repository.list_user_role_ids(UserId::new(-1)).await;
    assert!(matches!(missing, Ok(None)));
}

#[tokio::test]
async fn replacing_grants_of_missing_role_is_not_found() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresAuthorizationRepository::new(pool);
    let result = repository
        .replace_role_grants(RoleId::new(-1), &[PermissionGrant::granted("Pages.Products")])
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}
