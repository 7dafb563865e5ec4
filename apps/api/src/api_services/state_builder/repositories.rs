use std::sync::Arc;

use sqlx::PgPool;
use tracing::warn;
use warden_application::{
    AuthorizationAdminRepository, AuthorizationRepository, UserTokenRepository,
};
use warden_core::{AppError, AppResult};
use warden_infrastructure::{
    InMemoryIdentityStore, PostgresAuthorizationRepository, PostgresUserTokenRepository,
};

use crate::api_config::{ApiConfig, IdentityStoreConfig};

pub(super) struct RepositorySet {
    pub(super) authorization_repository: Arc<dyn AuthorizationRepository>,
    pub(super) authorization_admin_repository: Arc<dyn AuthorizationAdminRepository>,
    pub(super) user_token_repository: Arc<dyn UserTokenRepository>,
}

pub(super) async fn build_repository_set(
    config: &ApiConfig,
    pool: Option<&PgPool>,
) -> AppResult<RepositorySet> {
    let identity_store = config.identity_store.as_ref().ok_or_else(|| {
        AppError::Validation("IDENTITY_STORE is required for AUTHORITY_MODE=local".to_owned())
    })?;

    match identity_store {
        IdentityStoreConfig::Postgres { .. } => {
            let pool = pool.ok_or_else(|| {
                AppError::Internal("postgres identity store requires a connection pool".to_owned())
            })?;
            let authorization_repository =
                Arc::new(PostgresAuthorizationRepository::new(pool.clone()));

            Ok(RepositorySet {
                authorization_repository: authorization_repository.clone(),
                authorization_admin_repository: authorization_repository,
                user_token_repository: Arc::new(PostgresUserTokenRepository::new(pool.clone())),
            })
        }
        IdentityStoreConfig::Memory => {
            warn!("using the in-memory identity store, state is lost on restart");
            let store = Arc::new(InMemoryIdentityStore::seeded().await?);

            Ok(RepositorySet {
                authorization_repository: store.clone(),
                authorization_admin_repository: store.clone(),
                user_token_repository: store,
            })
        }
    }
}
