use sqlx::PgPool;
use warden_core::AppError;

use crate::api_config::{ApiConfig, AuthorityConfig};
use crate::state::AppState;

use super::redis::build_redis_client;

mod authorities;
mod caches;
mod repositories;

pub async fn build_app_state(
    config: &ApiConfig,
    pool: Option<PgPool>,
) -> Result<AppState, AppError> {
    let redis_client = config.redis_url().map(build_redis_client).transpose()?;
    let cache = caches::build_cache(config, redis_client.clone());

    let authorities = match &config.authority {
        AuthorityConfig::Local => {
            let repositories = repositories::build_repository_set(config, pool.as_ref()).await?;
            authorities::build_local_authorities(config, repositories, cache)?
        }
        AuthorityConfig::Remote {
            identity_api_base_url,
            timeout,
        } => authorities::build_remote_authorities(
            config,
            identity_api_base_url.as_str(),
            *timeout,
            cache,
        )?,
    };

    Ok(AppState {
        authorization_service: authorities.authorization_service,
        token_validator: authorities.token_validator,
        identity: authorities.identity,
        internal_shared_secret: config.internal_shared_secret.clone(),
        postgres_pool: pool,
        redis_client,
    })
}
