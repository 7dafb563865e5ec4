use std::sync::Arc;
use std::time::Duration;

use warden_application::{
    AuthorizationService, CacheAside, LocalTokenAuthority, PermissionAdminService, RoleAuthority,
    TokenIssuer, TokenValidator, UserAuthority,
};
use warden_core::AppResult;
use warden_domain::PermissionCatalog;
use warden_infrastructure::{HttpPermissionAuthority, HttpTokenAuthority, InternalRpcClient};

use crate::api_config::ApiConfig;
use crate::state::IdentityServices;

use super::repositories::RepositorySet;

pub(super) struct AuthorityServices {
    pub(super) authorization_service: AuthorizationService,
    pub(super) token_validator: TokenValidator,
    pub(super) identity: Option<IdentityServices>,
}

pub(super) fn build_local_authorities(
    config: &ApiConfig,
    repositories: RepositorySet,
    cache: CacheAside,
) -> AppResult<AuthorityServices> {
    let catalog = Arc::new(PermissionCatalog::standard());
    let role_authority = RoleAuthority::new(
        repositories.authorization_repository.clone(),
        catalog.clone(),
        cache.clone(),
        config.admin_role_name.as_str(),
    );
    let user_authority = UserAuthority::new(
        repositories.authorization_repository.clone(),
        role_authority,
        cache.clone(),
    );
    let authorization_service =
        AuthorizationService::new(Arc::new(user_authority.clone()), cache.clone());

    let token_authority =
        LocalTokenAuthority::new(repositories.user_token_repository.clone(), cache.clone());
    let token_validator = TokenValidator::new(
        &config.token_settings,
        Arc::new(token_authority.clone()),
        cache.clone(),
    )?;
    let token_issuer = TokenIssuer::new(
        repositories.user_token_repository,
        config.token_settings.clone(),
        cache,
    )?;

    let permission_admin_service = PermissionAdminService::new(
        authorization_service.clone(),
        repositories.authorization_repository,
        repositories.authorization_admin_repository,
        user_authority.clone(),
        catalog,
    );

    Ok(AuthorityServices {
        authorization_service,
        token_validator,
        identity: Some(IdentityServices {
            token_issuer,
            permission_admin_service,
            user_authority,
            token_authority,
        }),
    })
}

pub(super) fn build_remote_authorities(
    config: &ApiConfig,
    identity_api_base_url: &str,
    timeout: Duration,
    cache: CacheAside,
) -> AppResult<AuthorityServices> {
    let client = InternalRpcClient::new(
        identity_api_base_url,
        config.internal_shared_secret.as_str(),
        timeout,
    )?;

    let authorization_service = AuthorizationService::new(
        Arc::new(HttpPermissionAuthority::new(client.clone())),
        cache.clone(),
    );
    let token_validator = TokenValidator::new(
        &config.token_settings,
        Arc::new(HttpTokenAuthority::new(client)),
        cache,
    )?;

    Ok(AuthorityServices {
        authorization_service,
        token_validator,
        identity: None,
    })
}
