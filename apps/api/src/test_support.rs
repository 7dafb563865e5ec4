use std::sync::Arc;

use warden_application::{
    AuthorizationService, CacheAside, CacheSettings, LocalTokenAuthority, PermissionAdminService,
    RoleAuthority, TokenIssuer, TokenPair, TokenSettings, TokenValidator, UserAuthority,
    ValidatedToken,
};
use warden_core::UserId;
use warden_domain::{PermissionCatalog, TokenType};
use warden_infrastructure::{InMemoryCacheStore, InMemoryIdentityStore};

use crate::state::{AppState, IdentityServices};

pub(crate) const INTERNAL_SECRET: &str = "internal-secret-internal-secret-0001";
pub(crate) const ADMIN_USER_ID: i64 = 1;

pub(crate) struct TestContext {
    pub(crate) state: AppState,
    pub(crate) store: Arc<InMemoryIdentityStore>,
}

impl TestContext {
    /// Adds a user with no roles or grants and returns its id.
    pub(crate) async fn add_user(&self, user_name: &str) -> UserId {
        match self.store.add_user(user_name).await {
            Ok(user) => user.id(),
            Err(error) => panic!("failed to add test user: {error}"),
        }
    }

    pub(crate) async fn issue_tokens(&self, user_id: UserId) -> TokenPair {
        let identity = match self.state.identity() {
            Ok(identity) => identity,
            Err(error) => panic!("test state has no identity services: {error}"),
        };
        match identity.token_issuer.issue_token_pair(user_id).await {
            Ok(pair) => pair,
            Err(error) => panic!("failed to issue test tokens: {error}"),
        }
    }

    pub(crate) async fn principal(&self, user_id: UserId) -> (TokenPair, ValidatedToken) {
        let pair = self.issue_tokens(user_id).await;
        let principal = self
            .state
            .token_validator
            .validate_token(pair.access.token.as_str(), TokenType::Access)
            .await;
        match principal {
            Ok(principal) => (pair, principal),
            Err(error) => panic!("freshly issued token failed validation: {error}"),
        }
    }
}

pub(crate) fn token_settings() -> TokenSettings {
    TokenSettings::new(
        "test-signing-secret-test-signing-secret",
        "warden-identity",
        "warden-api",
    )
}

/// Builds identity-service state over the seeded in-memory store.
pub(crate) async fn test_context() -> TestContext {
    let store = match InMemoryIdentityStore::seeded().await {
        Ok(store) => Arc::new(store),
        Err(error) => panic!("failed to seed identity store: {error}"),
    };
    let cache = CacheAside::new(Arc::new(InMemoryCacheStore::new()), CacheSettings::default());
    let catalog = Arc::new(PermissionCatalog::standard());

    let role_authority = RoleAuthority::new(store.clone(), catalog.clone(), cache.clone(), "Admin");
    let user_authority = UserAuthority::new(store.clone(), role_authority, cache.clone());
    let authorization_service =
        AuthorizationService::new(Arc::new(user_authority.clone()), cache.clone());
    let token_authority = LocalTokenAuthority::new(store.clone(), cache.clone());

    let settings = token_settings();
    let token_validator =
        TokenValidator::new(&settings, Arc::new(token_authority.clone()), cache.clone());
    let token_issuer = TokenIssuer::new(store.clone(), settings, cache);
    let (Ok(token_validator), Ok(token_issuer)) = (token_validator, token_issuer) else {
        panic!("failed to build token services");
    };

    let permission_admin_service = PermissionAdminService::new(
        authorization_service.clone(),
        store.clone(),
        store.clone(),
        user_authority.clone(),
        catalog,
    );

    TestContext {
        state: AppState {
            authorization_service,
            token_validator,
            identity: Some(IdentityServices {
                token_issuer,
                permission_admin_service,
                user_authority,
                token_authority,
            }),
            internal_shared_secret: INTERNAL_SECRET.to_owned(),
            postgres_pool: None,
            redis_client: None,
        },
        store,
    }
}
