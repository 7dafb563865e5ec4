use sqlx::PgPool;
use warden_application::{
    AuthorizationService, LocalTokenAuthority, PermissionAdminService, TokenIssuer,
    TokenValidator, UserAuthority,
};
use warden_core::AppError;

/// Services only the identity service runs, since they write the identity database.
#[derive(Clone)]
pub struct IdentityServices {
    pub token_issuer: TokenIssuer,
    pub permission_admin_service: PermissionAdminService,
    pub user_authority: UserAuthority,
    pub token_authority: LocalTokenAuthority,
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub authorization_service: AuthorizationService,
    pub token_validator: TokenValidator,
    pub identity: Option<IdentityServices>,
    pub internal_shared_secret: String,
    pub postgres_pool: Option<PgPool>,
    pub redis_client: Option<redis::Client>,
}

impl AppState {
    pub fn identity(&self) -> Result<&IdentityServices, AppError> {
        self.identity.as_ref().ok_or_else(|| {
            AppError::NotFound("identity endpoints are served by the identity service".to_owned())
        })
    }
}
