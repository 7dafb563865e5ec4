//! Application services and ports.

#![forbid(unsafe_code)]

mod authorization_ports;
mod authorization_service;
mod cache_aside;
pub mod cache_keys;
mod cache_ports;
mod jwt_codec;
mod local_token_authority;
mod permission_admin_service;
mod role_authority;
mod token_issuer;
mod token_ports;
mod token_validator;
mod user_authority;

#[cfg(test)]
mod test_support;

pub use authorization_ports::{
    AuthorizationAdminRepository, AuthorizationRepository, PermissionAuthority,
};
pub use authorization_service::AuthorizationService;
pub use cache_aside::CacheAside;
pub use cache_ports::{CacheSettings, CacheStore, DEFAULT_CACHE_TTL_SECONDS};
pub use jwt_codec::JwtCodec;
pub use local_token_authority::LocalTokenAuthority;
pub use permission_admin_service::PermissionAdminService;
pub use role_authority::RoleAuthority;
pub use token_issuer::{
    DEFAULT_ACCESS_TOKEN_TTL_SECONDS, DEFAULT_REFRESH_TOKEN_TTL_SECONDS, IssuedToken, TokenIssuer,
    TokenPair, TokenSettings,
};
pub use token_ports::{TokenAuthority, UserTokenRepository};
pub use token_validator::{TokenValidator, ValidatedToken};
pub use user_authority::UserAuthority;
