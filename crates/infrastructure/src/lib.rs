//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod http_identity_authority;
mod in_memory_cache_store;
mod in_memory_identity_store;
pub mod internal_rpc;
mod postgres_authorization_repository;
mod postgres_errors;
mod postgres_user_token_repository;
mod redis_cache_store;

pub use http_identity_authority::{HttpPermissionAuthority, HttpTokenAuthority, InternalRpcClient};
pub use in_memory_cache_store::InMemoryCacheStore;
pub use in_memory_identity_store::InMemoryIdentityStore;
pub use postgres_authorization_repository::PostgresAuthorizationRepository;
pub use postgres_user_token_repository::PostgresUserTokenRepository;
pub use redis_cache_store::RedisCacheStore;
