use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use tracing_subscriber::EnvFilter;
use warden_application::{
    DEFAULT_ACCESS_TOKEN_TTL_SECONDS, DEFAULT_CACHE_TTL_SECONDS,
    DEFAULT_REFRESH_TOKEN_TTL_SECONDS, TokenSettings,
};
use warden_core::{AppError, UserId};
use warden_domain::DEFAULT_ADMIN_ROLE_NAME;

const MIN_SECRET_LENGTH: usize = 32;

/// What the binary was asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiCommand {
    Serve,
    Migrate,
    IssueTokens(UserId),
    PurgeTokens,
}

impl ApiCommand {
    pub fn parse<I>(mut args: I) -> Result<Self, AppError>
    where
        I: Iterator<Item = String>,
    {
        let Some(command) = args.next() else {
            return Ok(Self::Serve);
        };

        match command.as_str() {
            "serve" => Ok(Self::Serve),
            "migrate" => Ok(Self::Migrate),
            "purge-tokens" => Ok(Self::PurgeTokens),
            "issue-tokens" => {
                let user_id = args.next().ok_or_else(|| {
                    AppError::Validation("issue-tokens requires a user id".to_owned())
                })?;
                UserId::from_str(user_id.as_str()).map(Self::IssueTokens)
            }
            other => Err(AppError::Validation(format!(
                "unknown command '{other}', expected serve, migrate, issue-tokens, or purge-tokens"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityStoreConfig {
    Postgres { database_url: String },
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheBackendConfig {
    Redis { redis_url: String },
    InMemory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorityConfig {
    Local,
    Remote {
        identity_api_base_url: String,
        timeout: Duration,
    },
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub command: ApiCommand,
    pub api_host: String,
    pub api_port: u16,
    pub frontend_url: String,
    /// Present only when this service is the identity authority.
    pub identity_store: Option<IdentityStoreConfig>,
    pub cache_backend: CacheBackendConfig,
    pub cache_key_prefix: String,
    pub cache_ttl_seconds: u32,
    pub authority: AuthorityConfig,
    pub internal_shared_secret: String,
    pub token_settings: TokenSettings,
    pub admin_role_name: String,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let command = ApiCommand::parse(env::args().skip(1))?;
        Self::from_lookup(command, |name| env::var(name).ok())
    }

    pub fn from_lookup<F>(command: ApiCommand, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvReader { lookup };

        let api_host = env.or_default("API_HOST", "127.0.0.1");
        let api_port = env.parsed_or("API_PORT", 3001_u16)?;
        let frontend_url = env.or_default("FRONTEND_URL", "http://localhost:3000");

        let cache_backend = match env.or_default("CACHE_BACKEND", "in_memory").as_str() {
            "redis" => CacheBackendConfig::Redis {
                redis_url: env.required("REDIS_URL")?,
            },
            "in_memory" => CacheBackendConfig::InMemory,
            other => {
                return Err(AppError::Validation(format!(
                    "CACHE_BACKEND must be either 'redis' or 'in_memory', got '{other}'"
                )));
            }
        };
        let cache_key_prefix = env.or_default("CACHE_KEY_PREFIX", "warden");
        let cache_ttl_seconds = env.parsed_or("CACHE_TTL_SECONDS", DEFAULT_CACHE_TTL_SECONDS)?;

        let authority = match env.or_default("AUTHORITY_MODE", "local").as_str() {
            "local" => AuthorityConfig::Local,
            "remote" => AuthorityConfig::Remote {
                identity_api_base_url: env.required("IDENTITY_API_BASE_URL")?,
                timeout: Duration::from_millis(env.parsed_or("AUTHORITY_TIMEOUT_MS", 5000_u64)?),
            },
            other => {
                return Err(AppError::Validation(format!(
                    "AUTHORITY_MODE must be either 'local' or 'remote', got '{other}'"
                )));
            }
        };

        if matches!(authority, AuthorityConfig::Remote { .. })
            && cache_backend == CacheBackendConfig::InMemory
        {
            return Err(AppError::Validation(
                "AUTHORITY_MODE=remote requires CACHE_BACKEND=redis shared with the identity service"
                    .to_owned(),
            ));
        }

        let identity_store = match &authority {
            AuthorityConfig::Local => Some(
                match env.or_default("IDENTITY_STORE", "postgres").as_str() {
                    "postgres" => IdentityStoreConfig::Postgres {
                        database_url: env.required("DATABASE_URL")?,
                    },
                    "memory" => IdentityStoreConfig::Memory,
                    other => {
                        return Err(AppError::Validation(format!(
                            "IDENTITY_STORE must be either 'postgres' or 'memory', got '{other}'"
                        )));
                    }
                },
            ),
            AuthorityConfig::Remote { .. } => None,
        };

        let internal_shared_secret = env.secret("INTERNAL_SHARED_SECRET")?;

        let mut token_settings = TokenSettings::new(
            env.secret("JWT_SECRET_KEY")?,
            env.required("JWT_ISSUER")?,
            env.required("JWT_AUDIENCE")?,
        );
        token_settings.access_token_ttl = chrono::Duration::seconds(positive_seconds(
            "ACCESS_TOKEN_TTL_SECONDS",
            env.parsed_or("ACCESS_TOKEN_TTL_SECONDS", DEFAULT_ACCESS_TOKEN_TTL_SECONDS)?,
        )?);
        token_settings.refresh_token_ttl = chrono::Duration::seconds(positive_seconds(
            "REFRESH_TOKEN_TTL_SECONDS",
            env.parsed_or("REFRESH_TOKEN_TTL_SECONDS", DEFAULT_REFRESH_TOKEN_TTL_SECONDS)?,
        )?);

        let admin_role_name = env.or_default("ADMIN_ROLE_NAME", DEFAULT_ADMIN_ROLE_NAME);

        Ok(Self {
            command,
            api_host,
            api_port,
            frontend_url,
            identity_store,
            cache_backend,
            cache_key_prefix,
            cache_ttl_seconds,
            authority,
            internal_shared_secret,
            token_settings,
            admin_role_name,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }

    pub fn database_url(&self) -> Option<&str> {
        match &self.identity_store {
            Some(IdentityStoreConfig::Postgres { database_url }) => Some(database_url.as_str()),
            _ => None,
        }
    }

    pub fn redis_url(&self) -> Option<&str> {
        match &self.cache_backend {
            CacheBackendConfig::Redis { redis_url } => Some(redis_url.as_str()),
            CacheBackendConfig::InMemory => None,
        }
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

struct EnvReader<F> {
    lookup: F,
}

impl<F> EnvReader<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn or_default(&self, name: &str, default: &str) -> String {
        (self.lookup)(name)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| default.to_owned())
    }

    fn required(&self, name: &str) -> Result<String, AppError> {
        let value = (self.lookup)(name)
            .ok_or_else(|| AppError::Validation(format!("{name} is required")))?;
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("{name} must not be empty")));
        }

        Ok(value)
    }

    fn secret(&self, name: &str) -> Result<String, AppError> {
        let value = self.required(name)?;
        if value.len() < MIN_SECRET_LENGTH {
            return Err(AppError::Validation(format!(
                "{name} must be at least {MIN_SECRET_LENGTH} characters"
            )));
        }

        Ok(value)
    }

    fn parsed_or<T>(&self, name: &str, default: T) -> Result<T, AppError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match (self.lookup)(name).filter(|value| !value.trim().is_empty()) {
            Some(value) => value
                .trim()
                .parse::<T>()
                .map_err(|error| AppError::Validation(format!("invalid {name}: {error}"))),
            None => Ok(default),
        }
    }
}

fn positive_seconds(name: &str, value: i64) -> Result<i64, AppError> {
    if value <= 0 {
        return Err(AppError::Validation(format!("{name} must be positive")));
    }

    Ok(value)
}
