use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;
use warden_application::{PermissionAuthority, TokenAuthority};
use warden_core::{AppError, AppResult, UserId};
use warden_domain::PermissionSet;

use crate::internal_rpc::{
    USER_PERMISSIONS_PATH, UserPermissionsRequest, UserPermissionsResponse,
    VALIDATE_SECURITY_STAMP_PATH, VALIDATE_TOKEN_KEY_PATH, ValidateSecurityStampRequest,
    ValidateTokenKeyRequest, ValidityResponse,
};

/// Authenticated JSON client for the identity service's internal endpoints.
#[derive(Clone)]
pub struct InternalRpcClient {
    http_client: reqwest::Client,
    base_url: String,
    shared_secret: String,
}

impl InternalRpcClient {
    /// Builds a client whose every call is bounded by `timeout`.
    pub fn new(
        base_url: impl Into<String>,
        shared_secret: impl Into<String>,
        timeout: Duration,
    ) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| {
                AppError::Internal(format!("failed to build identity RPC client: {error}"))
            })?;

        let base_url: String = base_url.into();
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            shared_secret: shared_secret.into(),
        })
    }

    async fn call<Request, Response>(&self, path: &str, request: &Request) -> AppResult<Response>
    where
        Request: Serialize + Sync,
        Response: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .http_client
            .post(url.as_str())
            .bearer_auth(self.shared_secret.as_str())
            .json(request)
            .send()
            .await
            .map_err(|error| {
                warn!(path, error = %error, "identity RPC transport failure");
                AppError::Unavailable(format!("identity RPC '{path}' failed: {error}"))
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!(
                "identity RPC '{path}' reported a missing subject"
            )));
        }

        if !status.is_success() {
            warn!(path, status = %status, "identity RPC returned an error status");
            return Err(AppError::Unavailable(format!(
                "identity RPC '{path}' returned status {status}"
            )));
        }

        response.json::<Response>().await.map_err(|error| {
            AppError::Unavailable(format!(
                "identity RPC '{path}' returned an unreadable body: {error}"
            ))
        })
    }
}

/// Permission authority for services that do not own the identity database.
///
/// Forwards cache-miss lookups to the identity service. Holds no cache of its
/// own; caching happens in `AuthorizationService`.
#[derive(Clone)]
pub struct HttpPermissionAuthority {
    client: InternalRpcClient,
}

impl HttpPermissionAuthority {
    /// Creates the bridge over an RPC client.
    #[must_use]
    pub fn new(client: InternalRpcClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PermissionAuthority for HttpPermissionAuthority {
    async fn granted_permissions(&self, user_id: UserId) -> AppResult<PermissionSet> {
        let response: UserPermissionsResponse = self
            .client
            .call(
                USER_PERMISSIONS_PATH,
                &UserPermissionsRequest {
                    user_id: user_id.as_i64(),
                },
            )
            .await?;

        Ok(response.permissions)
    }
}

/// Token authority answering stamp and key checks through the identity service.
#[derive(Clone)]
pub struct HttpTokenAuthority {
    client: InternalRpcClient,
}

impl HttpTokenAuthority {
    /// Creates the remote token authority over an RPC client.
    #[must_use]
    pub fn new(client: InternalRpcClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TokenAuthority for HttpTokenAuthority {
    async fn validate_security_stamp(
        &self,
        cache_key: &str,
        user_id: UserId,
        security_stamp: &str,
    ) -> AppResult<bool> {
        let response: ValidityResponse = self
            .client
            .call(
                VALIDATE_SECURITY_STAMP_PATH,
                &ValidateSecurityStampRequest {
                    cache_key: cache_key.to_owned(),
                    user_id: user_id.as_i64(),
                    security_stamp: security_stamp.to_owned(),
                },
            )
            .await?;

        Ok(response.is_valid)
    }

    async fn validate_token_key(
        &self,
        cache_key: &str,
        user_id: UserId,
        token_key: &str,
    ) -> AppResult<bool> {
        let response: ValidityResponse = self
            .client
            .call(
                VALIDATE_TOKEN_KEY_PATH,
                &ValidateTokenKeyRequest {
                    cache_key: cache_key.to_owned(),
                    user_id: user_id.as_i64(),
                    token_key: token_key.to_owned(),
                },
            )
            .await?;

        Ok(response.is_valid)
    }
}

#[cfg(test)]
mod tests;
