use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;
use warden_core::AppError;
use warden_domain::TokenType;

use crate::error::ApiResult;
use crate::state::AppState;

/// Validates the bearer access token and attaches the principal to the request.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let token = bearer_token(request.headers())
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    let principal = state
        .token_validator
        .validate_token(token, TokenType::Access)
        .await?;

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

/// Admits only callers presenting the deployment's internal shared secret.
pub async fn require_internal_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    let presented = bearer_token(request.headers())
        .ok_or_else(|| AppError::Unauthorized("internal credentials required".to_owned()))?;

    if !secrets_match(presented, state.internal_shared_secret.as_str()) {
        return Err(AppError::Unauthorized("invalid internal credentials".to_owned()).into());
    }

    Ok(next.run(request).await)
}

fn secrets_match(presented: &str, expected: &str) -> bool {
    let presented = presented.as_bytes();
    let expected = expected.as_bytes();
    if presented.len() != expected.len() {
        return false;
    }

    presented
        .iter()
        .zip(expected)
        .fold(0_u8, |difference, (left, right)| difference | (left ^ right))
        == 0
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, HeaderValue, header};

    use super::{bearer_token, secrets_match};

    fn headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn bearer_token_is_extracted_case_insensitively() {
        assert_eq!(bearer_token(&headers("Bearer abc.def")), Some("abc.def"));
        assert_eq!(bearer_token(&headers("bearer abc.def")), Some("abc.def"));
    }

    #[test]
    fn other_schemes_and_empty_tokens_are_ignored() {
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwYXNz")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn shared_secret_must_match_exactly() {
        let secret = "internal-secret-internal-secret-00";
        assert!(secrets_match(secret, secret));
        assert!(!secrets_match("internal-secret-internal-secret-01", secret));
        assert!(!secrets_match("internal-secret", secret));
        assert!(!secrets_match("", secret));
    }
}
