use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;
use warden_core::{AppError, AppResult, TokenRejection};
use warden_domain::TokenClaims;

/// HS256 signer and verifier for token claims.
///
/// Verification covers signature, `exp` and `nbf` only. Issuer and audience
/// are compared by the validator so each failure keeps its own rejection.
#[derive(Clone)]
pub struct JwtCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtCodec {
    /// Creates a codec from the shared signing secret.
    pub fn new(secret_key: &str) -> AppResult<Self> {
        if secret_key.trim().is_empty() {
            return Err(AppError::Validation(
                "token signing secret must not be empty".to_owned(),
            ));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;
        validation.validate_nbf = true;
        validation.set_required_spec_claims(&["exp", "nbf"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret_key.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret_key.as_bytes()),
            validation,
        })
    }

    /// Signs claims into a compact token.
    pub fn encode(&self, claims: &TokenClaims) -> AppResult<String> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|error| AppError::Internal(format!("failed to sign token: {error}")))
    }

    /// Verifies a compact token and returns its claims.
    pub fn decode(&self, token: &str) -> Result<TokenClaims, TokenRejection> {
        jsonwebtoken::decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|error| {
                debug!(error = %error, "token failed signature or lifetime verification");
                TokenRejection::InvalidSignature
            })
    }
}
