use super::model::{AuthenticatedUser, SessionClaims};
use crate::core::error::AppError;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use std::time::Duration;

/// Validates HS256 session tokens and turns them into an [`AuthenticatedUser`]
pub struct JwtValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtValidator")
            .field("decoding_key", &"<redacted>")
            .field("leeway", &self.validation.leeway)
            .finish()
    }
}

impl JwtValidator {
    pub fn new(secret: &str, issuer: Option<String>, leeway: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = leeway.as_secs();
        validation.set_required_spec_claims(&["exp", "sub"]);
        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let header = decode_header(token).map_err(|e| {
            tracing::debug!("Malformed session token: {}", e);
            AppError::Unauthorized("Invalid token".to_string())
        })?;

        if header.alg != Algorithm::HS256 {
            return Err(AppError::Unauthorized(format!(
                "Unsupported algorithm: {:?}. Only HS256 is allowed",
                header.alg
            )));
        }

        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!("Rejected session token: {}", e);
                AppError::Unauthorized("Invalid or expired token".to_string())
            })?;

        Ok(token_data.claims.into())
    }
}
