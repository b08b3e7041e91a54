/// JWT Token Generation and Validation
///
/// Tokens are stateless: nothing about an issued token is stored server-side.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;

use crate::auth::claims::{Claims, TokenSubject};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};

/// Body returned by register and login endpoints
#[derive(Debug, Serialize)]
pub struct AuthToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Generate a new access token
///
/// # Errors
/// Returns error if token encoding fails
pub fn generate_access_token(
    subject: &TokenSubject,
    config: &JwtSettings,
) -> Result<AuthToken, AppError> {
    let claims = Claims::new(subject, config.expiry_seconds, config.issuer.clone());

    let access_token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

    Ok(AuthToken {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: config.expiry_seconds,
    })
}

/// Validate and extract claims from an access token
///
/// # Errors
/// Returns `TokenInvalid` if the token is malformed, expired, signed with a
/// different secret or issued by someone else
pub fn validate_access_token(token: &str, config: &JwtSettings) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&config.issuer]);
    validation.leeway = 0;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::warn!("JWT validation error: {}", e);
        AppError::Auth(AuthError::TokenInvalid)
    })
}
