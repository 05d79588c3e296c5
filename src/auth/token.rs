//! Bearer token issuing and verification
//!
//! Tokens are HS256 JWTs carrying the local user id in `sub`. Verification is
//! pure computation (signature + expiry); the user directory is never
//! consulted, so tokens cannot be revoked before they expire.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use tracing::{debug, warn};

use super::models::Claims;
use crate::common::ApiError;

/// Validity window of an issued token
pub const TOKEN_TTL_DAYS: i64 = 7;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Missing auth")]
    Missing,

    #[error("Invalid auth header")]
    Malformed,

    #[error("Invalid token")]
    Invalid,

    #[error("Token signing failed: {0}")]
    Signing(String),
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Signing(msg) => ApiError::InternalServer(msg),
            other => ApiError::Unauthorized(other.to_string()),
        }
    }
}

/// Mint a token for `user_id` that expires `TOKEN_TTL_DAYS` from now
pub fn issue_token(secret: &str, user_id: &str) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp() as usize,
        exp: (now + Duration::days(TOKEN_TTL_DAYS)).timestamp() as usize,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::Signing(e.to_string()))
}

/// Decode and validate a bare token, returning its claims
pub fn decode_token(secret: &str, token: &str) -> Result<Claims, AuthError> {
    // Expiry is exact: no clock-skew allowance past `exp`
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        warn!(error = %e, "JWT token validation failed");
        AuthError::Invalid
    })
}

/// Verify the raw value of an `Authorization` header and return the user id
///
/// The header must be exactly `Bearer <token>`.
pub fn verify_authorization(secret: &str, header: Option<&str>) -> Result<String, AuthError> {
    let header = header.ok_or(AuthError::Missing)?;

    let parts: Vec<&str> = header.split(' ').collect();
    let token = match parts.as_slice() {
        [scheme, token] if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() => *token,
        _ => {
            debug!(parts = parts.len(), "Authorization header is not a two-part bearer credential");
            return Err(AuthError::Malformed);
        }
    };

    decode_token(secret, token).map(|claims| claims.sub)
}
