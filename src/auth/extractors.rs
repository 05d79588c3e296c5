//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::{debug, warn};

use super::token::{verify_authorization, AuthError};
use crate::common::{ApiError, SharedState};

/// Authenticated user extractor
///
/// Verifies the bearer token and yields the user id it was issued for.
/// No database lookup happens here.
#[derive(Debug)]
pub struct AuthedUser {
    pub id: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(app_state): Extension<SharedState> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        // DEV MODE: Bypass authentication completely
        if app_state.dev_mode.is_enabled() {
            debug!(user_id = %app_state.dev_mode.user_id, "DEV MODE: Authentication bypassed");
            return Ok(AuthedUser {
                id: app_state.dev_mode.user_id.clone(),
            });
        }

        // A header that is not valid UTF-8 is present but unparseable
        let header = match parts.headers.get(AUTHORIZATION) {
            Some(value) => Some(value.to_str().map_err(|_| {
                warn!("Authentication failed: non-ASCII Authorization header");
                ApiError::from(AuthError::Malformed)
            })?),
            None => None,
        };

        match verify_authorization(&app_state.config.jwt_secret, header) {
            Ok(user_id) => {
                debug!(user_id = %user_id, "Bearer token verified");
                Ok(AuthedUser { id: user_id })
            }
            Err(e) => {
                warn!(reason = %e, "Authentication failed");
                Err(e.into())
            }
        }
    }
}
