//! Authentication handlers

use axum::extract::{Extension, Json, Path, Query};
use axum::response::Redirect;
use tracing::{error, info, warn};

use super::extractors::AuthedUser;
use super::models::{OAuthCallbackParams, OAuthProvider};
use super::token::issue_token;
use super::users::UserDirectory;
use crate::common::{safe_optional_email_log, safe_token_log, ApiError, SharedState};
use crate::search::services::SearchLog;

fn parse_provider(raw: &str) -> Result<OAuthProvider, ApiError> {
    raw.parse::<OAuthProvider>().map_err(|e| {
        warn!(provider = %raw, "OAuth request for unknown provider");
        ApiError::NotFound(e)
    })
}

/// GET /auth/{provider} - Start the OAuth flow
/// Redirects the browser to the provider's authorization page
pub async fn oauth_start(
    Extension(state): Extension<SharedState>,
    Path(provider): Path<String>,
) -> Result<Redirect, ApiError> {
    let provider = parse_provider(&provider)?;

    let auth_url = state
        .identity_provider
        .authorization_url(provider)
        .map_err(|e| {
            error!(error = %e, provider = %provider, "Failed to generate OAuth URL");
            ApiError::from(e)
        })?;

    info!(provider = %provider, "Redirecting to OAuth provider");
    Ok(Redirect::to(&auth_url))
}

/// GET /auth/{provider}/callback - Complete the OAuth flow
///
/// Exchanges the authorization code, upserts the local user, issues a bearer
/// token and sends the browser to `{CLIENT_URL}/auth/success?token=...`.
pub async fn oauth_callback(
    Extension(state): Extension<SharedState>,
    Path(provider): Path<String>,
    Query(params): Query<OAuthCallbackParams>,
) -> Result<Redirect, ApiError> {
    let provider = parse_provider(&provider)?;

    if let Some(error) = params.error {
        let reason = params.error_description.unwrap_or(error);
        warn!(provider = %provider, oauth_error = %reason, "OAuth provider returned error");
        return Err(ApiError::Unauthorized(format!("{} login failed: {}", provider, reason)));
    }

    let code = params.code.filter(|c| !c.is_empty()).ok_or_else(|| {
        warn!(provider = %provider, "No authorization code in OAuth callback");
        ApiError::BadRequest("No authorization code provided".to_string())
    })?;

    let profile = state
        .identity_provider
        .complete_login(provider, &code)
        .await
        .map_err(|e| {
            error!(error = %e, provider = %provider, "Failed to complete OAuth login");
            ApiError::from(e)
        })?;

    let user = UserDirectory::new(state.db.clone()).upsert(&profile).await?;
    let token = issue_token(&state.config.jwt_secret, &user.id)?;

    info!(
        user_id = %user.id,
        email = %safe_optional_email_log(user.email.as_deref()),
        provider = %provider,
        token = %safe_token_log(&token),
        "User authentication successful via OAuth"
    );

    Ok(Redirect::to(&state.config.auth_success_url(&token)))
}

/// GET /api/me
/// Returns the current user's profile and how many searches they have made
///
/// # Response
/// ```json
/// {
///   "user": { ... },
///   "search_count": 12
/// }
/// ```
pub async fn me_handler(
    Extension(state): Extension<SharedState>,
    authed: AuthedUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = if state.dev_mode.is_enabled() {
        state.dev_mode.create_dev_user()
    } else {
        UserDirectory::new(state.db.clone())
            .find_by_id(&authed.id)
            .await?
            .ok_or_else(|| {
                warn!(user_id = %authed.id, "Token subject has no user record");
                ApiError::NotFound("user not found".to_string())
            })?
    };

    let search_count = SearchLog::new(state.db.clone())
        .count_for_user(&authed.id)
        .await?;

    Ok(Json(serde_json::json!({
        "user": user,
        "search_count": search_count,
    })))
}

/// POST /api/auth/logout
/// Tokens are stateless, so logout only confirms; the client discards its token
///
/// # Response
/// ```json
/// {
///   "message": "Logout successful"
/// }
/// ```
pub async fn logout_handler(authed: AuthedUser) -> Json<serde_json::Value> {
    info!(user_id = %authed.id, "User logout successful");
    Json(serde_json::json!({
        "message": "Logout successful"
    }))
}
