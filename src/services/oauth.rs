// src/services/oauth.rs
//! Authorization-code login against Google, GitHub and Facebook

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::auth::models::{OAuthProvider, ProviderProfile};
use crate::common::config::{AppConfig, OAuthClientConfig};
use crate::common::ApiError;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("{0} login is not configured")]
    NotConfigured(OAuthProvider),

    #[error("OAuth flow failed: {0}")]
    OAuthFailed(String),

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Unexpected provider response: {0}")]
    InvalidResponse(String),
}

impl From<IdentityError> for ApiError {
    fn from(e: IdentityError) -> Self {
        match e {
            IdentityError::NotConfigured(_) => ApiError::ServiceUnavailable(e.to_string()),
            IdentityError::OAuthFailed(_) | IdentityError::InvalidResponse(_) => {
                ApiError::Unauthorized(e.to_string())
            }
            IdentityError::RequestFailed(_) => ApiError::ServiceUnavailable(e.to_string()),
        }
    }
}

/// Third-party login capability
///
/// Given a completed login, yields a stable provider identity plus display
/// metadata. Nothing here touches local storage.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// URL the browser is redirected to in order to start the login
    fn authorization_url(&self, provider: OAuthProvider) -> Result<String, IdentityError>;

    /// Exchange the callback `code` for the provider's view of the user
    async fn complete_login(
        &self,
        provider: OAuthProvider,
        code: &str,
    ) -> Result<ProviderProfile, IdentityError>;
}

/// Static endpoint description for one provider
struct ProviderEndpoints {
    authorize_url: &'static str,
    token_url: &'static str,
    profile_url: &'static str,
    scope: &'static str,
    /// Facebook takes the token exchange as a GET with query parameters
    token_via_query: bool,
}

fn endpoints(provider: OAuthProvider) -> ProviderEndpoints {
    match provider {
        OAuthProvider::Google => ProviderEndpoints {
            authorize_url: "https://accounts.google.com/o/oauth2/v2/auth",
            token_url: "https://oauth2.googleapis.com/token",
            profile_url: "https://openidconnect.googleapis.com/v1/userinfo",
            scope: "profile email",
            token_via_query: false,
        },
        OAuthProvider::Github => ProviderEndpoints {
            authorize_url: "https://github.com/login/oauth/authorize",
            token_url: "https://github.com/login/oauth/access_token",
            profile_url: "https://api.github.com/user",
            scope: "user:email",
            token_via_query: false,
        },
        OAuthProvider::Facebook => ProviderEndpoints {
            authorize_url: "https://www.facebook.com/v19.0/dialog/oauth",
            token_url: "https://graph.facebook.com/v19.0/oauth/access_token",
            profile_url: "https://graph.facebook.com/me?fields=id,name,email,picture",
            scope: "email",
            token_via_query: true,
        },
    }
}

/// Token endpoint response. GitHub reports failures with a 200 and an
/// `error` field, so every field is optional.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OAuthService {
    client: Client,
    google: Option<OAuthClientConfig>,
    github: Option<OAuthClientConfig>,
    facebook: Option<OAuthClientConfig>,
}

impl OAuthService {
    pub fn new(config: &AppConfig) -> Self {
        let client = super::http_client(config.provider_timeout);

        for provider in OAuthProvider::ALL {
            if config.oauth_client(provider).is_some() {
                info!(provider = %provider, "OAuth provider configured");
            }
        }

        Self {
            client,
            google: config.google.clone(),
            github: config.github.clone(),
            facebook: config.facebook.clone(),
        }
    }

    fn client_config(&self, provider: OAuthProvider) -> Result<&OAuthClientConfig, IdentityError> {
        let config = match provider {
            OAuthProvider::Google => self.google.as_ref(),
            OAuthProvider::Github => self.github.as_ref(),
            OAuthProvider::Facebook => self.facebook.as_ref(),
        };
        config.ok_or(IdentityError::NotConfigured(provider))
    }

    async fn exchange_code(
        &self,
        provider: OAuthProvider,
        config: &OAuthClientConfig,
        code: &str,
    ) -> Result<String, IdentityError> {
        let endpoints = endpoints(provider);
        let params = [
            ("code", code),
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.as_str()),
            ("redirect_uri", config.callback_url.as_str()),
            ("grant_type", "authorization_code"),
        ];

        debug!(provider = %provider, "Exchanging authorization code for tokens");

        let request = if endpoints.token_via_query {
            self.client.get(endpoints.token_url).query(&params)
        } else {
            self.client.post(endpoints.token_url).form(&params)
        };

        let response = request
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| IdentityError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(provider = %provider, status = %status, error = %error_text, "Token exchange failed");
            return Err(IdentityError::OAuthFailed(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let token = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| IdentityError::InvalidResponse(e.to_string()))?;

        match token {
            TokenResponse {
                access_token: Some(access_token),
                ..
            } => Ok(access_token),
            TokenResponse {
                error,
                error_description,
                ..
            } => {
                let reason = error_description
                    .or(error)
                    .unwrap_or_else(|| "no access_token in response".to_string());
                error!(provider = %provider, reason = %reason, "Token exchange rejected");
                Err(IdentityError::OAuthFailed(reason))
            }
        }
    }

    async fn fetch_profile(
        &self,
        provider: OAuthProvider,
        access_token: &str,
    ) -> Result<ProviderProfile, IdentityError> {
        let response = self
            .client
            .get(endpoints(provider).profile_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| IdentityError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            error!(provider = %provider, status = %status, "Failed to fetch user profile");
            return Err(IdentityError::OAuthFailed(format!(
                "profile request returned HTTP {}",
                status
            )));
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| IdentityError::InvalidResponse(e.to_string()))?;

        parse_profile(provider, &body)
    }
}

#[async_trait]
impl IdentityProvider for OAuthService {
    fn authorization_url(&self, provider: OAuthProvider) -> Result<String, IdentityError> {
        let config = self.client_config(provider)?;
        let endpoints = endpoints(provider);

        let auth_url = format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}",
            endpoints.authorize_url,
            urlencoding::encode(&config.client_id),
            urlencoding::encode(&config.callback_url),
            urlencoding::encode(endpoints.scope)
        );

        debug!(provider = %provider, scope = endpoints.scope, "Generated OAuth authorization URL");
        Ok(auth_url)
    }

    async fn complete_login(
        &self,
        provider: OAuthProvider,
        code: &str,
    ) -> Result<ProviderProfile, IdentityError> {
        let config = self.client_config(provider)?;
        let access_token = self.exchange_code(provider, config, code).await?;
        let profile = self.fetch_profile(provider, &access_token).await?;

        info!(
            provider = %provider,
            provider_user_id = %profile.provider_user_id,
            "OAuth login completed"
        );
        Ok(profile)
    }
}

fn str_field(body: &Value, key: &str) -> Option<String> {
    body.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Map a provider's profile JSON onto the local identity tuple
pub fn parse_profile(provider: OAuthProvider, body: &Value) -> Result<ProviderProfile, IdentityError> {
    let provider_user_id = match body.get(match provider {
        OAuthProvider::Google => "sub",
        OAuthProvider::Github | OAuthProvider::Facebook => "id",
    }) {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        // GitHub ids are numeric
        Some(Value::Number(n)) => n.to_string(),
        _ => {
            return Err(IdentityError::InvalidResponse(
                "profile missing user id".to_string(),
            ))
        }
    };

    let (name, avatar) = match provider {
        OAuthProvider::Google => (str_field(body, "name"), str_field(body, "picture")),
        OAuthProvider::Github => (
            str_field(body, "name").or_else(|| str_field(body, "login")),
            str_field(body, "avatar_url"),
        ),
        OAuthProvider::Facebook => (
            str_field(body, "name"),
            body.pointer("/picture/data/url")
                .and_then(Value::as_str)
                .map(str::to_string),
        ),
    };

    Ok(ProviderProfile {
        provider,
        provider_user_id,
        name,
        email: str_field(body, "email"),
        avatar,
    })
}
