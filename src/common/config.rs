// src/common/config.rs
//! Environment-driven application configuration

use std::env;
use std::time::Duration;
use tracing::warn;

use crate::auth::models::OAuthProvider;

const DEV_JWT_SECRET: &str = "dev_only_jwt_secret_change_me";

/// OAuth client credentials for a single identity provider
#[derive(Debug, Clone)]
pub struct OAuthClientConfig {
    pub client_id: String,
    pub client_secret: String,
    pub callback_url: String,
}

impl OAuthClientConfig {
    /// Reads `<PREFIX>_CLIENT_ID`, `<PREFIX>_CLIENT_SECRET` and `<PREFIX>_CALLBACK_URL`.
    /// Returns `None` unless both id and secret are present and non-empty.
    fn from_env(provider: OAuthProvider, port: u16) -> Option<Self> {
        let prefix = provider.as_str().to_uppercase();
        let client_id = non_empty_var(&format!("{}_CLIENT_ID", prefix))?;
        let client_secret = non_empty_var(&format!("{}_CLIENT_SECRET", prefix))?;
        let callback_url = non_empty_var(&format!("{}_CALLBACK_URL", prefix)).unwrap_or_else(|| {
            format!(
                "http://localhost:{}/auth/{}/callback",
                port,
                provider.as_str()
            )
        });

        Some(Self {
            client_id,
            client_secret,
            callback_url,
        })
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub client_url: String,
    pub cors_origins: Vec<String>,
    pub unsplash_access_key: Option<String>,
    pub unsplash_api_url: String,
    pub provider_timeout: Duration,
    pub google: Option<OAuthClientConfig>,
    pub github: Option<OAuthClientConfig>,
    pub facebook: Option<OAuthClientConfig>,
    pub sentry_dsn: Option<String>,
    pub environment: String,
}

impl AppConfig {
    /// Build configuration from environment variables.
    ///
    /// `dev_mode` relaxes the `JWT_SECRET` requirement so a local checkout
    /// can start without any secrets configured.
    pub fn from_env(dev_mode: bool) -> anyhow::Result<Self> {
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(4081);

        let jwt_secret = match non_empty_var("JWT_SECRET") {
            Some(secret) => secret,
            None if dev_mode => {
                warn!("JWT_SECRET not set, using development fallback secret");
                DEV_JWT_SECRET.to_string()
            }
            None => anyhow::bail!("JWT_SECRET must be set outside of dev mode"),
        };

        let client_url = non_empty_var("CLIENT_URL")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();

        let cors_origins = non_empty_var("CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| vec![client_url.clone()]);

        let provider_timeout = env::var("PROVIDER_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(15);

        Ok(Self {
            database_url: non_empty_var("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://image_search.db".to_string()),
            port,
            jwt_secret,
            client_url,
            cors_origins,
            unsplash_access_key: non_empty_var("UNSPLASH_ACCESS_KEY"),
            unsplash_api_url: non_empty_var("UNSPLASH_API_URL")
                .unwrap_or_else(|| "https://api.unsplash.com".to_string()),
            provider_timeout: Duration::from_secs(provider_timeout),
            google: OAuthClientConfig::from_env(OAuthProvider::Google, port),
            github: OAuthClientConfig::from_env(OAuthProvider::Github, port),
            facebook: OAuthClientConfig::from_env(OAuthProvider::Facebook, port),
            sentry_dsn: non_empty_var("SENTRY_DSN"),
            environment: non_empty_var("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
        })
    }

    /// Credentials for `provider`, if that provider is configured
    pub fn oauth_client(&self, provider: OAuthProvider) -> Option<&OAuthClientConfig> {
        match provider {
            OAuthProvider::Google => self.google.as_ref(),
            OAuthProvider::Github => self.github.as_ref(),
            OAuthProvider::Facebook => self.facebook.as_ref(),
        }
    }

    /// URL the browser is sent to after a successful login
    pub fn auth_success_url(&self, token: &str) -> String {
        format!(
            "{}/auth/success?token={}",
            self.client_url,
            urlencoding::encode(token)
        )
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
impl AppConfig {
    /// Deterministic configuration for unit and router tests
    pub fn for_tests() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            port: 4081,
            jwt_secret: "test_secret_key".to_string(),
            client_url: "http://localhost:3000".to_string(),
            cors_origins: vec!["http://localhost:3000".to_string()],
            unsplash_access_key: Some("test-access-key".to_string()),
            unsplash_api_url: "http://127.0.0.1:9".to_string(),
            provider_timeout: Duration::from_secs(1),
            google: Some(OAuthClientConfig {
                client_id: "google-client".to_string(),
                client_secret: "google-secret".to_string(),
                callback_url: "http://localhost:4081/auth/google/callback".to_string(),
            }),
            github: Some(OAuthClientConfig {
                client_id: "github-client".to_string(),
                client_secret: "github-secret".to_string(),
                callback_url: "http://localhost:4081/auth/github/callback".to_string(),
            }),
            facebook: None,
            sentry_dsn: None,
            environment: "test".to_string(),
        }
    }
}
