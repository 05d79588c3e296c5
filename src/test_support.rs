//! Deterministic fakes and helpers shared by router and service tests

use async_trait::async_trait;
use axum::{body::Body, http::Request, http::StatusCode, Router};
use http_body_util::BodyExt;
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

use crate::auth::models::{OAuthProvider, ProviderProfile};
use crate::auth::token::issue_token;
use crate::common::dev_mode::DevModeConfig;
use crate::common::{AppConfig, AppState, SharedState};
use crate::services::unsplash::{PhotoLinks, PhotoUrls};
use crate::services::{
    IdentityError, IdentityProvider, ImageProvider, ImageProviderError, PhotoPage, ProviderPhoto,
};

pub fn photo(id: &str, alt: Option<&str>, description: Option<&str>) -> ProviderPhoto {
    ProviderPhoto {
        id: id.to_string(),
        description: description.map(str::to_string),
        alt_description: alt.map(str::to_string),
        urls: PhotoUrls {
            small: format!("https://images.test/{}/small", id),
            full: format!("https://images.test/{}/full", id),
        },
        links: PhotoLinks {
            html: format!("https://photos.test/{}", id),
        },
    }
}

/// Image provider returning a fixed page, or failing with HTTP 503
pub struct FakeImageProvider {
    page: Option<PhotoPage>,
    calls: AtomicUsize,
}

impl FakeImageProvider {
    pub fn with_page(total: u64, results: Vec<ProviderPhoto>) -> Self {
        Self {
            page: Some(PhotoPage { total, results }),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            page: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageProvider for FakeImageProvider {
    async fn search_photos(&self, _term: &str) -> Result<PhotoPage, ImageProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.page {
            Some(page) => Ok(page.clone()),
            None => Err(ImageProviderError::Upstream {
                status: 503,
                detail: "upstream unavailable".to_string(),
            }),
        }
    }
}

/// Identity provider that accepts any code starting with `ok-`; the rest of
/// the code becomes the provider user id
pub struct FakeIdentityProvider;

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    fn authorization_url(&self, provider: OAuthProvider) -> Result<String, IdentityError> {
        match provider {
            OAuthProvider::Facebook => Err(IdentityError::NotConfigured(provider)),
            _ => Ok(format!("https://login.test/{}/authorize", provider)),
        }
    }

    async fn complete_login(
        &self,
        provider: OAuthProvider,
        code: &str,
    ) -> Result<ProviderProfile, IdentityError> {
        let provider_user_id = code
            .strip_prefix("ok-")
            .ok_or_else(|| IdentityError::OAuthFailed("bad_verification_code".to_string()))?;

        Ok(ProviderProfile {
            provider,
            provider_user_id: provider_user_id.to_string(),
            name: Some(format!("User {}", provider_user_id)),
            email: Some(format!("{}@example.com", provider_user_id)),
            avatar: None,
        })
    }
}

pub fn test_state(db: SqlitePool, image_provider: Arc<dyn ImageProvider>) -> SharedState {
    Arc::new(AppState {
        db,
        config: Arc::new(AppConfig::for_tests()),
        dev_mode: DevModeConfig::default(),
        image_provider,
        identity_provider: Arc::new(FakeIdentityProvider),
    })
}

pub fn bearer_for(user_id: &str) -> String {
    let token = issue_token(&AppConfig::for_tests().jwt_secret, user_id).unwrap();
    format!("Bearer {}", token)
}

/// Send one request through the router and decode the JSON body (Null when empty)
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
