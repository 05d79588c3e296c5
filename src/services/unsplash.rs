// src/services/unsplash.rs
//! Unsplash photo search integration

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error};

use crate::common::config::AppConfig;
use crate::common::ApiError;

/// Fixed page size requested from the provider
pub const PER_PAGE: u32 = 30;

#[derive(Debug, thiserror::Error)]
pub enum ImageProviderError {
    #[error("Image provider not configured: {0}")]
    NotConfigured(String),
    #[error("Image provider returned HTTP {status}: {detail}")]
    Upstream { status: u16, detail: String },
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<ImageProviderError> for ApiError {
    fn from(e: ImageProviderError) -> Self {
        ApiError::ProviderError {
            message: "Search failed".to_string(),
            detail: e.to_string(),
        }
    }
}

/// One page of provider results, in provider rank order
#[derive(Debug, Clone, Deserialize)]
pub struct PhotoPage {
    pub total: u64,
    pub results: Vec<ProviderPhoto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderPhoto {
    pub id: String,
    pub description: Option<String>,
    pub alt_description: Option<String>,
    pub urls: PhotoUrls,
    pub links: PhotoLinks,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotoUrls {
    pub small: String,
    pub full: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotoLinks {
    pub html: String,
}

/// Remote image search capability
#[async_trait]
pub trait ImageProvider: Send + Sync {
    async fn search_photos(&self, term: &str) -> Result<PhotoPage, ImageProviderError>;
}

#[derive(Debug, Clone)]
pub struct UnsplashService {
    client: Client,
    api_url: String,
    access_key: Option<String>,
}

impl UnsplashService {
    pub fn new(config: &AppConfig) -> Self {
        let client = super::http_client(config.provider_timeout);

        Self {
            client,
            api_url: config.unsplash_api_url.trim_end_matches('/').to_string(),
            access_key: config.unsplash_access_key.clone(),
        }
    }
}

#[async_trait]
impl ImageProvider for UnsplashService {
    async fn search_photos(&self, term: &str) -> Result<PhotoPage, ImageProviderError> {
        let access_key = self.access_key.as_deref().ok_or_else(|| {
            ImageProviderError::NotConfigured("UNSPLASH_ACCESS_KEY is not set".to_string())
        })?;

        debug!(term = %term, "Querying Unsplash photo search");
        let per_page = PER_PAGE.to_string();

        let response = self
            .client
            .get(format!("{}/search/photos", self.api_url))
            .query(&[("query", term), ("per_page", per_page.as_str())])
            .header(reqwest::header::AUTHORIZATION, format!("Client-ID {}", access_key))
            .header("Accept-Version", "v1")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, detail = %detail, "Unsplash search failed");
            return Err(ImageProviderError::Upstream {
                status: status.as_u16(),
                detail,
            });
        }

        let page = response
            .json::<PhotoPage>()
            .await
            .map_err(|e| ImageProviderError::InvalidResponse(e.to_string()))?;

        debug!(
            term = %term,
            total = page.total,
            returned = page.results.len(),
            "Unsplash search succeeded"
        );
        Ok(page)
    }
}
