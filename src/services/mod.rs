// src/services/mod.rs
//
// Adapters for the external collaborators (identity providers, image
// provider) and error tracking. Domain modules depend on the traits, so
// tests can swap in deterministic fakes.

pub mod monitoring;
pub mod oauth;
pub mod unsplash;

// Re-export commonly used types for convenience
pub use oauth::{IdentityError, IdentityProvider, OAuthService};
pub use unsplash::{ImageProvider, ImageProviderError, PhotoPage, ProviderPhoto, UnsplashService};

use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::warn;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Outbound HTTP client bounded by the configured provider timeout
pub fn http_client(timeout: Duration) -> Client {
    finish_client(
        Client::builder()
            .timeout(timeout.max(Duration::from_secs(1)))
            .user_agent(USER_AGENT),
    )
}

/// Build `builder`, falling back to a default client (with no timeout) if
/// the configuration is rejected
fn finish_client(builder: ClientBuilder) -> Client {
    builder.build().unwrap_or_else(|e| {
        warn!(error = %e, "HTTP client configuration rejected, using defaults without a timeout");
        Client::new()
    })
}
