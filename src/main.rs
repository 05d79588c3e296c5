// src/main.rs
use axum::{extract::Extension, middleware, routing::get, Json, Router};
use dotenv::dotenv;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::PathBuf;
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{prelude::*, EnvFilter};

// ============================================================================
// MODULE IMPORTS
// ============================================================================

mod auth;
mod common;
mod logging_middleware;
mod search;
mod services;

#[cfg(test)]
mod test_support;

// ============================================================================
// COMMON IMPORTS
// ============================================================================

use common::dev_mode::{apply_cli_override, print_dev_mode_status, DevModeConfig};
use common::{AppConfig, AppState, SharedState};
use services::{monitoring, OAuthService, UnsplashService};

// ============================================================================
// ROUTER COMPOSITION
// ============================================================================

/// GET /health
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<axum::http::HeaderValue> = origins
        .iter()
        .map(|origin| origin.trim())
        .filter(|origin| {
            if *origin == "*" {
                warn!("Ignoring wildcard CORS origin; credentialed requests need explicit origins");
                return false;
            }
            true
        })
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::HeaderName::from_static(logging_middleware::REQUEST_ID_HEADER),
        ])
        .allow_credentials(true)
}

/// Full application router with every layer applied
pub fn build_router(state: SharedState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/health", get(health_check))
        // ====================================================================
        // AUTHENTICATION ROUTES (OAuth login, me, logout)
        // ====================================================================
        .merge(auth::auth_routes())
        // ====================================================================
        // SEARCH ROUTES (search, trending, history)
        // ====================================================================
        .merge(search::search_routes())
        // ====================================================================
        // MIDDLEWARE AND LAYERS
        // ====================================================================
        .layer(middleware::from_fn(logging_middleware::log_request_response))
        .layer(Extension(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(sentry_tracing::layer())
        .init();

    // ========================================================================
    // CONFIGURATION
    // ========================================================================

    let dev_mode = apply_cli_override(DevModeConfig::from_env());
    print_dev_mode_status(&dev_mode);

    let config = AppConfig::from_env(dev_mode.is_enabled())?;
    let _sentry_guard = monitoring::init_sentry(&config);

    if config.unsplash_access_key.is_none() {
        warn!("UNSPLASH_ACCESS_KEY not set - /api/search will fail until it is configured");
    }

    // ========================================================================
    // DATABASE SETUP
    // ========================================================================

    if let Some(path_part) = config.database_url.strip_prefix("sqlite://") {
        let path_without_params = path_part.split('?').next().unwrap_or("");
        if !path_without_params.is_empty() && !path_without_params.starts_with(':') {
            let db_path = PathBuf::from(path_without_params);
            if let Some(parent) = db_path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
        }
    }

    let connect_options =
        SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .connect_with(connect_options)
        .await?;

    common::migrations::run_migrations(&pool).await?;

    // ========================================================================
    // SERVICE INITIALIZATION
    // ========================================================================

    let image_provider = Arc::new(UnsplashService::new(&config));
    info!("UnsplashService initialized");

    let identity_provider = Arc::new(OAuthService::new(&config));
    info!("OAuthService initialized");

    // ========================================================================
    // APPLICATION STATE
    // ========================================================================

    let port = config.port;
    let app_state = AppState {
        db: pool,
        config: Arc::new(config),
        dev_mode,
        image_provider,
        identity_provider,
    };

    let app = build_router(Arc::new(app_state));

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_cors_layer_skips_wildcard_origin() {
        let app = Router::new().route("/health", get(health_check)).layer(cors_layer(&[
            "*".to_string(),
            " http://localhost:3000 ".to_string(),
        ]));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header("origin", "http://localhost:3000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "http://localhost:3000"
        );
    }

    #[test]
    fn test_cors_layer_with_only_wildcard_builds() {
        let _app: Router = Router::new()
            .route("/health", get(health_check))
            .layer(cors_layer(&["*".to_string()]));
    }
}
