//! Search routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the search router
///
/// # Routes
/// - `POST /api/search` - Record a search and fetch matching images
/// - `GET /api/top-searches` - Trending terms across all users
/// - `GET /api/history` - The caller's recent searches
pub fn search_routes() -> Router {
    Router::new()
        .route("/api/search", post(handlers::search_handler))
        .route("/api/top-searches", get(handlers::top_searches_handler))
        .route("/api/history", get(handlers::history_handler))
}
