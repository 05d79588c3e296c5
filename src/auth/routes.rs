//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `GET /auth/:provider` - Start OAuth login (google, github, facebook)
/// - `GET /auth/:provider/callback` - Finish OAuth login and redirect with a token
/// - `POST /api/auth/logout` - Logout (client-side token removal)
/// - `GET /api/me` - Get current user information
pub fn auth_routes() -> Router {
    Router::new()
        .route("/auth/:provider", get(handlers::oauth_start))
        .route("/auth/:provider/callback", get(handlers::oauth_callback))
        .route("/api/auth/logout", post(handlers::logout_handler))
        .route("/api/me", get(handlers::me_handler))
}
