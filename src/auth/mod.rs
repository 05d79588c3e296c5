//! # Auth Module
//!
//! This module handles all authentication-related functionality including:
//! - OAuth login via Google, GitHub and Facebook
//! - Bearer token (JWT) issuing and verification
//! - The local user directory
//! - AuthedUser extractor for protected routes

pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod token;
pub mod users;


pub use extractors::AuthedUser;
pub use models::User;
pub use routes::auth_routes;
