//! # Search Module
//!
//! This module handles the search event log and everything built on it:
//! - Image search proxied to the image provider
//! - Append-only recording of search events
//! - Trending terms across all users
//! - Per-user search history

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod validators;

#[cfg(test)]
mod tests;

pub use routes::search_routes;
