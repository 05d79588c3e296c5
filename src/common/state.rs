// Application state shared across all modules

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::common::config::AppConfig;
use crate::common::dev_mode::DevModeConfig;
use crate::services::{IdentityProvider, ImageProvider};

/// Application state containing database pool, provider adapters, and configuration
///
/// Nothing in here is mutated after startup, so handlers share it through a
/// plain `Arc` without a lock.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub dev_mode: DevModeConfig,
    pub image_provider: Arc<dyn ImageProvider>,
    pub identity_provider: Arc<dyn IdentityProvider>,
}

pub type SharedState = Arc<AppState>;
