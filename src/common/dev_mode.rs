// src/common/dev_mode.rs
//! Development mode configuration and utilities
//! Allows bypassing bearer verification for local testing

use std::env;

use crate::auth::models::User;
use crate::common::helpers::now_timestamp;

#[derive(Debug, Clone)]
pub struct DevModeConfig {
    pub enabled: bool,
    pub user_id: String,
    pub user_name: String,
}

impl Default for DevModeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            user_id: "U_DEV000".to_string(),
            user_name: "Dev User".to_string(),
        }
    }
}

impl DevModeConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let enabled = env::var("DEV_MODE")
            .unwrap_or_else(|_| "false".to_string())
            .to_lowercase()
            == "true";

        let user_id = env::var("DEV_USER_ID").unwrap_or(defaults.user_id);
        let user_name = env::var("DEV_USER_NAME").unwrap_or(defaults.user_name);

        Self {
            enabled,
            user_id,
            user_name,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Synthetic user returned by `/api/me` while dev mode is on
    pub fn create_dev_user(&self) -> User {
        let now = now_timestamp();

        User {
            id: self.user_id.clone(),
            provider: "dev".to_string(),
            provider_user_id: self.user_id.clone(),
            name: Some(self.user_name.clone()),
            email: None,
            avatar: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// Print dev mode status on startup
pub fn print_dev_mode_status(config: &DevModeConfig) {
    if config.enabled {
        println!("⚠️  🔓 DEV MODE ENABLED 🔓 ⚠️");
        println!("   Bearer verification bypassed for testing");
        println!("   Dev User: {} ({})", config.user_name, config.user_id);
        println!("   ⚠️  DO NOT USE IN PRODUCTION ⚠️");
        println!();
    } else {
        println!("🔒 Production mode - Bearer token required");
    }
}

/// CLI argument parsing for dev mode
fn parse_dev_mode_args<I>(args: I) -> Option<bool>
where
    I: IntoIterator<Item = String>,
{
    for arg in args {
        match arg.as_str() {
            "--dev" | "--dev-mode" => return Some(true),
            "--no-dev" | "--prod" | "--production" => return Some(false),
            _ => {}
        }
    }

    None
}

/// Override dev mode from CLI args
pub fn apply_cli_override(mut config: DevModeConfig) -> DevModeConfig {
    if let Some(cli_dev_mode) = parse_dev_mode_args(env::args()) {
        println!("🔧 CLI override: DEV_MODE = {}", cli_dev_mode);
        config.enabled = cli_dev_mode;
    }

    config
}
