// Error tracking with Sentry
use serde_json::Value;
use tracing::{error, info};

use crate::common::config::AppConfig;

/// Initialize the Sentry client when `SENTRY_DSN` is configured.
///
/// The returned guard flushes pending events on drop, so it must live for
/// the whole process.
pub fn init_sentry(config: &AppConfig) -> Option<sentry::ClientInitGuard> {
    let Some(dsn) = config.sentry_dsn.as_deref() else {
        info!("Sentry DSN not configured");
        return None;
    };

    let guard = sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: Some(config.environment.clone().into()),
            traces_sample_rate: 0.0,
            ..Default::default()
        },
    ));

    info!(environment = %config.environment, "Sentry initialized successfully");
    Some(guard)
}

/// Log an error with context and forward it to Sentry (a no-op when Sentry
/// is not initialized)
pub fn report_error(err: &(dyn std::error::Error + 'static), context: Option<Value>) {
    error!(error = %err, context = ?context, "Error reported to monitoring");

    sentry::with_scope(
        |scope| {
            if let Some(context) = context {
                scope.set_extra("error_context", context);
            }
        },
        || {
            sentry::capture_error(err);
        },
    );
}
