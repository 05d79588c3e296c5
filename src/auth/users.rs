//! User directory: local user records keyed by provider identity

use sqlx::SqlitePool;
use tracing::{debug, error, info};

use super::models::{ProviderProfile, User};
use crate::common::{generate_user_id, now_timestamp, safe_optional_email_log, ApiError};

pub struct UserDirectory {
    db: SqlitePool,
}

impl UserDirectory {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Create or refresh the user vouched for by `profile`
    ///
    /// Repeated logins with the same `(provider, provider_user_id)` converge on
    /// one row. Display metadata is overwritten wholesale by the latest login,
    /// including clearing fields the provider no longer returns.
    pub async fn upsert(&self, profile: &ProviderProfile) -> Result<User, ApiError> {
        let candidate_id = generate_user_id();
        let now = now_timestamp();
        let provider = profile.provider.as_str();

        sqlx::query(
            r#"
            INSERT INTO users (id, provider, provider_user_id, name, email, avatar, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(provider, provider_user_id) DO UPDATE SET
                name = excluded.name,
                email = excluded.email,
                avatar = excluded.avatar,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&candidate_id)
        .bind(provider)
        .bind(&profile.provider_user_id)
        .bind(profile.name.as_deref())
        .bind(profile.email.as_deref())
        .bind(profile.avatar.as_deref())
        .bind(&now)
        .bind(&now)
        .execute(&self.db)
        .await
        .map_err(|e| {
            error!(
                error = %e,
                provider = %provider,
                provider_user_id = %profile.provider_user_id,
                "Database error upserting user during OAuth flow"
            );
            ApiError::DatabaseError(e)
        })?;

        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE provider = ? AND provider_user_id = ?",
        )
        .bind(provider)
        .bind(&profile.provider_user_id)
        .fetch_one(&self.db)
        .await
        .map_err(ApiError::DatabaseError)?;

        if user.id == candidate_id {
            info!(
                user_id = %user.id,
                email = %safe_optional_email_log(user.email.as_deref()),
                provider = %provider,
                "Created new user account"
            );
        } else {
            debug!(user_id = %user.id, provider = %provider, "Refreshed existing user profile");
        }

        Ok(user)
    }

    pub async fn find_by_id(&self, user_id: &str) -> Result<Option<User>, ApiError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await
            .map_err(ApiError::DatabaseError)
    }
}
