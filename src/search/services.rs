//! Search event log and search orchestration
//!
//! The log is append-only: events are inserted once and never updated or
//! deleted. Trending terms and per-user history are computed on read.

use sqlx::SqlitePool;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::models::{HistoryEntry, ImageResult, SearchEvent, SearchResponse, TopTerm};
use super::validators::{validate_term, SearchValidationError};
use crate::common::{generate_search_event_id, now_timestamp, ApiError};
use crate::services::{ImageProvider, ImageProviderError, ProviderPhoto};

pub const DEFAULT_TOP_TERMS_LIMIT: i64 = 5;
pub const DEFAULT_HISTORY_LIMIT: i64 = 100;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Validation(#[from] SearchValidationError),

    #[error("Search log unavailable: {0}")]
    Storage(#[from] sqlx::Error),

    #[error(transparent)]
    Provider(#[from] ImageProviderError),
}

impl From<SearchError> for ApiError {
    fn from(e: SearchError) -> Self {
        match e {
            SearchError::Validation(v) => ApiError::ValidationError(v.to_string()),
            SearchError::Storage(db) => ApiError::DatabaseError(db),
            SearchError::Provider(p) => p.into(),
        }
    }
}

pub struct SearchLog {
    db: SqlitePool,
}

impl SearchLog {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Append one event for `user_id`. The term is stored exactly as given.
    pub async fn record(&self, user_id: &str, term: &str) -> Result<SearchEvent, SearchError> {
        validate_term(term)?;

        let event = SearchEvent {
            id: generate_search_event_id(),
            user_id: user_id.to_string(),
            term: term.to_string(),
            timestamp: now_timestamp(),
        };

        sqlx::query("INSERT INTO search_events (id, user_id, term, timestamp) VALUES (?, ?, ?, ?)")
            .bind(&event.id)
            .bind(&event.user_id)
            .bind(&event.term)
            .bind(&event.timestamp)
            .execute(&self.db)
            .await
            .map_err(|e| {
                error!(
                    error = %e,
                    user_id = %user_id,
                    event_id = %event.id,
                    "Database error recording search event"
                );
                SearchError::Storage(e)
            })?;

        debug!(user_id = %user_id, event_id = %event.id, "Search event recorded");
        Ok(event)
    }

    /// Most searched terms across all users, most frequent first
    ///
    /// Terms are grouped by exact value. Equal counts are ordered by term
    /// ascending so the result is deterministic.
    pub async fn top_terms(&self, limit: i64) -> Result<Vec<TopTerm>, SearchError> {
        let terms = sqlx::query_as::<_, TopTerm>(
            r#"
            SELECT term, COUNT(*) AS count
            FROM search_events
            GROUP BY term
            ORDER BY count DESC, term ASC
            LIMIT ?
            "#,
        )
        .bind(limit.max(0))
        .fetch_all(&self.db)
        .await?;

        Ok(terms)
    }

    /// The user's own searches, newest first
    ///
    /// Events sharing a timestamp fall back to insertion order, so the
    /// later write still comes first.
    pub async fn recent_history(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<HistoryEntry>, SearchError> {
        let entries = sqlx::query_as::<_, HistoryEntry>(
            r#"
            SELECT term, timestamp
            FROM search_events
            WHERE user_id = ?
            ORDER BY timestamp DESC, rowid DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(limit.max(0))
        .fetch_all(&self.db)
        .await?;

        Ok(entries)
    }

    pub async fn count_for_user(&self, user_id: &str) -> Result<i64, SearchError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM search_events WHERE user_id = ?")
                .bind(user_id)
                .fetch_one(&self.db)
                .await?;

        Ok(count)
    }
}

/// Map a provider photo onto the client-facing descriptor.
///
/// `alt` prefers the provider's alt text, then its description, then the
/// search term. Blank strings count as missing.
pub fn normalize_photo(photo: ProviderPhoto, term: &str) -> ImageResult {
    let alt = [photo.alt_description, photo.description]
        .into_iter()
        .flatten()
        .find(|text| !text.trim().is_empty())
        .unwrap_or_else(|| term.to_string());

    ImageResult {
        id: photo.id,
        thumb: photo.urls.small,
        full: photo.urls.full,
        alt,
        link: photo.links.html,
    }
}

/// Validates, records, then queries the image provider
pub struct SearchService {
    log: SearchLog,
    provider: Arc<dyn ImageProvider>,
}

impl SearchService {
    pub fn new(db: SqlitePool, provider: Arc<dyn ImageProvider>) -> Self {
        Self {
            log: SearchLog::new(db),
            provider,
        }
    }

    /// Run one search for `user_id`
    ///
    /// The event is written before the provider is called and is kept even
    /// if the provider fails: the log tracks intent, not outcome. A search
    /// that cannot be logged is never sent upstream.
    pub async fn search(&self, user_id: &str, term: &str) -> Result<SearchResponse, SearchError> {
        validate_term(term)?;

        let event = self.log.record(user_id, term).await?;

        let page = self.provider.search_photos(term).await.map_err(|e| {
            warn!(
                error = %e,
                user_id = %user_id,
                event_id = %event.id,
                "Image provider failed after search was recorded"
            );
            SearchError::Provider(e)
        })?;

        let total = page.total;
        let images: Vec<ImageResult> = page
            .results
            .into_iter()
            .map(|photo| normalize_photo(photo, term))
            .collect();

        info!(
            user_id = %user_id,
            total = total,
            returned = images.len(),
            "Search completed"
        );

        Ok(SearchResponse {
            term: term.to_string(),
            total,
            images,
        })
    }
}
