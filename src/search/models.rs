//! Search data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One immutable record of a user submitting one search term
#[derive(FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SearchEvent {
    pub id: String,
    pub user_id: String,
    pub term: String,
    pub timestamp: String,
}

/// Body of `POST /api/search`
///
/// `term` is optional so a missing field reaches validation instead of
/// failing JSON deserialization.
#[derive(Deserialize, Debug, Default)]
pub struct SearchRequest {
    #[serde(default)]
    pub term: Option<String>,
}

/// Normalized image descriptor returned to clients
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ImageResult {
    pub id: String,
    pub thumb: String,
    pub full: String,
    pub alt: String,
    pub link: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SearchResponse {
    pub term: String,
    pub total: u64,
    pub images: Vec<ImageResult>,
}

/// Entry of the global trending list
#[derive(FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TopTerm {
    pub term: String,
    pub count: i64,
}

/// Entry of a user's own search history
#[derive(FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub term: String,
    pub timestamp: String,
}
