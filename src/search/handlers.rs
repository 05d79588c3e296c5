//! Search handlers

use axum::extract::{rejection::JsonRejection, Extension, Json};
use serde_json::json;
use tracing::{info, warn};

use super::models::{HistoryEntry, SearchRequest, SearchResponse, TopTerm};
use super::services::{
    SearchError, SearchLog, SearchService, DEFAULT_HISTORY_LIMIT, DEFAULT_TOP_TERMS_LIMIT,
};
use super::validators::SearchRequestValidator;
use crate::auth::AuthedUser;
use crate::common::{ApiError, SharedState, Validator};
use crate::services::monitoring::report_error;

/// POST /api/search
/// Records the search, then proxies it to the image provider
///
/// # Request Body
/// ```json
/// { "term": "cats" }
/// ```
///
/// # Response
/// ```json
/// { "term": "cats", "total": 133, "images": [{ "id": "...", "thumb": "...", "full": "...", "alt": "...", "link": "..." }] }
/// ```
pub async fn search_handler(
    Extension(state): Extension<SharedState>,
    authed: AuthedUser,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        // A body that is not declared as JSON carries no term
        Err(JsonRejection::MissingJsonContentType(_)) => SearchRequest::default(),
        Err(rejection) => {
            warn!(user_id = %authed.id, reason = %rejection.body_text(), "Rejected search body");
            return Err(ApiError::BadRequest(rejection.body_text()));
        }
    };

    SearchRequestValidator.validate(&payload).into_result()?;
    let term = payload.term.unwrap_or_default();

    info!(user_id = %authed.id, "🔎 Received search request");

    let service = SearchService::new(state.db.clone(), state.image_provider.clone());
    match service.search(&authed.id, &term).await {
        Ok(response) => Ok(Json(response)),
        Err(SearchError::Provider(e)) => {
            report_error(&e, Some(json!({ "user_id": authed.id, "term": term })));
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /api/top-searches
/// Globally most searched terms, at most five
pub async fn top_searches_handler(
    Extension(state): Extension<SharedState>,
    _authed: AuthedUser,
) -> Result<Json<Vec<TopTerm>>, ApiError> {
    let log = SearchLog::new(state.db.clone());
    let top = log.top_terms(DEFAULT_TOP_TERMS_LIMIT).await?;
    Ok(Json(top))
}

/// GET /api/history
/// The caller's own searches, newest first, at most one hundred
pub async fn history_handler(
    Extension(state): Extension<SharedState>,
    authed: AuthedUser,
) -> Result<Json<Vec<HistoryEntry>>, ApiError> {
    let log = SearchLog::new(state.db.clone());
    let history = log.recent_history(&authed.id, DEFAULT_HISTORY_LIMIT).await?;
    Ok(Json(history))
}
