//! Tests for search module
//!
//! These tests verify the search event log and its HTTP surface:
//! - Recording preserves terms verbatim and rejects blank terms
//! - Trending terms ordering, bounds and tie-break
//! - History isolation and newest-first ordering
//! - Record-before-fetch behavior when the provider fails

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{body::Body, http::Request, http::StatusCode};
    use serde_json::json;

    use super::super::models::SearchRequest;
    use super::super::services::{normalize_photo, SearchError, SearchLog, SearchService};
    use super::super::validators::{validate_term, SearchRequestValidator, SearchValidationError};
    use crate::common::migrations::test_pool;
    use crate::common::{now_timestamp, Validator};
    use crate::test_support::{bearer_for, photo, send, test_state, FakeImageProvider};

    async fn event_count(pool: &sqlx::SqlitePool) -> i64 {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM search_events")
            .fetch_one(pool)
            .await
            .unwrap();
        count
    }

    fn search_request(auth: Option<&str>, body: serde_json::Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/search")
            .header("content-type", "application/json");
        if let Some(auth) = auth {
            builder = builder.header("authorization", auth);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get_request(uri: &str, auth: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header("authorization", auth)
            .body(Body::empty())
            .unwrap()
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    #[test]
    fn test_validate_term() {
        assert!(validate_term("cats").is_ok());
        assert!(validate_term("  cats  ").is_ok());
        assert_eq!(validate_term(""), Err(SearchValidationError::EmptyTerm));
        assert_eq!(validate_term(" \t\n"), Err(SearchValidationError::EmptyTerm));
    }

    #[test]
    fn test_search_request_validator_missing_term() {
        let result = SearchRequestValidator.validate(&SearchRequest { term: None });
        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|e| e.field == "term"));

        let result = SearchRequestValidator.validate(&SearchRequest {
            term: Some("dogs".to_string()),
        });
        assert!(result.is_valid);
    }

    // ------------------------------------------------------------------
    // Search event log
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_record_preserves_term_and_timestamps_after_call() {
        let pool = test_pool().await;
        let log = SearchLog::new(pool);

        let before = now_timestamp();
        let event = log.record("U_ALICE1", "  Big Cats ").await.unwrap();

        assert_eq!(event.term, "  Big Cats ");
        assert!(event.timestamp >= before);

        let history = log.recent_history("U_ALICE1", 10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].term, "  Big Cats ");
        assert_eq!(history[0].timestamp, event.timestamp);
    }

    #[tokio::test]
    async fn test_record_rejects_blank_term_without_writing() {
        let pool = test_pool().await;
        let log = SearchLog::new(pool.clone());

        for term in ["", "   ", "\t"] {
            let result = log.record("U_ALICE1", term).await;
            assert!(matches!(
                result,
                Err(SearchError::Validation(SearchValidationError::EmptyTerm))
            ));
        }
        assert_eq!(event_count(&pool).await, 0);
    }

    #[tokio::test]
    async fn test_repeated_terms_are_not_deduplicated() {
        let pool = test_pool().await;
        let log = SearchLog::new(pool.clone());

        let first = log.record("U_ALICE1", "cats").await.unwrap();
        let second = log.record("U_ALICE1", "cats").await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(event_count(&pool).await, 2);
    }

    #[tokio::test]
    async fn test_cats_dogs_scenario() {
        let pool = test_pool().await;
        let log = SearchLog::new(pool);

        log.record("u1", "cats").await.unwrap();
        log.record("u1", "dogs").await.unwrap();
        log.record("u1", "cats").await.unwrap();

        let top = log.top_terms(5).await.unwrap();
        let top: Vec<(&str, i64)> = top.iter().map(|t| (t.term.as_str(), t.count)).collect();
        assert_eq!(top, vec![("cats", 2), ("dogs", 1)]);

        let history = log.recent_history("u1", 10).await.unwrap();
        let terms: Vec<&str> = history.iter().map(|h| h.term.as_str()).collect();
        assert_eq!(terms, vec!["cats", "dogs", "cats"]);
    }

    #[tokio::test]
    async fn test_top_terms_bounds_and_tie_break() {
        let pool = test_pool().await;
        let log = SearchLog::new(pool);

        for (user, term) in [
            ("u1", "zebra"),
            ("u2", "zebra"),
            ("u1", "apple"),
            ("u3", "apple"),
            ("u1", "Apple"),
            ("u2", "mango"),
            ("u3", "kiwi"),
            ("u3", "pear"),
            ("u2", "fig"),
        ] {
            log.record(user, term).await.unwrap();
        }

        let top = log.top_terms(5).await.unwrap();
        assert_eq!(top.len(), 5);
        let terms: Vec<&str> = top.iter().map(|t| t.term.as_str()).collect();
        // Counts tie at 2 and 1; ties are ordered by term ascending,
        // and "Apple" is a different term from "apple".
        assert_eq!(terms, vec!["apple", "zebra", "Apple", "fig", "kiwi"]);

        let top_two = log.top_terms(2).await.unwrap();
        assert_eq!(top_two.len(), 2);
        assert!(top_two.iter().all(|t| t.count == 2));

        let everything = log.top_terms(100).await.unwrap();
        assert_eq!(everything.len(), 7, "one entry per distinct term");
        let total: i64 = everything.iter().map(|t| t.count).sum();
        assert_eq!(total, 9);
    }

    #[tokio::test]
    async fn test_empty_log_reads_are_empty_not_errors() {
        let pool = test_pool().await;
        let log = SearchLog::new(pool);

        assert!(log.top_terms(5).await.unwrap().is_empty());
        assert!(log.recent_history("nobody", 100).await.unwrap().is_empty());
        assert_eq!(log.count_for_user("nobody").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_history_isolated_newest_first_and_capped() {
        let pool = test_pool().await;
        let log = SearchLog::new(pool);

        for i in 0..5 {
            log.record("alice", &format!("alice-{}", i)).await.unwrap();
            log.record("bob", &format!("bob-{}", i)).await.unwrap();
        }

        let history = log.recent_history("alice", 3).await.unwrap();
        let terms: Vec<&str> = history.iter().map(|h| h.term.as_str()).collect();
        assert_eq!(terms, vec!["alice-4", "alice-3", "alice-2"]);

        let all = log.recent_history("alice", 100).await.unwrap();
        assert_eq!(all.len(), 5);
        assert!(all.iter().all(|h| h.term.starts_with("alice-")));
        assert!(all.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
    }

    // ------------------------------------------------------------------
    // Orchestration
    // ------------------------------------------------------------------

    #[test]
    fn test_normalize_photo_alt_fallbacks() {
        let with_alt = normalize_photo(photo("a", Some("a cat"), Some("desc")), "cats");
        assert_eq!(with_alt.alt, "a cat");
        assert_eq!(with_alt.thumb, "https://images.test/a/small");
        assert_eq!(with_alt.full, "https://images.test/a/full");
        assert_eq!(with_alt.link, "https://photos.test/a");

        let with_description = normalize_photo(photo("b", None, Some("desc")), "cats");
        assert_eq!(with_description.alt, "desc");

        let blank_alt = normalize_photo(photo("c", Some(""), Some("desc")), "cats");
        assert_eq!(blank_alt.alt, "desc");

        let neither = normalize_photo(photo("d", None, None), "cats");
        assert_eq!(neither.alt, "cats");
    }

    #[tokio::test]
    async fn test_search_records_then_returns_normalized_results() {
        let pool = test_pool().await;
        let provider = Arc::new(FakeImageProvider::with_page(
            42,
            vec![photo("p1", Some("tabby"), None), photo("p2", None, None)],
        ));
        let service = SearchService::new(pool.clone(), provider.clone());

        let response = service.search("U_ALICE1", "cats").await.unwrap();
        assert_eq!(response.term, "cats");
        assert_eq!(response.total, 42);
        assert_eq!(response.images.len(), 2);
        assert_eq!(response.images[0].id, "p1");
        assert_eq!(response.images[1].alt, "cats");

        assert_eq!(provider.calls(), 1);
        assert_eq!(event_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn test_search_blank_term_touches_neither_log_nor_provider() {
        let pool = test_pool().await;
        let provider = Arc::new(FakeImageProvider::with_page(0, vec![]));
        let service = SearchService::new(pool.clone(), provider.clone());

        let result = service.search("U_ALICE1", "  ").await;
        assert!(matches!(result, Err(SearchError::Validation(_))));
        assert_eq!(provider.calls(), 0);
        assert_eq!(event_count(&pool).await, 0);
    }

    #[tokio::test]
    async fn test_provider_failure_keeps_recorded_event() {
        let pool = test_pool().await;
        let provider = Arc::new(FakeImageProvider::failing());
        let service = SearchService::new(pool.clone(), provider.clone());

        let result = service.search("U_ALICE1", "cats").await;
        assert!(matches!(result, Err(SearchError::Provider(_))));
        assert_eq!(provider.calls(), 1);

        let history = SearchLog::new(pool).recent_history("U_ALICE1", 10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].term, "cats");
    }

    #[tokio::test]
    async fn test_unloggable_search_is_not_sent_upstream() {
        let pool = test_pool().await;
        sqlx::query("DROP TABLE search_events")
            .execute(&pool)
            .await
            .unwrap();
        let provider = Arc::new(FakeImageProvider::with_page(1, vec![photo("p1", None, None)]));
        let service = SearchService::new(pool, provider.clone());

        let result = service.search("U_ALICE1", "cats").await;
        assert!(matches!(result, Err(SearchError::Storage(_))));
        assert_eq!(provider.calls(), 0);
    }

    // ------------------------------------------------------------------
    // HTTP surface
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_search_endpoint_success() {
        let pool = test_pool().await;
        let provider = Arc::new(FakeImageProvider::with_page(7, vec![photo("p1", None, Some("sunset"))]));
        let app = crate::build_router(test_state(pool, provider));

        let (status, body) = send(
            &app,
            search_request(Some(bearer_for("U_ALICE1").as_str()), json!({ "term": "sunset" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["term"], "sunset");
        assert_eq!(body["total"], 7);
        assert_eq!(
            body["images"][0],
            json!({
                "id": "p1",
                "thumb": "https://images.test/p1/small",
                "full": "https://images.test/p1/full",
                "alt": "sunset",
                "link": "https://photos.test/p1"
            })
        );
    }

    #[tokio::test]
    async fn test_search_without_auth_is_401_and_records_nothing() {
        let pool = test_pool().await;
        let provider = Arc::new(FakeImageProvider::with_page(0, vec![]));
        let app = crate::build_router(test_state(pool.clone(), provider.clone()));

        let (status, body) = send(&app, search_request(None, json!({ "term": "cats" }))).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Missing auth");
        assert_eq!(event_count(&pool).await, 0);
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_search_with_malformed_or_invalid_auth() {
        let pool = test_pool().await;
        let app = crate::build_router(test_state(
            pool.clone(),
            Arc::new(FakeImageProvider::with_page(0, vec![])),
        ));

        let (status, body) =
            send(&app, search_request(Some("Bearer"), json!({ "term": "cats" }))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid auth header");

        let (status, body) = send(
            &app,
            search_request(Some("Bearer not.a.jwt"), json!({ "term": "cats" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid token");

        assert_eq!(event_count(&pool).await, 0);
    }

    #[tokio::test]
    async fn test_search_endpoint_rejects_empty_and_missing_term() {
        let pool = test_pool().await;
        let provider = Arc::new(FakeImageProvider::with_page(0, vec![]));
        let app = crate::build_router(test_state(pool.clone(), provider.clone()));
        let auth = bearer_for("U_ALICE1");

        for body in [json!({ "term": "" }), json!({ "term": "   " }), json!({})] {
            let (status, json) = send(&app, search_request(Some(auth.as_str()), body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(json["message"], "term is required");
        }

        assert_eq!(event_count(&pool).await, 0);
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_search_endpoint_bad_bodies_get_json_400() {
        let pool = test_pool().await;
        let provider = Arc::new(FakeImageProvider::with_page(0, vec![]));
        let app = crate::build_router(test_state(pool.clone(), provider.clone()));
        let auth = bearer_for("U_ALICE1");

        // No body and no content type: the term is simply missing
        let request = Request::builder()
            .method("POST")
            .uri("/api/search")
            .header("authorization", auth.as_str())
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "term is required");
        assert_eq!(body["code"], "VALIDATION_ERROR");

        // Wrong JSON type for the term
        let (status, body) =
            send(&app, search_request(Some(auth.as_str()), json!({ "term": 5 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_REQUEST");
        assert!(body["message"].is_string());

        // Truncated JSON
        let request = Request::builder()
            .method("POST")
            .uri("/api/search")
            .header("content-type", "application/json")
            .header("authorization", auth.as_str())
            .body(Body::from("{\"term\": \"ca"))
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_REQUEST");

        assert_eq!(event_count(&pool).await, 0);
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_search_endpoint_provider_failure_is_500_with_detail() {
        let pool = test_pool().await;
        let app = crate::build_router(test_state(
            pool.clone(),
            Arc::new(FakeImageProvider::failing()),
        ));

        let (status, body) = send(
            &app,
            search_request(Some(bearer_for("U_ALICE1").as_str()), json!({ "term": "cats" })),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Search failed");
        assert!(body["detail"].as_str().unwrap().contains("503"));
        assert_eq!(event_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn test_history_endpoint_scoped_to_token_subject() {
        let pool = test_pool().await;
        let log = SearchLog::new(pool.clone());
        log.record("X", "mine-1").await.unwrap();
        log.record("X", "mine-2").await.unwrap();
        log.record("Y", "theirs-newer").await.unwrap();

        let app = crate::build_router(test_state(
            pool,
            Arc::new(FakeImageProvider::with_page(0, vec![])),
        ));
        let (status, body) = send(&app, get_request("/api/history", &bearer_for("X"))).await;

        assert_eq!(status, StatusCode::OK);
        let entries = body.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["term"], "mine-2");
        assert_eq!(entries[1]["term"], "mine-1");
        assert!(entries[0]["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_top_searches_endpoint_is_global_and_capped() {
        let pool = test_pool().await;
        let log = SearchLog::new(pool.clone());
        for (i, term) in ["a", "b", "c", "d", "e", "f", "a"].iter().enumerate() {
            log.record(&format!("user-{}", i), term).await.unwrap();
        }

        let app = crate::build_router(test_state(
            pool,
            Arc::new(FakeImageProvider::with_page(0, vec![])),
        ));
        let (status, body) =
            send(&app, get_request("/api/top-searches", &bearer_for("someone-else"))).await;

        assert_eq!(status, StatusCode::OK);
        let entries = body.as_array().unwrap();
        assert_eq!(entries.len(), 5);
        assert_eq!(entries[0], json!({ "term": "a", "count": 2 }));
        assert_eq!(entries[1], json!({ "term": "b", "count": 1 }));
    }

    #[tokio::test]
    async fn test_read_endpoints_require_auth() {
        let pool = test_pool().await;
        let app = crate::build_router(test_state(
            pool,
            Arc::new(FakeImageProvider::with_page(0, vec![])),
        ));

        for uri in ["/api/history", "/api/top-searches"] {
            let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
            let (status, body) = send(&app, request).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body["message"], "Missing auth");
        }
    }
}
