// src/logging_middleware.rs
//! Request id propagation and debug-level body logging

use axum::body::to_bytes;
use axum::{
    body::Body,
    extract::Request,
    http::{HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use serde_json::Value;
use tracing::{debug, Level};
use uuid::Uuid;

use crate::common::safe_token_log;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Replace every `token` string in a JSON document with its masked form
fn redact_tokens(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, field) in map.iter_mut() {
                if key == "token" {
                    if let Some(token) = field.as_str() {
                        let masked = safe_token_log(token);
                        *field = Value::String(masked);
                        continue;
                    }
                }
                redact_tokens(field);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact_tokens),
        _ => {}
    }
}

fn body_for_log(bytes: &[u8]) -> Option<String> {
    let body_str = std::str::from_utf8(bytes).ok()?;
    match serde_json::from_str::<Value>(body_str) {
        Ok(mut json) => {
            redact_tokens(&mut json);
            Some(serde_json::to_string_pretty(&json).unwrap_or_else(|_| body_str.to_string()))
        }
        Err(_) => Some(body_str.to_string()),
    }
}

/// Tags every response with an `x-request-id` (reusing the caller's when
/// present) and, at debug level, logs JSON request and response bodies.
/// Headers are never logged, so bearer tokens stay out of the logs.
pub async fn log_request_response(request: Request, next: Next) -> Result<Response, StatusCode> {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let log_bodies = tracing::enabled!(Level::DEBUG);

    let request = if log_bodies {
        let (parts, body) = request.into_parts();
        // Size limits are left to the extractors, so the log level never
        // changes which requests are accepted
        let bytes = to_bytes(body, usize::MAX)
            .await
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

        if let Some(body) = body_for_log(&bytes).filter(|b| !b.is_empty()) {
            debug!(
                request_id = %request_id,
                method = %parts.method,
                uri = %parts.uri.path(),
                request_body = %body,
                "📥 Request"
            );
        }

        Request::from_parts(parts, Body::from(bytes))
    } else {
        request
    };

    let response = next.run(request).await;

    let mut response = if log_bodies {
        let (parts, body) = response.into_parts();
        let bytes = to_bytes(body, usize::MAX)
            .await
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

        if let Some(body) = body_for_log(&bytes).filter(|b| !b.is_empty()) {
            debug!(
                request_id = %request_id,
                status = %parts.status,
                response_body = %body,
                "📤 Response"
            );
        }

        Response::from_parts(parts, Body::from(bytes))
    } else {
        response
    };

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }

    Ok(response)
}
