//! Middleware for logging requests and responses.

use axum::{
    extract::Request,
    http::{StatusCode, header::CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::Error;

/// Bodies longer than this many bytes are truncated in the `info` log.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// The JSON fields whose values must never appear in the logs.
const REDACTED_FIELDS: [&str; 2] = ["password", "token"];

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and the full body is logged at the `debug` level.
///
/// Only the method, URI and status are logged, never the headers, so bearer
/// tokens stay out of the logs. Passwords and tokens in JSON bodies are
/// redacted.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::warn!("Could not read request body: {error}");
            return Error::InvalidRequest("could not read the request body".to_owned())
                .into_response();
        }
    };

    let is_json = parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|content_type| content_type.starts_with("application/json"));
    let body_text = String::from_utf8_lossy(&body_bytes);
    let display_text = if is_json {
        redact_json(&body_text)
    } else {
        body_text.to_string()
    };
    log_body(
        &format!("Received request: {} {}", parts.method, parts.uri),
        &display_text,
    );

    let request = Request::from_parts(parts, body_bytes.into());
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    log_body(
        &format!("Sending response: {}", parts.status),
        &redact_json(&String::from_utf8_lossy(&body_bytes)),
    );

    Response::from_parts(parts, body_bytes.into())
}

/// Replace the values of sensitive fields in a JSON object.
///
/// Text that is not a JSON object is returned unchanged.
fn redact_json(body: &str) -> String {
    let Ok(Value::Object(mut object)) = serde_json::from_str::<Value>(body) else {
        return body.to_owned();
    };

    for field in REDACTED_FIELDS {
        if let Some(value) = object.get_mut(field) {
            *value = Value::String("********".to_owned());
        }
    }

    Value::Object(object).to_string()
}

/// The longest prefix of `body` that is at most [LOG_BODY_LENGTH_LIMIT] bytes
/// and ends on a character boundary.
fn truncate(body: &str) -> &str {
    let end = body
        .char_indices()
        .map(|(index, c)| index + c.len_utf8())
        .take_while(|&end| end <= LOG_BODY_LENGTH_LIMIT)
        .last()
        .unwrap_or(0);

    &body[..end]
}

fn log_body(message: &str, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!("{message}\nbody: {}...", truncate(body));
        tracing::debug!("Full body: {body:?}");
    } else {
        tracing::info!("{message}\nbody: {body:?}");
    }
}
