//! Request extractors that reject malformed input with [Error] so that every
//! failure reaches the client as a JSON error body.

use axum::extract::{FromRequest, FromRequestParts};

use crate::Error;

/// A JSON request body.
///
/// Works like [axum::Json], but a body that cannot be parsed is reported as
/// [Error::InvalidRequest] (400 Bad Request).
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct JsonBody<T>(pub T);

/// A path parameter.
///
/// Works like [axum::extract::Path], but a parameter that cannot be parsed is
/// reported as [Error::InvalidRequest] (400 Bad Request).
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct PathParam<T>(pub T);

/// Unwrap a text field of a request body, trimming surrounding whitespace.
///
/// Request bodies use `Option<String>` fields so that a missing field is
/// reported by name instead of as a generic parse failure.
///
/// # Errors
/// Returns [Error::MissingField] naming `field` if `value` is absent or blank.
pub fn required(value: Option<String>, field: &'static str) -> Result<String, Error> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text.trim().to_owned()),
        _ => Err(Error::MissingField(field)),
    }
}
