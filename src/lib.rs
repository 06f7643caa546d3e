//! Expense tracker is a small personal-finance REST API.
//!
//! Users register or log in to receive a bearer token, then record expenses
//! grouped by category and query them by date range or as monthly totals.
//!
//! This library provides the router, the application state and the domain
//! functions behind each endpoint. The `server` binary wires them up.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use time::Date;
use tokio::signal;

mod app_state;
mod auth;
mod category;
mod database_id;
mod db;
mod endpoints;
mod expense;
mod extract;
mod log_in;
mod logging;
mod money;
mod password;
mod register_user;
mod routing;
mod timezone;
mod user;

#[cfg(test)]
mod test_utils;

pub use app_state::{AppState, LedgerScope, ServerConfig};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use money::{Currency, Money};
pub use password::{PasswordHash, ValidatedPassword};
pub use routing::build_router;
pub use timezone::get_local_offset;
pub use user::{User, UserID, get_user_by_id};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A required field was missing from the request body or was blank.
    #[error("the field \"{0}\" is required")]
    MissingField(&'static str),

    /// The request body or path could not be parsed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The password is longer than bcrypt can hash without truncating it.
    #[error("the password must be at most {} bytes long", password::MAX_PASSWORD_BYTES)]
    PasswordTooLong,

    /// The email address given during registration is not well formed.
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),

    /// The amount could not be parsed as money in the ledger's currency.
    #[error("invalid amount \"{0}\"")]
    InvalidAmount(String),

    /// A date string was not in the `YYYY-MM-DD` format.
    #[error("invalid date \"{0}\", expected a date like 2024-03-15")]
    InvalidDate(String),

    /// A month number outside of 1 to 12 was requested.
    #[error("\"{0}\" is not a month, expected a number from 1 to 12")]
    InvalidMonth(String),

    /// An empty string was used to create a category name.
    #[error("category name cannot be empty")]
    EmptyCategoryName,

    /// A date in the future was used to create an expense.
    ///
    /// Expenses record money that has already been spent, therefore future
    /// dates are not allowed.
    #[error("{0} is a date in the future, which is not allowed")]
    FutureDate(Date),

    /// The email and password combination did not match a registered user.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The request did not carry a bearer token.
    #[error("missing bearer token")]
    MissingToken,

    /// The bearer token is malformed, has a bad signature or has expired.
    #[error("invalid or expired token")]
    InvalidToken,

    /// The caller tried to modify a resource owned by another user.
    #[error("you do not have permission to modify this expense")]
    Forbidden,

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The email address is already registered.
    #[error("the email address is already registered")]
    DuplicateEmail,

    /// Two amounts in different currencies were added together.
    #[error("cannot add {0} to {1}")]
    CurrencyMismatch(String, String),

    /// An amount was too large to store or to add to another amount.
    #[error("the amount is too large")]
    AmountOverflow,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The JSON web token could not be created.
    #[error("could not create token: {0}")]
    TokenCreation(String),

    /// The configured timezone is not a canonical timezone name.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::InvalidRequest(rejection.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Error::InvalidRequest(rejection.body_text())
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingField(_)
            | Error::InvalidRequest(_)
            | Error::InvalidEmail(_)
            | Error::PasswordTooLong
            | Error::InvalidAmount(_)
            | Error::InvalidDate(_)
            | Error::InvalidMonth(_)
            | Error::EmptyCategoryName
            | Error::FutureDate(_) => StatusCode::BAD_REQUEST,
            Error::InvalidCredentials | Error::MissingToken | Error::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            Error::Forbidden => StatusCode::FORBIDDEN,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::DuplicateEmail => StatusCode::CONFLICT,
            Error::CurrencyMismatch(_, _)
            | Error::AmountOverflow
            | Error::HashingError(_)
            | Error::TokenCreation(_)
            | Error::InvalidTimezone(_)
            | Error::SqlError(_)
            | Error::DatabaseLockError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            // Internal errors are not intended to be shown to the client.
            tracing::error!("An unexpected error occurred: {}", self);
            "An unexpected error occurred, check the server logs for more details.".to_owned()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
