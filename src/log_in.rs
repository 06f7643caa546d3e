//! The endpoint for exchanging an email and password for a bearer token.

use axum::{
    Json,
    extract::{FromRef, State},
};
use serde::Deserialize;
use time::{Duration, OffsetDateTime};

use crate::{
    AppState, Error,
    auth::{JwtKeys, encode_token},
    db::{DbConnection, lock_connection},
    extract::{JsonBody, required},
    register_user::TokenResponse,
    user::get_user_by_email,
};

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// The keys for signing bearer tokens.
    pub jwt_keys: JwtKeys,
    /// How long the issued token stays valid.
    pub token_duration: Duration,
    /// The database connection for looking up users.
    pub db_connection: DbConnection,
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            jwt_keys: state.jwt_keys.clone(),
            token_duration: state.token_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The body of a log in request.
#[derive(Debug, Deserialize)]
pub struct LogInRequest {
    /// The email address the user registered with.
    pub email: Option<String>,
    /// The user's password in plain text.
    pub password: Option<String>,
}

/// A route handler for logging in a user.
///
/// An unknown email and a wrong password get the same 401 response so that
/// clients cannot probe which addresses are registered.
pub async fn post_log_in(
    State(state): State<LoginState>,
    JsonBody(request): JsonBody<LogInRequest>,
) -> Result<Json<TokenResponse>, Error> {
    let email = required(request.email, "email")?;
    // Not trimmed, the password must match exactly what was registered.
    let password = request
        .password
        .filter(|password| !password.trim().is_empty())
        .ok_or(Error::MissingField("password"))?;

    let user = {
        let connection = lock_connection(&state.db_connection)?;
        get_user_by_email(&email, &connection).map_err(|error| match error {
            Error::NotFound => Error::InvalidCredentials,
            error => error,
        })?
    };

    let is_password_correct = user.password_hash.verify(&password).map_err(|error| {
        tracing::error!("Error verifying password: {error}");
        Error::HashingError(error.to_string())
    })?;

    if !is_password_correct {
        tracing::info!("Failed log in attempt for user {}", user.id);
        return Err(Error::InvalidCredentials);
    }

    let token = encode_token(
        user.id,
        OffsetDateTime::now_utc(),
        state.token_duration,
        &state.jwt_keys,
    )?;

    Ok(Json(TokenResponse { token }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};
    use time::Duration;

    use crate::{
        ServerConfig, endpoints,
        password::MAX_PASSWORD_BYTES,
        test_utils::{
            TEST_PASSWORD, log_in, register, test_config, test_server, test_state,
            test_state_with,
        },
    };

    #[tokio::test]
    async fn log_in_succeeds_with_valid_credentials() {
        let server = test_server(test_state());
        register(&server, "alice@example.com").await;

        let token = log_in(&server, "alice@example.com").await;

        server
            .get(endpoints::EXPENSE)
            .authorization_bearer(&token)
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn log_in_fails_with_wrong_password() {
        let server = test_server(test_state());
        register(&server, "alice@example.com").await;

        let response = server
            .post(endpoints::LOG_IN)
            .json(&json!({ "email": "alice@example.com", "password": "wrongpassword" }))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        let body = response.json::<Value>();
        assert!(body.get("token").is_none());
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn log_in_fails_with_password_sharing_a_long_prefix() {
        let server = test_server(test_state());
        let password = "a".repeat(MAX_PASSWORD_BYTES);
        server
            .post(endpoints::REGISTER)
            .json(&json!({
                "name": "Alice",
                "email": "alice@example.com",
                "password": password,
            }))
            .await
            .assert_status_ok();

        let response = server
            .post(endpoints::LOG_IN)
            .json(&json!({
                "email": "alice@example.com",
                "password": format!("{password}different"),
            }))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        assert!(response.json::<Value>().get("token").is_none());

        server
            .post(endpoints::LOG_IN)
            .json(&json!({ "email": "alice@example.com", "password": password }))
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn log_in_fails_with_unknown_email() {
        let server = test_server(test_state());

        let response = server
            .post(endpoints::LOG_IN)
            .json(&json!({ "email": "nobody@example.com", "password": TEST_PASSWORD }))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        assert!(response.json::<Value>().get("token").is_none());
    }

    #[tokio::test]
    async fn log_in_fails_on_missing_fields() {
        let server = test_server(test_state());

        for body in [
            json!({ "password": TEST_PASSWORD }),
            json!({ "email": "alice@example.com" }),
            json!({ "email": "alice@example.com", "password": "" }),
        ] {
            server
                .post(endpoints::LOG_IN)
                .json(&body)
                .await
                .assert_status(StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let server = test_server(test_state_with(ServerConfig {
            token_duration: Duration::minutes(-5),
            ..test_config()
        }));

        let token = register(&server, "alice@example.com").await;

        server
            .get(endpoints::EXPENSE)
            .authorization_bearer(&token)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
