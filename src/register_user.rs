//! The endpoint for creating a new user account.

use std::str::FromStr;

use axum::{
    Json,
    extract::{FromRef, State},
};
use email_address::EmailAddress;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{
    AppState, Error, PasswordHash, ValidatedPassword,
    auth::{JwtKeys, encode_token},
    db::{DbConnection, lock_connection},
    extract::{JsonBody, required},
    user::create_user,
};

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The keys for signing bearer tokens.
    pub jwt_keys: JwtKeys,
    /// How long the issued token stays valid.
    pub token_duration: Duration,
    /// The bcrypt cost used to hash the password.
    pub password_cost: u32,
    /// The database connection for managing users.
    pub db_connection: DbConnection,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            jwt_keys: state.jwt_keys.clone(),
            token_duration: state.token_duration,
            password_cost: state.password_cost,
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The body of a registration request.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// The user's display name.
    pub name: Option<String>,
    /// The email address the user will log in with.
    pub email: Option<String>,
    /// The user's password in plain text.
    pub password: Option<String>,
}

/// The response to a successful registration or log in.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// A bearer token for the user.
    pub token: String,
}

/// A route handler for registering a new user.
///
/// Responds with a bearer token for the new user, or 409 Conflict if the
/// email address is already registered.
pub async fn register_user(
    State(state): State<RegistrationState>,
    JsonBody(request): JsonBody<RegisterRequest>,
) -> Result<Json<TokenResponse>, Error> {
    let name = required(request.name, "name")?;
    let raw_email = required(request.email, "email")?;
    let email = EmailAddress::from_str(&raw_email).map_err(|_| Error::InvalidEmail(raw_email))?;
    let password = ValidatedPassword::new(request.password.as_deref().unwrap_or_default())?;

    let password_hash = PasswordHash::new(password, state.password_cost)?;

    let user = {
        let connection = lock_connection(&state.db_connection)?;
        create_user(&name, email, password_hash, &connection)?
    };

    tracing::info!("Registered user {}", user.id);

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

    use crate::{
        endpoints,
        password::MAX_PASSWORD_BYTES,
        register_user::TokenResponse,
        test_utils::{TEST_PASSWORD, register, test_server, test_state},
    };

    #[tokio::test]
    async fn register_returns_usable_token() {
        let server = test_server(test_state());

        let token = register(&server, "alice@example.com").await;

        server
            .get(endpoints::EXPENSE)
            .authorization_bearer(&token)
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn register_twice_is_conflict_and_keeps_one_user() {
        let state = test_state();
        let server = test_server(state.clone());
        register(&server, "alice@example.com").await;

        let response = server
            .post(endpoints::REGISTER)
            .json(&json!({
                "name": "Another Alice",
                "email": "alice@example.com",
                "password": "somethingelse",
            }))
            .await;

        response.assert_status(StatusCode::CONFLICT);
        assert!(response.json::<Value>().get("token").is_none());
        let connection = state.db_connection.lock().unwrap();
        let user_count: i64 = connection
            .query_row("SELECT COUNT(id) FROM user", [], |row| row.get(0))
            .unwrap();
        assert_eq!(user_count, 1);
    }

    #[tokio::test]
    async fn register_fails_on_invalid_input() {
        let server = test_server(test_state());

        for body in [
            json!({ "email": "alice@example.com", "password": TEST_PASSWORD }),
            json!({ "name": "Alice", "password": TEST_PASSWORD }),
            json!({ "name": "Alice", "email": "not an email", "password": TEST_PASSWORD }),
            json!({ "name": "Alice", "email": "alice@example.com" }),
            json!({ "name": "Alice", "email": "alice@example.com", "password": "   " }),
        ] {
            let response = server.post(endpoints::REGISTER).json(&body).await;

            response.assert_status(StatusCode::BAD_REQUEST);
            assert!(response.json::<Value>()["error"].is_string());
        }
    }

    #[tokio::test]
    async fn register_fails_on_password_too_long_to_hash() {
        let server = test_server(test_state());
        let password = format!("{}SECRET_TAIL", "a".repeat(MAX_PASSWORD_BYTES));

        let response = server
            .post(endpoints::REGISTER)
            .json(&json!({
                "name": "Alice",
                "email": "alice@example.com",
                "password": password,
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.json::<Value>().get("token").is_none());
    }

    #[tokio::test]
    async fn register_fails_on_malformed_json() {
        let server = test_server(test_state());

        server
            .post(endpoints::REGISTER)
            .content_type("application/json")
            .bytes("{\"name\": ".into())
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[test]
    fn token_response_serializes_token_field() {
        let response = TokenResponse {
            token: "abc".to_owned(),
        };

        assert_eq!(
            serde_json::to_value(response).unwrap(),
            json!({ "token": "abc" })
        );
    }
}
