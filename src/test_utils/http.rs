use axum_test::TestServer;
use serde_json::{Value, json};

use crate::{AppState, build_router, endpoints, test_utils::TEST_PASSWORD};

pub(crate) fn test_server(state: AppState) -> TestServer {
    TestServer::try_new(build_router(state)).expect("Could not create test server.")
}

/// Register a user with `email` and return their bearer token.
pub(crate) async fn register(server: &TestServer, email: &str) -> String {
    let response = server
        .post(endpoints::REGISTER)
        .json(&json!({
            "name": "Test User",
            "email": email,
            "password": TEST_PASSWORD,
        }))
        .await;

    response.assert_status_ok();
    token_from(response.json())
}

/// Log in as `email` and return a fresh bearer token.
pub(crate) async fn log_in(server: &TestServer, email: &str) -> String {
    let response = server
        .post(endpoints::LOG_IN)
        .json(&json!({ "email": email, "password": TEST_PASSWORD }))
        .await;

    response.assert_status_ok();
    token_from(response.json())
}

fn token_from(body: Value) -> String {
    body["token"]
        .as_str()
        .expect("response should contain a token")
        .to_owned()
}
