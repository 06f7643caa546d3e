#![allow(missing_docs)]

pub(crate) mod http;

use email_address::EmailAddress;
use rusqlite::Connection;

use crate::{
    AppState, PasswordHash, ServerConfig, User, initialize_db, user::create_user,
};

pub(crate) use http::{log_in, register, test_server};

/// The secret that test tokens are signed with.
pub(crate) const TEST_SECRET: &str = "foobar";

/// The password every test user is registered with.
pub(crate) const TEST_PASSWORD: &str = "averysafeandsecurepassword";

/// bcrypt's minimum cost, which keeps hashing fast in tests.
pub(crate) const TEST_PASSWORD_COST: u32 = 4;

pub(crate) fn get_test_connection() -> Connection {
    let connection = Connection::open_in_memory().unwrap();
    initialize_db(&connection).unwrap();
    connection
}

pub(crate) fn insert_test_user(email: &str, connection: &Connection) -> User {
    create_user(
        "Test User",
        EmailAddress::new_unchecked(email),
        PasswordHash::from_raw_password(TEST_PASSWORD, TEST_PASSWORD_COST).unwrap(),
        connection,
    )
    .unwrap()
}

pub(crate) fn test_config() -> ServerConfig {
    ServerConfig {
        password_cost: TEST_PASSWORD_COST,
        ..Default::default()
    }
}

pub(crate) fn test_state() -> AppState {
    test_state_with(test_config())
}

pub(crate) fn test_state_with(config: ServerConfig) -> AppState {
    AppState::new(Connection::open_in_memory().unwrap(), TEST_SECRET, config).unwrap()
}
