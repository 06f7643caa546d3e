//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;
use time::Duration;

use crate::{
    Error, PasswordHash, UserID,
    auth::{DEFAULT_TOKEN_DURATION, JwtKeys},
    db::{DbConnection, initialize},
    money::Currency,
    timezone::get_local_offset,
};

/// Whose expenses the list, range, window and total endpoints can see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LedgerScope {
    /// Users only see their own expenses.
    #[default]
    Owner,
    /// Every user sees every expense. Ownership is still required to update
    /// or delete an expense.
    Shared,
}

impl LedgerScope {
    /// The owner to filter expenses by for a request made by `user_id`, or
    /// `None` if every owner's expenses are visible.
    pub fn owner_filter(self, user_id: UserID) -> Option<UserID> {
        match self {
            LedgerScope::Owner => Some(user_id),
            LedgerScope::Shared => None,
        }
    }
}

/// Settings for the server that have sensible defaults.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// How long bearer tokens stay valid after they are issued.
    pub token_duration: Duration,
    /// The currency the ledger is kept in.
    pub currency: Currency,
    /// Whose expenses the read endpoints can see.
    pub ledger_scope: LedgerScope,
    /// The bcrypt cost used when hashing new passwords.
    pub password_cost: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            local_timezone: "Etc/UTC".to_owned(),
            token_duration: DEFAULT_TOKEN_DURATION,
            currency: Currency::Usd,
            ledger_scope: LedgerScope::Owner,
            password_cost: PasswordHash::DEFAULT_COST,
        }
    }
}

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The keys for signing and verifying bearer tokens.
    pub jwt_keys: JwtKeys,

    /// How long bearer tokens stay valid after they are issued.
    pub token_duration: Duration,

    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,

    /// The currency the ledger is kept in.
    pub currency: Currency,

    /// Whose expenses the read endpoints can see.
    pub ledger_scope: LedgerScope,

    /// The bcrypt cost used when hashing new passwords.
    pub password_cost: u32,

    /// The database connection
    pub db_connection: DbConnection,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    /// `token_secret` is used to sign bearer tokens.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized or if
    /// `config.local_timezone` is not a valid, canonical timezone name.
    pub fn new(
        db_connection: Connection,
        token_secret: &str,
        config: ServerConfig,
    ) -> Result<Self, Error> {
        if get_local_offset(&config.local_timezone).is_none() {
            return Err(Error::InvalidTimezone(config.local_timezone));
        }

        initialize(&db_connection)?;

        Ok(Self {
            jwt_keys: JwtKeys::new(token_secret),
            token_duration: config.token_duration,
            local_timezone: config.local_timezone,
            currency: config.currency,
            ledger_scope: config.ledger_scope,
            password_cost: config.password_cost,
            db_connection: Arc::new(Mutex::new(db_connection)),
        })
    }
}

// this impl tells the `Claims` extractor how to access the keys from our state
impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.jwt_keys.clone()
    }
}
