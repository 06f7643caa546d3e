//! Database initialisation and access to the shared connection.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{
    Error, category::create_category_table, expense::create_expense_table,
    user::create_user_table,
};

/// The SQLite connection shared between request handlers.
pub type DbConnection = Arc<Mutex<Connection>>;

/// Create the tables for the domain models if they do not exist yet.
///
/// Foreign key enforcement is switched on for `connection`, since SQLite
/// leaves it off by default.
///
/// # Errors
/// Returns an error if a table cannot be created or if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_category_table(&transaction)?;
    create_expense_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Acquire the lock on the shared connection.
///
/// # Errors
/// Returns [Error::DatabaseLockError] if the lock is poisoned.
pub fn lock_connection(db_connection: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>, Error> {
    db_connection.lock().map_err(|error| {
        tracing::error!("Could not acquire database lock: {error}");
        Error::DatabaseLockError
    })
}
