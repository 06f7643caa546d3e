//! Code for creating the user table and fetching users from the database.

use std::fmt::Display;

use email_address::EmailAddress;
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, PasswordHash};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user of the application.
///
/// The caller should ensure that `id` and `email` are unique.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The user's display name.
    pub name: String,
    /// The email address the user logs in with.
    pub email: EmailAddress,
    /// The user's password hash.
    pub password_hash: PasswordHash,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// Returns a:
/// - [Error::DuplicateEmail] if `email` is already registered,
/// - or [Error::SqlError] if some other SQL related error occurred.
pub fn create_user(
    name: &str,
    email: EmailAddress,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    connection.execute(
        "INSERT INTO user (name, email, password) VALUES (?1, ?2, ?3)",
        (name, email.as_str(), password_hash.as_ref()),
    )?;

    let id = UserID::new(connection.last_insert_rowid());

    Ok(User {
        id,
        name: name.to_owned(),
        email,
        password_hash,
    })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserID, db_connection: &Connection) -> Result<User, Error> {
    db_connection
        .prepare("SELECT id, name, email, password FROM user WHERE id = :id")?
        .query_row(&[(":id", &user_id.as_i64())], map_user_row)
        .map_err(|error| error.into())
}

/// Get the user registered with `email`.
///
/// # Errors
///
/// Returns [Error::NotFound] if no user has registered with `email`, or
/// [Error::SqlError] if some other SQL related error occurred.
pub fn get_user_by_email(email: &str, db_connection: &Connection) -> Result<User, Error> {
    db_connection
        .prepare("SELECT id, name, email, password FROM user WHERE email = :email")?
        .query_row(&[(":email", &email)], map_user_row)
        .map_err(|error| error.into())
}

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_id = row.get(0)?;
    let name = row.get(1)?;
    let raw_email: String = row.get(2)?;
    let raw_password_hash: String = row.get(3)?;

    Ok(User {
        id: UserID::new(raw_id),
        name,
        email: EmailAddress::new_unchecked(raw_email),
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
    })
}
