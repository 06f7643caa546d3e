//! Categories group expenses under a shared label, e.g. "Groceries".
//!
//! Categories are created lazily: the first expense that names an unseen
//! category creates it, and every later expense with the same name shares the
//! row. Names are compared exactly, so "food" and "Food" are different
//! categories.

use std::{fmt::Display, str::FromStr};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::Claims,
    database_id::CategoryId,
    db::{DbConnection, lock_connection},
};

/// The name of a category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name with surrounding whitespace removed.
    ///
    /// # Errors
    ///
    /// Returns [Error::EmptyCategoryName] if `name` is empty or only whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let trimmed = name.trim();

        if trimmed.is_empty() {
            Err(Error::EmptyCategoryName)
        } else {
            Ok(Self(trimmed.to_owned()))
        }
    }

    /// Create a category name without any validation.
    ///
    /// The caller should ensure that `name` is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CategoryName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryName::new(s)
    }
}

/// A label shared by any number of expenses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The unique name of the category.
    pub name: CategoryName,
}

/// Create the category table.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE
        )",
        (),
    )?;

    Ok(())
}

/// Get the category called `name`, creating it if it does not exist yet.
///
/// The insert is a no-op when the name is already taken, so two writers racing
/// on the same new name both end up with the row the first one created.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub fn get_or_create_category(
    name: CategoryName,
    connection: &Connection,
) -> Result<Category, Error> {
    connection.execute(
        "INSERT INTO category (name) VALUES (?1) ON CONFLICT(name) DO NOTHING",
        (name.as_ref(),),
    )?;

    get_category_by_name(&name, connection)
}

/// Retrieve a category by its exact name.
///
/// # Errors
/// Returns [Error::NotFound] if there is no category called `name`.
pub fn get_category_by_name(
    name: &CategoryName,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare("SELECT id, name FROM category WHERE name = :name")?
        .query_row(&[(":name", name.as_ref())], map_category_row)
        .map_err(|error| error.into())
}

/// Retrieve all categories ordered alphabetically by name.
pub fn get_all_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare("SELECT id, name FROM category ORDER BY name ASC")?
        .query_map([], map_category_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

fn map_category_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;

    Ok(Category {
        id,
        name: CategoryName::new_unchecked(&raw_name),
    })
}

/// The state needed to list categories.
#[derive(Debug, Clone)]
pub struct CategoryState {
    /// The database connection for reading categories.
    pub db_connection: DbConnection,
}

impl FromRef<AppState> for CategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that lists every category.
pub async fn get_categories_endpoint(
    State(state): State<CategoryState>,
    _: Claims,
) -> Result<Json<Vec<Category>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_all_categories(&connection).map(Json)
}
