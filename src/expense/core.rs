//! Defines the core data models and database queries for expenses.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error, UserID,
    category::{CategoryName, get_or_create_category},
    database_id::ExpenseId,
    money::{Currency, Money},
};

// ============================================================================
// MODELS
// ============================================================================

/// Money spent by a user on a given day.
///
/// Expenses are returned joined with the name of their category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// The ID of the expense.
    pub id: ExpenseId,
    /// When the money was spent.
    pub date: Date,
    /// A text description of what the money was spent on.
    pub description: String,
    /// How much was spent.
    pub amount: Money,
    /// The name of the category the expense belongs to.
    pub category: CategoryName,
    /// The user that recorded the expense.
    pub user_id: UserID,
}

/// The data needed to record a new expense.
///
/// The category is referred to by name and created if it does not exist.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    /// When the money was spent, no later than today.
    pub date: Date,
    /// What the money was spent on.
    pub description: String,
    /// How much was spent.
    pub amount: Money,
    /// The category to file the expense under.
    pub category: CategoryName,
    /// The user recording the expense.
    pub user_id: UserID,
}

/// An amount in a request body.
///
/// Clients may send either the text form, e.g. `"$42"`, or a bare JSON number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AmountField {
    /// An amount with an optional currency symbol, e.g. "$42.50".
    Text(String),
    /// A plain number, e.g. 42.5.
    Number(serde_json::Number),
}

impl AmountField {
    /// Parse the amount as money in `currency`.
    ///
    /// # Errors
    /// Returns [Error::InvalidAmount] if the amount is not valid in `currency`.
    pub fn parse(&self, currency: Currency) -> Result<Money, Error> {
        match self {
            AmountField::Text(text) => Money::parse(text, currency),
            AmountField::Number(number) => Money::parse(&number.to_string(), currency),
        }
    }
}

/// Parse a required amount field.
///
/// # Errors
/// Returns [Error::MissingField] if `amount` is `None`, otherwise see [AmountField::parse].
pub fn required_amount(amount: Option<AmountField>, currency: Currency) -> Result<Money, Error> {
    amount
        .ok_or(Error::MissingField("amount"))?
        .parse(currency)
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const SELECT_EXPENSE: &str = "SELECT e.id, e.date, e.description, e.amount_minor, e.currency, c.name, e.user_id \
     FROM expense e INNER JOIN category c ON c.id = e.category_id";

/// Create the expense table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS expense (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                description TEXT NOT NULL,
                amount_minor INTEGER NOT NULL,
                currency TEXT NOT NULL,
                category_id INTEGER NOT NULL,
                user_id INTEGER NOT NULL,
                FOREIGN KEY(category_id) REFERENCES category(id),
                FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE
                );

        CREATE INDEX IF NOT EXISTS idx_expense_user_date ON expense(user_id, date);",
    )?;

    Ok(())
}

/// Record a new expense, creating its category if needed.
///
/// The category lookup and the insert happen in one SQL transaction, which is
/// rolled back if either step fails.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error,
/// e.g. `new_expense.user_id` does not refer to a registered user.
pub fn create_expense(new_expense: NewExpense, connection: &Connection) -> Result<Expense, Error> {
    let transaction = connection.unchecked_transaction()?;

    let category = get_or_create_category(new_expense.category, &transaction)?;

    transaction.execute(
        "INSERT INTO expense (date, description, amount_minor, currency, category_id, user_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        (
            new_expense.date,
            &new_expense.description,
            new_expense.amount.stored_minor_units()?,
            new_expense.amount.currency,
            category.id,
            new_expense.user_id.as_i64(),
        ),
    )?;
    let id = transaction.last_insert_rowid();

    transaction.commit()?;

    Ok(Expense {
        id,
        date: new_expense.date,
        description: new_expense.description,
        amount: new_expense.amount,
        category: category.name,
        user_id: new_expense.user_id,
    })
}

/// Retrieve an expense from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid expense,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_expense(id: ExpenseId, connection: &Connection) -> Result<Expense, Error> {
    let expense = connection
        .prepare(&format!("{SELECT_EXPENSE} WHERE e.id = :id"))?
        .query_row(&[(":id", &id)], map_expense_row)?;

    Ok(expense)
}

/// Retrieve the expenses owned by `owner`, or every expense if `owner` is `None`.
///
/// Expenses are ordered by date, then by ID.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn get_expenses(owner: Option<UserID>, connection: &Connection) -> Result<Vec<Expense>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_EXPENSE} WHERE (:owner IS NULL OR e.user_id = :owner) ORDER BY e.date, e.id"
        ))?
        .query_map(
            &[(":owner", &owner.map(|user_id| user_id.as_i64()))],
            map_expense_row,
        )?
        .map(|maybe_expense| maybe_expense.map_err(Error::from))
        .collect()
}

/// Change the description and amount of the expense `id`.
///
/// The date, category and owner of an expense cannot be changed.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid expense,
/// - [Error::Forbidden] if the expense is not owned by `caller`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_expense(
    caller: UserID,
    id: ExpenseId,
    description: String,
    amount: Money,
    connection: &Connection,
) -> Result<Expense, Error> {
    let transaction = connection.unchecked_transaction()?;

    let expense = get_owned_expense(caller, id, &transaction)?;

    transaction.execute(
        "UPDATE expense SET description = ?1, amount_minor = ?2, currency = ?3 WHERE id = ?4",
        (&description, amount.stored_minor_units()?, amount.currency, id),
    )?;

    transaction.commit()?;

    Ok(Expense {
        description,
        amount,
        ..expense
    })
}

/// Delete the expense `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid expense,
/// - [Error::Forbidden] if the expense is not owned by `caller`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_expense(caller: UserID, id: ExpenseId, connection: &Connection) -> Result<(), Error> {
    let transaction = connection.unchecked_transaction()?;

    get_owned_expense(caller, id, &transaction)?;
    transaction.execute("DELETE FROM expense WHERE id = :id", &[(":id", &id)])?;

    transaction.commit()?;

    Ok(())
}

/// Get the expense `id`, checking that it belongs to `caller`.
fn get_owned_expense(
    caller: UserID,
    id: ExpenseId,
    connection: &Connection,
) -> Result<Expense, Error> {
    let expense = get_expense(id, connection)?;

    if expense.user_id != caller {
        tracing::warn!(
            "User {caller} tried to modify expense {id} owned by user {}",
            expense.user_id
        );
        return Err(Error::Forbidden);
    }

    Ok(expense)
}

/// Map a database row to an Expense.
fn map_expense_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    let id = row.get(0)?;
    let date = row.get(1)?;
    let description = row.get(2)?;
    let minor_units: i64 = row.get(3)?;
    let currency = row.get(4)?;
    let raw_category: String = row.get(5)?;
    let raw_user_id = row.get(6)?;

    Ok(Expense {
        id,
        date,
        description,
        amount: Money::new(minor_units.into(), currency),
        category: CategoryName::new_unchecked(&raw_category),
        user_id: UserID::new(raw_user_id),
    })
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod amount_field_tests {
    use crate::{
        Error,
        expense::core::{AmountField, required_amount},
        money::{Currency, Money},
    };

    #[test]
    fn accepts_text_and_numbers() {
        let text: AmountField = serde_json::from_str("\"$42\"").unwrap();
        let whole: AmountField = serde_json::from_str("42").unwrap();
        let fractional: AmountField = serde_json::from_str("42.5").unwrap();

        assert_eq!(text.parse(Currency::Usd), Ok(Money::new(4200, Currency::Usd)));
        assert_eq!(whole.parse(Currency::Usd), Ok(Money::new(4200, Currency::Usd)));
        assert_eq!(
            fractional.parse(Currency::Usd),
            Ok(Money::new(4250, Currency::Usd))
        );
    }

    #[test]
    fn missing_amount_is_reported_by_name() {
        assert_eq!(
            required_amount(None, Currency::Usd),
            Err(Error::MissingField("amount"))
        );
    }
}
