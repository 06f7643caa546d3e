use axum::{
    Json,
    extract::{FromRef, State},
};
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::Claims,
    category::CategoryName,
    db::{DbConnection, lock_connection},
    expense::{
        Expense,
        core::{AmountField, NewExpense, create_expense, required_amount},
        window::parse_date,
    },
    extract::{JsonBody, required},
    money::Currency,
    timezone::local_today,
};

/// The state needed to record an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The currency amounts are parsed in.
    pub currency: Currency,
    /// The database connection for managing expenses.
    pub db_connection: DbConnection,
}

impl FromRef<AppState> for CreateExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            currency: state.currency,
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The body of a request to record an expense.
#[derive(Debug, Deserialize)]
pub struct CreateExpenseRequest {
    /// What the money was spent on.
    pub description: Option<String>,
    /// How much was spent, e.g. "$42".
    pub amount: Option<AmountField>,
    /// The name of the category, created if it does not exist yet.
    pub category: Option<String>,
    /// When the money was spent, defaults to today.
    pub date: Option<String>,
}

/// A route handler for recording a new expense for the caller.
///
/// Responds with the stored expense.
pub async fn create_expense_endpoint(
    State(state): State<CreateExpenseState>,
    claims: Claims,
    JsonBody(request): JsonBody<CreateExpenseRequest>,
) -> Result<Json<Expense>, Error> {
    let description = required(request.description, "description")?;
    let amount = required_amount(request.amount, state.currency)?;
    let category = CategoryName::new(&required(request.category, "category")?)?;

    // "Today" is evaluated per request so that long running servers do not
    // stamp new expenses with the date they started on.
    let today = local_today(&state.local_timezone)?;
    let date = match request.date {
        Some(text) => parse_date(&text)?,
        None => today,
    };

    if date > today {
        return Err(Error::FutureDate(date));
    }

    let connection = lock_connection(&state.db_connection)?;

    create_expense(
        NewExpense {
            date,
            description,
            amount,
            category,
            user_id: claims.user_id(),
        },
        &connection,
    )
    .map(Json)
}
