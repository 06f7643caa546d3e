//! Route handlers that read a snapshot of the ledger and filter or sum it.

use axum::{
    Json,
    extract::{FromRef, State},
};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, LedgerScope,
    auth::Claims,
    db::{DbConnection, lock_connection},
    expense::{
        Expense,
        aggregation::{MonthlyTotal, parse_month, total, total_by_calendar_month},
        core::get_expenses,
        window::{DateWindow, WindowPreset, parse_date},
    },
    extract::{JsonBody, PathParam, required},
    money::{Currency, Money},
    timezone::local_today,
};

/// The state needed to query expenses.
#[derive(Debug, Clone)]
pub struct QueryState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The currency totals are kept in.
    pub currency: Currency,
    /// Whose expenses the caller can see.
    pub ledger_scope: LedgerScope,
    /// The database connection for reading expenses.
    pub db_connection: DbConnection,
}

impl FromRef<AppState> for QueryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            currency: state.currency,
            ledger_scope: state.ledger_scope,
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The body of a date range query.
#[derive(Debug, Deserialize)]
pub struct RangeRequest {
    /// The first date to include, e.g. "2024-03-01".
    pub start: Option<String>,
    /// The last date to include, e.g. "2024-03-31".
    pub end: Option<String>,
}

/// The response for the total of every visible expense.
#[derive(Debug, Serialize)]
pub struct TotalResponse {
    /// The sum of the amounts.
    pub total: Money,
}

fn load_expenses(state: &QueryState, claims: &Claims) -> Result<Vec<Expense>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_expenses(state.ledger_scope.owner_filter(claims.user_id()), &connection)
}

fn expenses_in_preset(
    state: &QueryState,
    claims: &Claims,
    preset: WindowPreset,
) -> Result<Json<Vec<Expense>>, Error> {
    let today = local_today(&state.local_timezone)?;
    let window = DateWindow::from_preset(preset, today);

    Ok(Json(window.filter(load_expenses(state, claims)?)))
}

/// A route handler that lists the visible expenses ordered by date.
pub async fn get_expenses_endpoint(
    State(state): State<QueryState>,
    claims: Claims,
) -> Result<Json<Vec<Expense>>, Error> {
    load_expenses(&state, &claims).map(Json)
}

/// A route handler that lists the visible expenses dated between `start` and
/// `end`, inclusive.
pub async fn query_range_endpoint(
    State(state): State<QueryState>,
    claims: Claims,
    JsonBody(request): JsonBody<RangeRequest>,
) -> Result<Json<Vec<Expense>>, Error> {
    let start = parse_date(&required(request.start, "start")?)?;
    let end = parse_date(&required(request.end, "end")?)?;
    let window = DateWindow::new(start, end);

    Ok(Json(window.filter(load_expenses(&state, &claims)?)))
}

/// A route handler that lists the visible expenses from the previous calendar week.
pub async fn get_past_week_endpoint(
    State(state): State<QueryState>,
    claims: Claims,
) -> Result<Json<Vec<Expense>>, Error> {
    expenses_in_preset(&state, &claims, WindowPreset::PreviousWeek)
}

/// A route handler that lists the visible expenses from the previous calendar month.
pub async fn get_past_month_endpoint(
    State(state): State<QueryState>,
    claims: Claims,
) -> Result<Json<Vec<Expense>>, Error> {
    expenses_in_preset(&state, &claims, WindowPreset::PreviousMonth)
}

/// A route handler that lists the visible expenses from roughly the last
/// three calendar months.
pub async fn get_past_quarter_endpoint(
    State(state): State<QueryState>,
    claims: Claims,
) -> Result<Json<Vec<Expense>>, Error> {
    expenses_in_preset(&state, &claims, WindowPreset::TrailingQuarter)
}

/// A route handler that sums every visible expense.
pub async fn get_total_endpoint(
    State(state): State<QueryState>,
    claims: Claims,
) -> Result<Json<TotalResponse>, Error> {
    let expenses = load_expenses(&state, &claims)?;

    Ok(Json(TotalResponse {
        total: total(&expenses, state.currency)?,
    }))
}

/// A route handler that sums the visible expenses of one calendar month,
/// given as a number from 1 to 12, across every year.
pub async fn get_monthly_total_endpoint(
    State(state): State<QueryState>,
    claims: Claims,
    PathParam(month): PathParam<String>,
) -> Result<Json<MonthlyTotal>, Error> {
    let month = parse_month(&month)?;
    let expenses = load_expenses(&state, &claims)?;

    total_by_calendar_month(&expenses, month, state.currency).map(Json)
}
