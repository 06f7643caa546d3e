use axum::{
    Json,
    extract::{FromRef, State},
};

use crate::{
    AppState, Error, LedgerScope,
    auth::Claims,
    database_id::ExpenseId,
    db::{DbConnection, lock_connection},
    expense::{Expense, core::get_expense},
    extract::PathParam,
};

/// The state needed to read a single expense.
#[derive(Debug, Clone)]
pub struct GetExpenseState {
    /// Whose expenses the caller may read.
    pub ledger_scope: LedgerScope,
    /// The database connection for reading expenses.
    pub db_connection: DbConnection,
}

impl FromRef<AppState> for GetExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            ledger_scope: state.ledger_scope,
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for reading a single expense.
pub async fn get_expense_endpoint(
    State(state): State<GetExpenseState>,
    claims: Claims,
    PathParam(expense_id): PathParam<ExpenseId>,
) -> Result<Json<Expense>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let expense = get_expense(expense_id, &connection)?;

    match state.ledger_scope.owner_filter(claims.user_id()) {
        Some(owner) if owner != expense.user_id => Err(Error::Forbidden),
        _ => Ok(Json(expense)),
    }
}
