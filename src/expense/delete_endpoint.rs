use axum::{
    extract::{FromRef, State},
    http::StatusCode,
};

use crate::{
    AppState, Error,
    auth::Claims,
    database_id::ExpenseId,
    db::{DbConnection, lock_connection},
    expense::core::delete_expense,
    extract::PathParam,
};

/// The state needed to delete an expense.
#[derive(Debug, Clone)]
pub struct DeleteExpenseState {
    /// The database connection for managing expenses.
    pub db_connection: DbConnection,
}

impl FromRef<AppState> for DeleteExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting one of the caller's expenses, responds with
/// 204 No Content.
pub async fn delete_expense_endpoint(
    State(state): State<DeleteExpenseState>,
    claims: Claims,
    PathParam(expense_id): PathParam<ExpenseId>,
) -> Result<StatusCode, Error> {
    let connection = lock_connection(&state.db_connection)?;

    delete_expense(claims.user_id(), expense_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}
