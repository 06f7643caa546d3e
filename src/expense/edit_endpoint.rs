use axum::{
    Json,
    extract::{FromRef, State},
};
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::Claims,
    database_id::ExpenseId,
    db::{DbConnection, lock_connection},
    expense::{
        Expense,
        core::{AmountField, required_amount, update_expense},
    },
    extract::{JsonBody, PathParam, required},
    money::Currency,
};

/// The state needed to edit an expense.
#[derive(Debug, Clone)]
pub struct EditExpenseState {
    /// The currency amounts are parsed in.
    pub currency: Currency,
    /// The database connection for managing expenses.
    pub db_connection: DbConnection,
}

impl FromRef<AppState> for EditExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            currency: state.currency,
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The body of a request to edit an expense.
#[derive(Debug, Deserialize)]
pub struct EditExpenseRequest {
    /// The new description.
    pub description: Option<String>,
    /// The new amount, e.g. "$42".
    pub amount: Option<AmountField>,
}

/// A route handler for changing the description and amount of one of the
/// caller's expenses.
///
/// The body is validated before the expense is looked up, so a malformed
/// request is a 400 even if the expense does not exist.
pub async fn edit_expense_endpoint(
    State(state): State<EditExpenseState>,
    claims: Claims,
    PathParam(expense_id): PathParam<ExpenseId>,
    JsonBody(request): JsonBody<EditExpenseRequest>,
) -> Result<Json<Expense>, Error> {
    let description = required(request.description, "description")?;
    let amount = required_amount(request.amount, state.currency)?;

    let connection = lock_connection(&state.db_connection)?;

    update_expense(
        claims.user_id(),
        expense_id,
        description,
        amount,
        &connection,
    )
    .map(Json)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;

    use crate::{
        endpoints::{self, format_endpoint},
        expense::Expense,
        test_utils::{register, test_server, test_state},
    };

    async fn add_expense(server: &TestServer, token: &str) -> Expense {
        server
            .post(endpoints::EXPENSE)
            .authorization_bearer(token)
            .json(&json!({
                "description": "Lunch",
                "amount": "$12",
                "category": "Food",
                "date": "2024-03-15",
            }))
            .await
            .json()
    }

    #[tokio::test]
    async fn edit_changes_description_and_amount() {
        let server = test_server(test_state());
        let token = register(&server, "alice@example.com").await;
        let expense = add_expense(&server, &token).await;

        let updated = server
            .put(&format_endpoint(endpoints::EXPENSE_BY_ID, expense.id))
            .authorization_bearer(&token)
            .json(&json!({ "description": "Dinner", "amount": "$30.50" }))
            .await
            .json::<Expense>();

        assert_eq!(updated.id, expense.id);
        assert_eq!(updated.description, "Dinner");
        assert_eq!(updated.amount.to_string(), "$30.50");
        assert_eq!(updated.date, expense.date);
        assert_eq!(updated.category, expense.category);
    }

    #[tokio::test]
    async fn edit_by_non_owner_is_forbidden() {
        let server = test_server(test_state());
        let alice = register(&server, "alice@example.com").await;
        let bob = register(&server, "bob@example.com").await;
        let expense = add_expense(&server, &alice).await;
        let path = format_endpoint(endpoints::EXPENSE_BY_ID, expense.id);

        server
            .put(&path)
            .authorization_bearer(&bob)
            .json(&json!({ "description": "Mine now", "amount": "$0" }))
            .await
            .assert_status(StatusCode::FORBIDDEN);

        let unchanged = server
            .get(&path)
            .authorization_bearer(&alice)
            .await
            .json::<Expense>();
        assert_eq!(unchanged, expense);
    }

    #[tokio::test]
    async fn edit_missing_expense_is_not_found() {
        let server = test_server(test_state());
        let token = register(&server, "alice@example.com").await;

        server
            .put(&format_endpoint(endpoints::EXPENSE_BY_ID, 999))
            .authorization_bearer(&token)
            .json(&json!({ "description": "Dinner", "amount": "$30" }))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn edit_with_invalid_body_is_bad_request() {
        let server = test_server(test_state());
        let token = register(&server, "alice@example.com").await;
        let expense = add_expense(&server, &token).await;
        let path = format_endpoint(endpoints::EXPENSE_BY_ID, expense.id);

        for body in [
            json!({ "amount": "$30" }),
            json!({ "description": "Dinner" }),
            json!({ "description": "Dinner", "amount": "thirty" }),
        ] {
            server
                .put(&path)
                .authorization_bearer(&token)
                .json(&body)
                .await
                .assert_status(StatusCode::BAD_REQUEST);
        }
    }
}
