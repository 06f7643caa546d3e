//! Application router configuration.

use axum::{
    Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};

use crate::{
    AppState, Error,
    category::get_categories_endpoint,
    endpoints,
    expense::{
        create_expense_endpoint, delete_expense_endpoint, edit_expense_endpoint,
        get_expense_endpoint, get_expenses_endpoint, get_monthly_total_endpoint,
        get_past_month_endpoint, get_past_quarter_endpoint, get_past_week_endpoint,
        get_total_endpoint, query_range_endpoint,
    },
    log_in::post_log_in,
    logging::logging_middleware,
    register_user::register_user,
};

/// Return a router with all the app's routes.
///
/// Every route except registration, log in and coffee expects a bearer token,
/// which is checked by the `Claims` argument of each handler.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::COFFEE, get(get_coffee))
        .route(endpoints::REGISTER, post(register_user))
        .route(endpoints::LOG_IN, post(post_log_in));

    let protected_routes = Router::new()
        .route(
            endpoints::EXPENSE,
            get(get_expenses_endpoint).post(create_expense_endpoint),
        )
        .route(
            endpoints::EXPENSE_BY_ID,
            get(get_expense_endpoint).put(edit_expense_endpoint),
        )
        .route(endpoints::DELETE_EXPENSE, delete(delete_expense_endpoint))
        .route(endpoints::EXPENSES, post(query_range_endpoint))
        .route(endpoints::PAST_WEEK, get(get_past_week_endpoint))
        .route(endpoints::PAST_MONTH, get(get_past_month_endpoint))
        .route(endpoints::PAST_QUARTER, get(get_past_quarter_endpoint))
        .route(endpoints::TOTAL, get(get_total_endpoint))
        .route(endpoints::MONTHLY_TOTAL, get(get_monthly_total_endpoint))
        .route(endpoints::CATEGORIES, get(get_categories_endpoint));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}

/// Attempt to get a cup of coffee from the server.
async fn get_coffee() -> Response {
    (StatusCode::IM_A_TEAPOT, "I'm a teapot").into_response()
}

async fn get_404_not_found() -> Response {
    Error::NotFound.into_response()
}
