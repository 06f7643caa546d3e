//! The API endpoints URIs.

/// The route to request a cup of coffee.
pub const COFFEE: &str = "/coffee";
/// The route for registering a new user.
pub const REGISTER: &str = "/register";
/// The route for logging in a user.
pub const LOG_IN: &str = "/login";
/// The route to create an expense or list the caller's expenses.
pub const EXPENSE: &str = "/expense";
/// The route to read or update a single expense.
pub const EXPENSE_BY_ID: &str = "/expense/{expense_id}";
/// The route to delete a single expense.
pub const DELETE_EXPENSE: &str = "/expenses/{expense_id}";
/// The route to query expenses by an explicit date range.
pub const EXPENSES: &str = "/expenses";
/// The route for the expenses of the previous calendar week.
pub const PAST_WEEK: &str = "/expense/week";
/// The route for the expenses of the previous calendar month.
pub const PAST_MONTH: &str = "/expense/month";
/// The route for the expenses of roughly the last three calendar months.
pub const PAST_QUARTER: &str = "/expense/last-3-month";
/// The route for the total of all expenses.
pub const TOTAL: &str = "/expense/total";
/// The route for the total of one calendar month across all years.
pub const MONTHLY_TOTAL: &str = "/expense/total/{month}";
/// The route to list every category.
pub const CATEGORIES: &str = "/categories";

/// Replace the parameter in `endpoint_path` with `value`.
///
/// A parameter is a string that starts with a left brace and ends with a
/// right brace. For example, in the endpoint path '/expense/{expense_id}',
/// '{expense_id}' is the parameter.
///
/// This function assumes that an endpoint path contains a single parameter.
/// If no parameter is found in `endpoint_path`, the function returns the
/// original `endpoint_path`.
#[cfg(test)]
pub fn format_endpoint(endpoint_path: &str, value: impl std::fmt::Display) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        value,
        &endpoint_path[param_end..]
    )
}
