//! Expense management for the expense tracker.
//!
//! This module contains everything related to expenses:
//! - The `Expense` model and the database functions for storing and changing expenses
//! - Date windows and sums over a snapshot of the ledger
//! - Route handlers for the expense endpoints

mod aggregation;
mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod get_endpoint;
mod query_endpoints;
mod window;

pub use self::core::{Expense, create_expense_table};
pub use create_endpoint::create_expense_endpoint;
pub use delete_endpoint::delete_expense_endpoint;
pub use edit_endpoint::edit_expense_endpoint;
pub use get_endpoint::get_expense_endpoint;
pub use query_endpoints::{
    get_expenses_endpoint, get_monthly_total_endpoint, get_past_month_endpoint,
    get_past_quarter_endpoint, get_past_week_endpoint, get_total_endpoint,
    query_range_endpoint,
};
