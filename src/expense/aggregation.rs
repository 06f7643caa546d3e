//! Sums of expense amounts, overall and per calendar month.

use serde::Serialize;
use time::Month;

use crate::{
    Error,
    expense::Expense,
    money::{Currency, Money},
};

/// The total spent in one calendar month, across every year on record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTotal {
    /// The month number, 1 for January through 12 for December.
    pub month: u8,
    /// The names of the months of the expenses that were summed.
    ///
    /// Empty when no expense fell in the month.
    pub month_names: Vec<String>,
    /// The sum of the amounts.
    pub total: Money,
    /// A sentence describing the total, e.g. "Total expense for March: $150".
    pub summary: String,
}

/// Sum the amounts of `expenses`.
///
/// # Errors
/// Returns [Error::CurrencyMismatch] if an expense is not in `currency`.
pub fn total(expenses: &[Expense], currency: Currency) -> Result<Money, Error> {
    Money::sum(expenses.iter().map(|expense| &expense.amount), currency)
}

/// Sum the amounts of `expenses` dated in `month` of any year.
///
/// # Errors
/// See [total].
pub fn total_by_calendar_month(
    expenses: &[Expense],
    month: Month,
    currency: Currency,
) -> Result<MonthlyTotal, Error> {
    let mut month_names: Vec<String> = Vec::new();
    let mut sum = Money::zero(currency);

    for expense in expenses.iter().filter(|expense| expense.date.month() == month) {
        sum = sum.checked_add(expense.amount)?;

        let name = expense.date.month().to_string();
        if !month_names.contains(&name) {
            month_names.push(name);
        }
    }

    Ok(MonthlyTotal {
        month: month as u8,
        month_names,
        total: sum,
        summary: format!("Total expense for {month}: {sum}"),
    })
}

/// Parse a month number such as "3" or "03".
///
/// # Errors
/// Returns [Error::InvalidMonth] if `text` is not a number from 1 to 12.
pub fn parse_month(text: &str) -> Result<Month, Error> {
    text.trim()
        .parse::<u8>()
        .ok()
        .and_then(|number| Month::try_from(number).ok())
        .ok_or_else(|| Error::InvalidMonth(text.to_owned()))
}
