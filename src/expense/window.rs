//! Date windows for filtering expenses.
//!
//! The preset windows are computed from "today" only and never include the
//! current, incomplete week or month.

use time::{Date, Duration, format_description::BorrowedFormatItem, macros::format_description};

use crate::{Error, expense::Expense};

/// Dates are exchanged as, e.g. "2024-03-15".
const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// The preset windows relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowPreset {
    /// Monday to Sunday of the previous calendar week.
    PreviousWeek,
    /// The whole of the previous calendar month.
    PreviousMonth,
    /// From the start of the month twelve weeks ago to the end of the previous month.
    ///
    /// This approximates the last three calendar months: when today is late
    /// in the month, twelve weeks back only reaches two whole months.
    TrailingQuarter,
}

/// An inclusive range of dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    /// The first date in the window.
    pub start: Date,
    /// The last date in the window.
    pub end: Date,
}

impl DateWindow {
    /// Create a window from `start` to `end`, inclusive.
    ///
    /// A window where `start` is after `end` is valid and contains no dates.
    pub fn new(start: Date, end: Date) -> Self {
        Self { start, end }
    }

    /// Compute the window for `preset` as seen on `today`.
    pub fn from_preset(preset: WindowPreset, today: Date) -> Self {
        match preset {
            WindowPreset::PreviousWeek => previous_week(today),
            WindowPreset::PreviousMonth => previous_month(today),
            WindowPreset::TrailingQuarter => trailing_quarter(today),
        }
    }

    /// Whether `date` falls within the window, inclusive of both ends.
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }

    /// Keep the expenses dated within the window.
    pub fn filter(&self, expenses: Vec<Expense>) -> Vec<Expense> {
        expenses
            .into_iter()
            .filter(|expense| self.contains(expense.date))
            .collect()
    }
}

/// Parse a date such as "2024-03-15".
///
/// # Errors
/// Returns [Error::InvalidDate] if `text` is not a valid date in that format.
pub fn parse_date(text: &str) -> Result<Date, Error> {
    Date::parse(text.trim(), DATE_FORMAT).map_err(|_| Error::InvalidDate(text.to_owned()))
}

fn previous_week(today: Date) -> DateWindow {
    let days_since_monday = i64::from(today.weekday().number_days_from_monday());
    let start_of_this_week = today - Duration::days(days_since_monday);

    DateWindow {
        start: start_of_this_week - Duration::weeks(1),
        end: start_of_this_week - Duration::days(1),
    }
}

fn previous_month(today: Date) -> DateWindow {
    let end = first_day_of_month(today) - Duration::days(1);

    DateWindow {
        start: first_day_of_month(end),
        end,
    }
}

fn trailing_quarter(today: Date) -> DateWindow {
    DateWindow {
        start: first_day_of_month(today - Duration::weeks(12)),
        end: first_day_of_month(today) - Duration::days(1),
    }
}

fn first_day_of_month(date: Date) -> Date {
    date - Duration::days(i64::from(date.day()) - 1)
}

#[cfg(test)]
mod window_tests {
    use time::macros::date;

    use crate::{
        Error,
        expense::window::{DateWindow, WindowPreset, parse_date},
    };

    fn window(preset: WindowPreset, today: time::Date) -> (time::Date, time::Date) {
        let window = DateWindow::from_preset(preset, today);
        (window.start, window.end)
    }

    #[test]
    fn previous_week_is_monday_to_sunday() {
        // Wednesday
        assert_eq!(
            window(WindowPreset::PreviousWeek, date!(2024 - 03 - 13)),
            (date!(2024 - 03 - 04), date!(2024 - 03 - 10))
        );
    }

    #[test]
    fn previous_week_on_monday_excludes_today() {
        assert_eq!(
            window(WindowPreset::PreviousWeek, date!(2024 - 03 - 11)),
            (date!(2024 - 03 - 04), date!(2024 - 03 - 10))
        );
    }

    #[test]
    fn previous_week_on_sunday_excludes_current_week() {
        assert_eq!(
            window(WindowPreset::PreviousWeek, date!(2024 - 03 - 17)),
            (date!(2024 - 03 - 04), date!(2024 - 03 - 10))
        );
    }

    #[test]
    fn previous_week_crosses_year_boundary() {
        assert_eq!(
            window(WindowPreset::PreviousWeek, date!(2025 - 01 - 02)),
            (date!(2024 - 12 - 23), date!(2024 - 12 - 29))
        );
    }

    #[test]
    fn previous_month_handles_leap_february() {
        assert_eq!(
            window(WindowPreset::PreviousMonth, date!(2024 - 03 - 13)),
            (date!(2024 - 02 - 01), date!(2024 - 02 - 29))
        );
    }

    #[test]
    fn previous_month_in_january_is_december() {
        assert_eq!(
            window(WindowPreset::PreviousMonth, date!(2024 - 01 - 01)),
            (date!(2023 - 12 - 01), date!(2023 - 12 - 31))
        );
    }

    #[test]
    fn trailing_quarter_starts_twelve_weeks_back() {
        assert_eq!(
            window(WindowPreset::TrailingQuarter, date!(2024 - 03 - 13)),
            (date!(2023 - 12 - 01), date!(2024 - 02 - 29))
        );
        assert_eq!(
            window(WindowPreset::TrailingQuarter, date!(2024 - 05 - 01)),
            (date!(2024 - 02 - 01), date!(2024 - 04 - 30))
        );
    }

    #[test]
    fn trailing_quarter_late_in_month_covers_two_months() {
        assert_eq!(
            window(WindowPreset::TrailingQuarter, date!(2024 - 05 - 31)),
            (date!(2024 - 03 - 01), date!(2024 - 04 - 30))
        );
    }

    #[test]
    fn presets_never_reach_today() {
        let mut today = date!(2023 - 01 - 01);

        while today < date!(2025 - 01 - 01) {
            for preset in [
                WindowPreset::PreviousWeek,
                WindowPreset::PreviousMonth,
                WindowPreset::TrailingQuarter,
            ] {
                let window = DateWindow::from_preset(preset, today);
                assert!(window.end < today, "{preset:?} on {today} reaches today");
                assert!(window.start <= window.end);
            }

            today = today.next_day().unwrap();
        }
    }

    #[test]
    fn window_is_inclusive() {
        let window = DateWindow::new(date!(2024 - 03 - 01), date!(2024 - 03 - 31));

        assert!(window.contains(date!(2024 - 03 - 01)));
        assert!(window.contains(date!(2024 - 03 - 31)));
        assert!(!window.contains(date!(2024 - 02 - 29)));
        assert!(!window.contains(date!(2024 - 04 - 01)));
    }

    #[test]
    fn reversed_window_is_empty() {
        let window = DateWindow::new(date!(2024 - 03 - 31), date!(2024 - 03 - 01));

        assert!(!window.contains(date!(2024 - 03 - 15)));
    }

    #[test]
    fn parse_date_accepts_iso_dates() {
        assert_eq!(parse_date("2024-03-15"), Ok(date!(2024 - 03 - 15)));
        assert_eq!(
            parse_date("15/03/2024"),
            Err(Error::InvalidDate("15/03/2024".to_owned()))
        );
        assert_eq!(
            parse_date("2024-02-30"),
            Err(Error::InvalidDate("2024-02-30".to_owned()))
        );
    }
}
