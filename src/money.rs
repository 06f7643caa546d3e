//! Monetary amounts stored as integer minor units with a currency code.
//!
//! Amounts are written by clients as text with an optional currency symbol,
//! e.g. "$42", "$-3" or "12.50". Whole amounts are rendered without a
//! decimal part so that "$42" comes back exactly as it was sent.
//!
//! A single amount must fit into the 64-bit database column, but amounts are
//! held as 128-bit integers in memory so that sums of stored amounts are exact.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Error;

/// The currencies the ledger can be kept in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Currency {
    /// United States dollar.
    Usd,
    /// Euro.
    Eur,
    /// Pound sterling.
    Gbp,
    /// New Zealand dollar.
    Nzd,
}

impl Currency {
    const ALL: [Currency; 4] = [Currency::Nzd, Currency::Usd, Currency::Eur, Currency::Gbp];

    /// The ISO 4217 code, e.g. "USD".
    pub fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Nzd => "NZD",
        }
    }

    /// The symbol used as the prefix of formatted amounts.
    pub fn symbol(self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Gbp => "£",
            Currency::Nzd => "NZ$",
        }
    }

    /// Split a leading currency symbol off `text`.
    ///
    /// "NZ$" is checked before "$" so that New Zealand amounts are not read
    /// as US dollars.
    fn strip_symbol(text: &str) -> Option<(Currency, &str)> {
        Currency::ALL.into_iter().find_map(|currency| {
            text.strip_prefix(currency.symbol())
                .map(|rest| (currency, rest))
        })
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        Currency::ALL
            .into_iter()
            .find(|currency| currency.code().eq_ignore_ascii_case(code))
            .ok_or_else(|| format!("unsupported currency \"{code}\""))
    }
}

impl ToSql for Currency {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.code()))
    }
}

impl FromSql for Currency {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: String| FromSqlError::Other(error.into()))
    }
}

/// The number of minor units in one major unit for every supported currency.
const MINOR_UNITS_PER_MAJOR: i128 = 100;

/// An amount of money, e.g. $42.50 is `Money { minor_units: 4250, currency: Currency::Usd }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Money {
    /// The amount in cents (or the currency's equivalent).
    pub minor_units: i128,
    /// The currency the amount is in.
    pub currency: Currency,
}

impl Money {
    /// Create an amount from minor units, e.g. cents.
    pub fn new(minor_units: i128, currency: Currency) -> Self {
        Self {
            minor_units,
            currency,
        }
    }

    /// Zero in `currency`.
    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    /// Parse `text` as an amount in `currency`.
    ///
    /// The currency symbol is optional, and the sign may come before or after
    /// it ("-$3" and "$-3" are both accepted). Up to two decimal places are
    /// allowed.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidAmount] if `text` is not a number, has more than
    /// two decimal places, has more than 64 bits worth of minor units, or
    /// carries the symbol of a different currency.
    pub fn parse(text: &str, currency: Currency) -> Result<Self, Error> {
        let invalid = || Error::InvalidAmount(text.to_owned());

        let trimmed = text.trim();
        let (leading_minus, rest) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let rest = match Currency::strip_symbol(rest) {
            Some((symbol_currency, rest)) if symbol_currency == currency => rest,
            Some(_) => return Err(invalid()),
            None => rest,
        };

        let (inner_minus, rest) = match rest.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, rest),
        };

        if leading_minus && inner_minus {
            return Err(invalid());
        }

        let (whole, fraction) = match rest.split_once('.') {
            Some((_, "")) => return Err(invalid()),
            Some((whole, fraction)) => (whole, fraction),
            None => (rest, ""),
        };

        let is_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
        if whole.is_empty() || !is_digits(whole) || !is_digits(fraction) || fraction.len() > 2 {
            return Err(invalid());
        }

        let whole: i128 = whole.parse().map_err(|_| invalid())?;
        let fraction: i128 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i128>().map_err(|_| invalid())? * 10,
            _ => fraction.parse().map_err(|_| invalid())?,
        };

        let magnitude = whole
            .checked_mul(MINOR_UNITS_PER_MAJOR)
            .and_then(|minor| minor.checked_add(fraction))
            .filter(|&minor| minor <= i128::from(i64::MAX))
            .ok_or_else(invalid)?;

        let minor_units = if leading_minus || inner_minus {
            -magnitude
        } else {
            magnitude
        };

        Ok(Self::new(minor_units, currency))
    }

    /// The minor units as they are stored in the database.
    ///
    /// # Errors
    ///
    /// Returns [Error::AmountOverflow] if the amount does not fit into 64 bits,
    /// which only a sum of amounts can reach.
    pub fn stored_minor_units(self) -> Result<i64, Error> {
        i64::try_from(self.minor_units).map_err(|_| Error::AmountOverflow)
    }

    /// Add two amounts of the same currency.
    ///
    /// # Errors
    ///
    /// Returns [Error::CurrencyMismatch] if the currencies differ, or
    /// [Error::AmountOverflow] if the sum does not fit into 128 bits.
    pub fn checked_add(self, other: Money) -> Result<Money, Error> {
        if self.currency != other.currency {
            return Err(Error::CurrencyMismatch(
                other.to_string(),
                self.to_string(),
            ));
        }

        self.minor_units
            .checked_add(other.minor_units)
            .map(|minor_units| Money::new(minor_units, self.currency))
            .ok_or(Error::AmountOverflow)
    }

    /// Sum `amounts`, starting from zero in `currency`.
    ///
    /// # Errors
    ///
    /// See [Money::checked_add].
    pub fn sum<'a>(
        amounts: impl IntoIterator<Item = &'a Money>,
        currency: Currency,
    ) -> Result<Money, Error> {
        amounts
            .into_iter()
            .try_fold(Money::zero(currency), |total, amount| {
                total.checked_add(*amount)
            })
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.minor_units < 0 { "-" } else { "" };
        let magnitude = self.minor_units.unsigned_abs();
        let per_major = MINOR_UNITS_PER_MAJOR.unsigned_abs();
        let whole = magnitude / per_major;
        let fraction = magnitude % per_major;

        write!(f, "{}{sign}{whole}", self.currency.symbol())?;

        if fraction != 0 {
            write!(f, ".{fraction:02}")?;
        }

        Ok(())
    }
}

impl FromStr for Money {
    type Err = Error;

    /// Parse an amount whose currency is given by its symbol, e.g. "€12.50".
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let unsigned = text.trim().trim_start_matches('-');

        match Currency::strip_symbol(unsigned) {
            Some((currency, _)) => Money::parse(text, currency),
            None => Err(Error::InvalidAmount(text.to_owned())),
        }
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
