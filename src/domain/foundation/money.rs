//! Exact decimal money amounts.
//!
//! Amounts are `NUMERIC(10,2)` in the database: at most two fraction digits
//! and eight integer digits. Arithmetic never goes through binary floating
//! point.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of fraction digits carried by every amount.
pub const MONEY_SCALE: u32 = 2;

/// Largest representable magnitude: 99,999,999.99.
const MAX_MINOR_UNITS: i64 = 9_999_999_999;

/// Errors raised when constructing or combining amounts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    #[error("Amount '{0}' is not a decimal number")]
    NotANumber(String),

    #[error("Amount {0} has more than 2 fraction digits")]
    TooPrecise(String),

    #[error("Amount {0} exceeds the maximum of 99999999.99")]
    OutOfRange(String),
}

/// A monetary amount with exactly two fraction digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Money(Decimal);

impl Money {
    /// The zero amount, `0.00`.
    pub fn zero() -> Self {
        Self(Decimal::new(0, MONEY_SCALE))
    }

    /// Upper bound of the representable range.
    pub fn max() -> Self {
        Self(Decimal::new(MAX_MINOR_UNITS, MONEY_SCALE))
    }

    /// Parses a decimal string such as `"25.00"`, `"10.1"` or `"1e2"`.
    ///
    /// # Errors
    ///
    /// - `NotANumber` if the text is not a decimal literal
    /// - `TooPrecise` if it carries significant digits past the cents
    /// - `OutOfRange` if the magnitude exceeds 99,999,999.99
    pub fn parse(text: &str) -> Result<Self, MoneyError> {
        let trimmed = text.trim();
        let value = Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map_err(|_| MoneyError::NotANumber(text.to_string()))?;
        Self::try_from(value)
    }

    /// Returns the underlying decimal.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Adds two amounts, failing if the sum leaves the representable range.
    pub fn checked_add(self, other: Money) -> Result<Money, MoneyError> {
        let sum = self
            .0
            .checked_add(other.0)
            .ok_or_else(|| MoneyError::OutOfRange(format!("{} + {}", self, other)))?;
        Money::try_from(sum)
    }
}

impl TryFrom<Decimal> for Money {
    type Error = MoneyError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        if value.normalize().scale() > MONEY_SCALE {
            return Err(MoneyError::TooPrecise(value.to_string()));
        }
        if value.abs() > Money::max().0 {
            return Err(MoneyError::OutOfRange(value.to_string()));
        }
        let mut scaled = value;
        scaled.rescale(MONEY_SCALE);
        Ok(Self(scaled))
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse(s)
    }
}

impl TryFrom<String> for Money {
    type Error = MoneyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Money::parse(&value)
    }
}

impl From<Money> for String {
    fn from(money: Money) -> Self {
        money.to_string()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
