//! Amount and Balance types
//!
//! Domain primitives for asset quantities. An `Amount` is what a mutation
//! moves and is always strictly positive; a `Balance` is what a wallet holds
//! and is never negative.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest quantity a single mutation may move (one trillion units)
const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Maximum decimal places (8)
const MAX_SCALE: u32 = 8;

/// Amount represents a validated, strictly positive asset quantity.
///
/// # Invariants
/// - Value is always positive (> 0)
/// - Maximum 8 decimal places
/// - Maximum value is one trillion
///
/// # Example
/// ```
/// use rust_decimal::Decimal;
/// use marketplace_wallet::domain::Amount;
///
/// let amount = Amount::new(Decimal::new(10, 0)).unwrap();
/// assert_eq!(amount.value(), Decimal::new(10, 0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

/// Errors that can occur when creating an Amount or Balance
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("amount must be positive (got {0})")]
    NotPositive(String),

    #[error("balance cannot be negative (got {0})")]
    Negative(Decimal),

    #[error("amount has too many decimal places (max {MAX_SCALE}, got {0})")]
    TooManyDecimals(u32),

    #[error("amount exceeds maximum allowed value ({MAX_AMOUNT})")]
    Overflow,

    #[error("amount is not a number: {0}")]
    ParseError(String),
}

impl Amount {
    /// Create a new Amount with validation.
    ///
    /// # Errors
    /// - `AmountError::NotPositive` if value <= 0
    /// - `AmountError::TooManyDecimals` if more than 8 decimal places
    /// - `AmountError::Overflow` if value > one trillion
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value <= Decimal::ZERO {
            return Err(AmountError::NotPositive(value.to_string()));
        }

        let value = value.normalize();
        if value.scale() > MAX_SCALE {
            return Err(AmountError::TooManyDecimals(value.scale()));
        }

        if value > MAX_AMOUNT {
            return Err(AmountError::Overflow);
        }

        Ok(Self(value))
    }

    /// Create an Amount from an integer (no decimal places).
    pub fn from_integer(value: i64) -> Result<Self, AmountError> {
        Self::new(Decimal::from(value))
    }

    /// Get the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Parse the text of a JSON number, which may use exponent notation (`1e-7`).
    pub fn from_json_number(text: &str) -> Result<Self, AmountError> {
        let decimal = Decimal::from_str(text)
            .or_else(|_| Decimal::from_scientific(text))
            .map_err(|_| out_of_range(text))?;
        Amount::new(decimal)
    }
}

/// Plain decimal literal: optional minus sign, digits, optional fraction.
fn is_plain_decimal(s: &str) -> bool {
    let unsigned = s.strip_prefix('-').unwrap_or(s);
    let (int, frac) = match unsigned.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (unsigned, None),
    };
    let digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    digits(int) && frac.map_or(true, digits)
}

/// Classify a well-formed number that `Decimal` cannot represent.
fn out_of_range(text: &str) -> AmountError {
    match text.parse::<f64>() {
        Ok(v) if v <= 0.0 => AmountError::NotPositive(text.to_string()),
        Ok(v) if v.abs() < 1.0 => AmountError::TooManyDecimals((-v.log10()).ceil() as u32),
        Ok(_) => AmountError::Overflow,
        Err(e) => AmountError::ParseError(e.to_string()),
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    /// Accepts only plain decimal literals such as `10`, `-3` or `0.25`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if !is_plain_decimal(trimmed) {
            return Err(AmountError::ParseError(format!("'{}' is not a decimal literal", trimmed)));
        }
        let decimal = Decimal::from_str(trimmed).map_err(|_| out_of_range(trimmed))?;
        Amount::new(decimal)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

/// Balance is the quantity of one asset held by a wallet.
/// Unlike Amount, Balance can be zero, and it has no upper cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Balance(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Balance {
    /// Create a new balance (zero or positive)
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value < Decimal::ZERO {
            return Err(AmountError::Negative(value));
        }

        Ok(Self(value.normalize()))
    }

    /// Create a zero balance
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Get the underlying value
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Check if balance covers the given amount
    pub fn is_sufficient_for(&self, amount: &Amount) -> bool {
        self.0 >= amount.value()
    }

    /// Balance after adding `amount`.
    ///
    /// Saturates at `Decimal::MAX` (about 7.9e28), which at one trillion per
    /// credit is out of reach.
    pub fn credit(&self, amount: &Amount) -> Balance {
        Self(self.0.saturating_add(amount.value()).normalize())
    }

    /// Balance after removing `amount`; fails rather than going negative
    pub fn debit(&self, amount: &Amount) -> Result<Balance, AmountError> {
        Balance::new(self.0 - amount.value())
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for Balance {
    fn default() -> Self {
        Self::zero()
    }
}
