//! Human-readable currency amount parsing.
//!
//! This module provides [`MoneyAmount`], a type for parsing human-readable
//! currency strings into precise decimal values suitable for conversion to
//! on-chain token amounts.
//!
//! # Supported Formats
//!
//! - Plain numbers: `"100"`, `"0.01"`
//! - With currency symbols: `"$10.50"`
//! - With thousand separators: `"1,000"`, `"1,000,000.50"`
//!
//! # Example
//!
//! ```rust
//! use r402::amount::MoneyAmount;
//!
//! let amount = MoneyAmount::parse("$10.50").unwrap();
//! assert_eq!(amount.scale(), 2);
//! assert_eq!(amount.mantissa(), 1050);
//! ```

use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use std::fmt;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::LazyLock;

/// A parsed monetary amount with decimal precision.
///
/// This type represents a non-negative decimal value parsed from a
/// human-readable string. It preserves the original precision, which
/// is important when converting to token amounts with specific decimal places.
#[derive(Debug, Clone, PartialEq)]
pub struct MoneyAmount(pub Decimal);

impl MoneyAmount {
    /// Returns the number of decimal places in the original input.
    ///
    /// Used to verify that the input precision doesn't exceed a token's
    /// decimal places.
    #[must_use]
    pub fn scale(&self) -> u32 {
        self.0.scale()
    }

    /// Returns the value as an unsigned integer, ignoring the decimal point.
    ///
    /// For example, `"12.34"` returns `1234`.
    #[must_use]
    pub fn mantissa(&self) -> u128 {
        self.0.mantissa().unsigned_abs()
    }
}

/// Errors that can occur when parsing a monetary amount.
#[derive(Debug, thiserror::Error)]
pub enum MoneyAmountParseError {
    /// The input string could not be parsed as a number.
    #[error("invalid number format")]
    InvalidFormat,
    /// The value is outside the allowed range.
    #[error("amount must be between {} and {}", limits::MIN_STR, limits::MAX_STR)]
    OutOfRange,
    /// Negative values are not allowed.
    #[error("negative value is not allowed")]
    Negative,
    /// The input has more decimal places than the token supports.
    #[error("too much precision: {money} decimal places vs {token} supported by token")]
    WrongPrecision {
        /// Decimal places in the input.
        money: u32,
        /// Decimal places supported by the token.
        token: u32,
    },
}

mod limits {
    use super::{Decimal, FromStr, LazyLock};

    pub const MIN_STR: &str = "0.000000001";
    pub const MAX_STR: &str = "999999999";

    pub static MIN: LazyLock<Decimal> =
        LazyLock::new(|| Decimal::from_str(MIN_STR).expect("valid decimal"));
    pub static MAX: LazyLock<Decimal> =
        LazyLock::new(|| Decimal::from_str(MAX_STR).expect("valid decimal"));
}

static STRIP_NON_NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\d\.\-]+").expect("valid regex"));

impl MoneyAmount {
    /// Parses a human-readable currency string into a [`MoneyAmount`].
    ///
    /// Currency symbols, thousand separators, and whitespace are stripped
    /// before parsing. The result must be a non-negative number within the
    /// allowed range.
    ///
    /// # Errors
    ///
    /// Returns an error if the string cannot be parsed as a number, is
    /// negative, or falls outside the allowed range.
    pub fn parse(input: &str) -> Result<Self, MoneyAmountParseError> {
        let cleaned = STRIP_NON_NUMERIC.replace_all(input, "").to_string();
        let parsed = Decimal::from_str(&cleaned).map_err(|_| MoneyAmountParseError::InvalidFormat)?;

        if parsed.is_sign_negative() {
            return Err(MoneyAmountParseError::Negative);
        }
        if parsed < *limits::MIN || parsed > *limits::MAX {
            return Err(MoneyAmountParseError::OutOfRange);
        }
        Ok(Self(parsed))
    }

    /// Converts this amount into an atomic token amount, checking that the
    /// input precision does not exceed `token_decimals`.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyAmountParseError::WrongPrecision`] if the input has more
    /// decimal places than `token_decimals` supports.
    pub fn to_atomic(&self, token_decimals: u32) -> Result<u128, MoneyAmountParseError> {
        if self.scale() > token_decimals {
            return Err(MoneyAmountParseError::WrongPrecision {
                money: self.scale(),
                token: token_decimals,
            });
        }
        let scale_diff = token_decimals - self.scale();
        Ok(self.mantissa() * 10u128.pow(scale_diff))
    }
}

impl FromStr for MoneyAmount {
    type Err = MoneyAmountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for MoneyAmount {
    type Error = MoneyAmountParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::from_str(value)
    }
}

impl From<u128> for MoneyAmount {
    fn from(value: u128) -> Self {
        Self(Decimal::from(value))
    }
}

impl TryFrom<f64> for MoneyAmount {
    type Error = MoneyAmountParseError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        let decimal = Decimal::from_f64(value).ok_or(MoneyAmountParseError::OutOfRange)?;
        if decimal.is_sign_negative() {
            return Err(MoneyAmountParseError::Negative);
        }
        if decimal < *limits::MIN || decimal > *limits::MAX {
            return Err(MoneyAmountParseError::OutOfRange);
        }
        Ok(Self(decimal))
    }
}

impl Display for MoneyAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_whole_numbers() {
        let amount = MoneyAmount::parse("100").unwrap();
        assert_eq!(amount.scale(), 0);
        assert_eq!(amount.mantissa(), 100);
    }

    #[test]
    fn parses_decimals() {
        let amount = MoneyAmount::parse("0.01").unwrap();
        assert_eq!(amount.scale(), 2);
        assert_eq!(amount.mantissa(), 1);
    }

    #[test]
    fn strips_currency_symbol() {
        let amount = MoneyAmount::parse("$10.50").unwrap();
        assert_eq!(amount.scale(), 2);
        assert_eq!(amount.mantissa(), 1050);
    }

    #[test]
    fn strips_thousand_separators() {
        let amount = MoneyAmount::parse("1,000.50").unwrap();
        assert_eq!(amount.scale(), 2);
        assert_eq!(amount.mantissa(), 100050);
    }

    #[test]
    fn rejects_negative() {
        assert!(matches!(
            MoneyAmount::parse("-1"),
            Err(MoneyAmountParseError::Negative)
        ));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            MoneyAmount::parse("not a number"),
            Err(MoneyAmountParseError::InvalidFormat)
        ));
    }

    #[test]
    fn to_atomic_scales_up() {
        let amount = MoneyAmount::parse("0.01").unwrap();
        assert_eq!(amount.to_atomic(6).unwrap(), 10_000);
    }

    #[test]
    fn to_atomic_rejects_excess_precision() {
        let amount = MoneyAmount::parse("0.0000001").unwrap();
        assert!(matches!(
            amount.to_atomic(6),
            Err(MoneyAmountParseError::WrongPrecision {
                money: 7,
                token: 6
            })
        ));
    }
}
