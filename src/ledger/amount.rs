use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Number of fractional decimal places carried by the native currency
pub const DECIMALS: usize = 18;

/// Base units in one whole unit of currency (10^18)
pub const BASE_UNITS_PER_COIN: u128 = 1_000_000_000_000_000_000;

/// Error raised when a decimal amount string cannot be parsed
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseAmountError {
    #[error("Amount string is empty")]
    Empty,

    #[error("Invalid digit in amount: {0}")]
    InvalidDigit(String),

    #[error("Amount has more than 18 fractional digits: {0}")]
    TooPrecise(String),

    #[error("Amount does not fit in 128 bits: {0}")]
    Overflow(String),
}

/// A monetary amount in integer base units (18 decimals).
///
/// Whole-unit decimal strings like `"1.5"` parse exactly; there is no
/// floating point anywhere in the conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(u128);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn from_base_units(units: u128) -> Self {
        Amount(units)
    }

    /// Whole units of currency, e.g. `Amount::from_coins(10)` is the airline fee
    pub const fn from_coins(coins: u64) -> Self {
        Amount(coins as u128 * BASE_UNITS_PER_COIN)
    }

    pub const fn base_units(self) -> u128 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Amount)
    }

    pub fn saturating_sub(self, other: Amount) -> Amount {
        Amount(self.0.saturating_sub(other.0))
    }

    /// Multiply by `numerator / denominator`, rounding down to the nearest base unit
    pub fn checked_mul_ratio(self, numerator: u128, denominator: u128) -> Option<Amount> {
        if denominator == 0 {
            return None;
        }
        self.0
            .checked_mul(numerator)
            .map(|scaled| Amount(scaled / denominator))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / BASE_UNITS_PER_COIN;
        let fraction = self.0 % BASE_UNITS_PER_COIN;
        if fraction == 0 {
            return write!(f, "{}", whole);
        }
        let digits = format!("{:0width$}", fraction, width = DECIMALS);
        write!(f, "{}.{}", whole, digits.trim_end_matches('0'))
    }
}

impl FromStr for Amount {
    type Err = ParseAmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseAmountError::Empty);
        }

        let (whole, fraction) = match s.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (s, ""),
        };

        if fraction.len() > DECIMALS {
            return Err(ParseAmountError::TooPrecise(s.to_string()));
        }
        if whole.is_empty() && fraction.is_empty() {
            return Err(ParseAmountError::Empty);
        }
        let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if !all_digits(whole) || !all_digits(fraction) {
            return Err(ParseAmountError::InvalidDigit(s.to_string()));
        }

        let overflow = || ParseAmountError::Overflow(s.to_string());
        let whole_units: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| overflow())?
        };
        let padded = format!("{:0<width$}", fraction, width = DECIMALS);
        let fraction_units: u128 = padded.parse().map_err(|_| overflow())?;

        whole_units
            .checked_mul(BASE_UNITS_PER_COIN)
            .and_then(|units| units.checked_add(fraction_units))
            .map(Amount)
            .ok_or_else(overflow)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a decimal amount in whole units, e.g. \"1.5\" or 10")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
        Ok(Amount::from_coins(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
        u64::try_from(v)
            .map(Amount::from_coins)
            .map_err(|_| E::custom(format!("negative amount: {}", v)))
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }
}
