//! Monetary amounts as sent to the gateway.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{BuckarooError, Result};

/// Decimal amount, rendered with exactly two decimals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(Decimal);

impl Amount {
    /// Wrap a decimal value.
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Amount in whole cents.
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Returns true if the amount is greater than zero.
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// The underlying decimal.
    pub fn to_decimal(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Amount {
    type Err = BuckarooError;

    fn from_str(s: &str) -> Result<Self> {
        Decimal::from_str(s.trim())
            .map(Self)
            .map_err(|e| BuckarooError::invalid_argument("amount", format!("{} ({})", s, e)))
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_decimals() {
        assert_eq!("42".parse::<Amount>().unwrap().to_string(), "42.00");
        assert_eq!("12.34".parse::<Amount>().unwrap().to_string(), "12.34");
        assert_eq!("10.5".parse::<Amount>().unwrap().to_string(), "10.50");
        assert_eq!(Amount::from_cents(1999).to_string(), "19.99");
    }

    #[test]
    fn test_positive() {
        assert!("0.01".parse::<Amount>().unwrap().is_positive());
        assert!(!"0".parse::<Amount>().unwrap().is_positive());
        assert!(!"-10".parse::<Amount>().unwrap().is_positive());
    }

    #[test]
    fn test_invalid_amount() {
        let err = "ten".parse::<Amount>().unwrap_err();
        assert!(err.to_string().contains("amount"));
    }
}
