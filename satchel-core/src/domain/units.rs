//! Base-unit amounts and ether decimal conversion
//!
//! Balances and transfer amounts are carried as integer wei. Decimal strings
//! only exist at the input and display boundary.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::result::{Error, Result};

/// Number of fractional digits in one ether
pub const ETHER_DECIMALS: u32 = 18;

/// 10^18
pub const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;

/// An amount of the native currency in its smallest unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Wei(u128);

impl Wei {
    pub const ZERO: Wei = Wei(0);

    pub fn new(value: u128) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u128 {
        self.0
    }

    pub fn checked_sub(self, other: Wei) -> Option<Wei> {
        self.0.checked_sub(other.0).map(Wei)
    }

    /// Format as an ether decimal string such as `"1.5"`
    pub fn to_ether_string(&self) -> String {
        format_ether(*self)
    }
}

impl From<u128> for Wei {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

impl fmt::Display for Wei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Wei {
    type Err = Error;

    /// Parses a base-10 integer wei string
    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<u128>()
            .map(Wei)
            .map_err(|e| Error::validation(format!("invalid wei amount '{}': {}", s, e)))
    }
}

// Serialized as a decimal string: JSON numbers lose precision above 2^53.
impl Serialize for Wei {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Wei {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

fn amount_shape() -> &'static Regex {
    static SHAPE: OnceLock<Regex> = OnceLock::new();
    SHAPE.get_or_init(|| Regex::new(r"^(\d+\.?\d*|\.\d+)$").expect("valid amount regex"))
}

/// Convert a decimal ether string to wei
///
/// Accepts plain decimal notation only: no sign, exponent or digit
/// separators. Trailing fractional zeros are ignored; more than 18
/// significant fractional digits is rejected rather than truncated.
pub fn parse_ether(input: &str) -> Result<Wei> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("amount cannot be empty"));
    }
    if !amount_shape().is_match(trimmed) {
        return Err(Error::validation(format!(
            "invalid amount '{}': expected a decimal number such as 0.5",
            trimmed
        )));
    }

    // Trailing fractional zeros carry no value
    let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));
    let fraction = fraction.trim_end_matches('0');
    if fraction.len() > ETHER_DECIMALS as usize {
        return Err(Error::validation(format!(
            "invalid amount '{}': more than {} decimal places",
            trimmed, ETHER_DECIMALS
        )));
    }

    let whole = if whole.is_empty() { "0" } else { whole };
    let normalized = if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{}.{}", whole, fraction)
    };

    let value = Decimal::from_str_exact(&normalized)
        .map_err(|_| {
            Error::validation(format!("amount '{}' has too many significant digits", trimmed))
        })?
        .normalize();

    let mantissa = u128::try_from(value.mantissa())
        .map_err(|_| Error::validation(format!("invalid amount '{}'", trimmed)))?;
    let factor = 10u128.pow(ETHER_DECIMALS - value.scale());

    mantissa
        .checked_mul(factor)
        .map(Wei)
        .ok_or_else(|| Error::validation(format!("amount '{}' is too large", trimmed)))
}

/// Format wei as an ether decimal string
///
/// Trailing fractional zeros are dropped but one fractional digit is always
/// kept, so two ether formats as `"2.0"`.
pub fn format_ether(amount: Wei) -> String {
    let whole = amount.0 / WEI_PER_ETHER;
    let fraction = amount.0 % WEI_PER_ETHER;

    let digits = format!("{:018}", fraction);
    let trimmed = digits.trim_end_matches('0');
    let fraction_str = if trimmed.is_empty() { "0" } else { trimmed };

    format!("{}.{}", whole, fraction_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_whole_and_fractional() {
        assert_eq!(parse_ether("1").unwrap(), Wei::new(WEI_PER_ETHER));
        assert_eq!(parse_ether("1.5").unwrap(), Wei::new(1_500_000_000_000_000_000));
        assert_eq!(parse_ether("0.5").unwrap(), Wei::new(500_000_000_000_000_000));
        assert_eq!(parse_ether(".25").unwrap(), Wei::new(250_000_000_000_000_000));
        assert_eq!(parse_ether("3.").unwrap(), Wei::new(3 * WEI_PER_ETHER));
        assert_eq!(parse_ether(" 2 ").unwrap(), Wei::new(2 * WEI_PER_ETHER));
        assert_eq!(parse_ether("0").unwrap(), Wei::ZERO);
    }

    #[test]
    fn test_parse_smallest_unit() {
        assert_eq!(parse_ether("0.000000000000000001").unwrap(), Wei::new(1));
        // Trailing zeros past the 18th digit carry no value
        assert_eq!(parse_ether("1.0000000000000000000").unwrap(), Wei::new(WEI_PER_ETHER));
        assert_eq!(
            parse_ether("1.0000000000000000000000000000000").unwrap(),
            Wei::new(WEI_PER_ETHER)
        );
        assert_eq!(
            parse_ether("0.000000000000000001000000000000000").unwrap(),
            Wei::new(1)
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for input in ["", "   ", "abc", ".", "-1", "+1", "1e18", "1,5", "1_000", "1.2.3", "0x10"] {
            let err = parse_ether(input).unwrap_err();
            assert!(matches!(err, Error::Validation(_)), "{:?} should be rejected", input);
        }
    }

    #[test]
    fn test_parse_rejects_excess_precision() {
        let err = parse_ether("0.0000000000000000001").unwrap_err();
        assert!(err.to_string().contains("decimal places"));
        let err = parse_ether("1.1234567890123456789012345678901").unwrap_err();
        assert!(err.to_string().contains("decimal places"));
    }

    #[test]
    fn test_parse_rejects_overflow() {
        let err = parse_ether("999999999999999999999999").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn test_format_keeps_one_fractional_digit() {
        assert_eq!(format_ether(Wei::new(2 * WEI_PER_ETHER)), "2.0");
        assert_eq!(format_ether(Wei::ZERO), "0.0");
        assert_eq!(format_ether(Wei::new(1)), "0.000000000000000001");
        assert_eq!(format_ether(Wei::new(1_234_500_000_000_000_000)), "1.2345");
    }

    #[test]
    fn test_round_trip_is_exact() {
        for input in ["1.5", "0.1", "123.456789", "0.000000000000000001"] {
            let wei = parse_ether(input).unwrap();
            assert_eq!(format_ether(wei), input);
        }
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&Wei::new(2 * WEI_PER_ETHER)).unwrap();
        assert_eq!(json, "\"2000000000000000000\"");
        let back: Wei = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Wei::new(2 * WEI_PER_ETHER));
    }
}
