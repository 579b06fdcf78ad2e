//! Price representation using decimal arithmetic.
//!
//! The backend sends bare decimal amounts; the storefront sells in a single
//! currency configured at startup. `Price` pairs the two for display.

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// A zero amount in the given currency.
    #[must_use]
    pub const fn zero(currency_code: CurrencyCode) -> Self {
        Self::new(Decimal::ZERO, currency_code)
    }

    /// Multiply by a quantity, returning `None` on overflow.
    #[must_use]
    pub fn checked_mul(self, quantity: u32) -> Option<Self> {
        self.amount
            .checked_mul(Decimal::from(quantity))
            .map(|amount| Self::new(amount, self.currency_code))
    }

    /// Format for display, e.g. `$1,299.00` or `€12.50`.
    ///
    /// Amounts are rounded half-away-from-zero to two decimals and grouped by
    /// thousands.
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = self
            .amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let text = format!("{:.2}", rounded.abs());
        let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

        format!(
            "{sign}{}{}.{fraction}",
            self.currency_code.symbol(),
            group_thousands(whole)
        )
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// Display symbol for the currency.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            "CAD" => Ok(Self::CAD),
            "AUD" => Ok(Self::AUD),
            _ => Err(format!("unsupported currency: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn usd(s: &str) -> Price {
        Price::new(Decimal::from_str(s).unwrap(), CurrencyCode::USD)
    }

    #[test]
    fn test_display_rounds_and_groups() {
        assert_eq!(usd("0").display(), "$0.00");
        assert_eq!(usd("19.5").display(), "$19.50");
        assert_eq!(usd("1299").display(), "$1,299.00");
        assert_eq!(usd("1234567.895").display(), "$1,234,567.90");
        assert_eq!(usd("-42.1").display(), "-$42.10");
    }

    #[test]
    fn test_display_other_currency() {
        let price = Price::new(Decimal::from_str("12.5").unwrap(), CurrencyCode::EUR);
        assert_eq!(price.to_string(), "€12.50");
    }

    #[test]
    fn test_checked_mul() {
        assert_eq!(usd("2.25").checked_mul(4).unwrap(), usd("9.00"));
        assert_eq!(usd("2.25").checked_mul(0).unwrap().display(), "$0.00");
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!(CurrencyCode::from_str("gbp").unwrap(), CurrencyCode::GBP);
        assert!(CurrencyCode::from_str("XYZ").is_err());
    }
}
