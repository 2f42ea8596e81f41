//! Type-safe price representation using decimal arithmetic.
//!
//! Prices arrive from the backend as decimal strings. Rwandan francs have no
//! minor unit in practice, so RWF amounts are shown whole; dirham and dollar
//! amounts (used on supplier-facing copy) keep two decimals.

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (francs, dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    #[serde(default)]
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

    /// Round the amount to the currency's minor units (midpoint away from zero).
    #[must_use]
    pub fn rounded(self) -> Self {
        Self {
            amount: self.amount.round_dp_with_strategy(
                self.currency_code.minor_units(),
                RoundingStrategy::MidpointAwayFromZero,
            ),
            currency_code: self.currency_code,
        }
    }

    /// Format for display, e.g. `RWF 12,500` or `USD 19.99`.
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = self.rounded();
        let digits = rounded.currency_code.minor_units() as usize;
        let plain = format!("{:.*}", digits, rounded.amount);
        format!("{} {}", self.currency_code.code(), group_thousands(&plain))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// Insert `,` separators into the integer part of a plain decimal string.
fn group_thousands(plain: &str) -> String {
    let (sign, unsigned) = plain
        .strip_prefix('-')
        .map_or(("", plain), |rest| ("-", rest));
    let (int_part, frac_part) = unsigned
        .split_once('.')
        .map_or((unsigned, None), |(i, f)| (i, Some(f)));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

/// ISO 4217 currency codes the storefront deals in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    /// Rwandan franc (customer-facing prices).
    #[default]
    RWF,
    /// US dollar.
    USD,
    /// UAE dirham (supplier prices).
    AED,
}

impl CurrencyCode {
    /// ISO code string.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::RWF => "RWF",
            Self::USD => "USD",
            Self::AED => "AED",
        }
    }

    /// Number of decimal places shown for this currency.
    #[must_use]
    pub const fn minor_units(self) -> u32 {
        match self {
            Self::RWF => 0,
            Self::USD | Self::AED => 2,
        }
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RWF" => Ok(Self::RWF),
            "USD" => Ok(Self::USD),
            "AED" => Ok(Self::AED),
            other => Err(format!("unsupported currency: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_rwf_has_no_decimals() {
        let price = Price::new(Decimal::new(1_250_050, 2), CurrencyCode::RWF);
        assert_eq!(price.display(), "RWF 12,501");
    }

    #[test]
    fn test_display_usd_two_decimals() {
        let price = Price::new(Decimal::new(19_995, 3), CurrencyCode::USD);
        assert_eq!(price.display(), "USD 20.00");
        let price = Price::new(Decimal::new(123_456_789, 2), CurrencyCode::USD);
        assert_eq!(price.display(), "USD 1,234,567.89");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("0"), "0");
        assert_eq!(group_thousands("999"), "999");
        assert_eq!(group_thousands("1000"), "1,000");
        assert_eq!(group_thousands("-1234567.50"), "-1,234,567.50");
    }

    #[test]
    fn test_currency_parse() {
        assert_eq!("rwf".parse::<CurrencyCode>(), Ok(CurrencyCode::RWF));
        assert!("EUR".parse::<CurrencyCode>().is_err());
    }
}
