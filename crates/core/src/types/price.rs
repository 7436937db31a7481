//! Currency codes and price formatting.
//!
//! Listing prices travel over the wire as JSON numbers and are held as
//! [`rust_decimal::Decimal`] everywhere in the storefront so that cart totals
//! never accumulate floating-point error. The currency lives on the listing
//! as a free-form code; [`CurrencyCode`] covers the codes the listing form
//! offers.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Currency codes accepted by the listing form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    /// Bangladeshi taka.
    #[default]
    BDT,
    USD,
    EUR,
    GBP,
}

impl CurrencyCode {
    /// All codes in the order the listing form presents them.
    pub const ALL: [Self; 4] = [Self::BDT, Self::USD, Self::EUR, Self::GBP];

    /// ISO 4217 code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::BDT => "BDT",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error returned when parsing an unsupported currency code.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported currency: {0}")]
pub struct UnknownCurrency(pub String);

impl FromStr for CurrencyCode {
    type Err = UnknownCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownCurrency(s.to_string()))
    }
}

/// Format an amount the way product cards show it (e.g. `BDT 12,500`).
///
/// Whole amounts drop the fractional part; others keep two decimals.
#[must_use]
pub fn format_amount(currency: &str, amount: Decimal) -> String {
    let rounded = amount.round_dp(2).normalize();
    let text = rounded.abs().to_string();
    let (whole, frac) = text.split_once('.').map_or((text.as_str(), None), |(w, f)| (w, Some(f)));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    match frac {
        Some(f) => format!("{currency} {sign}{grouped}.{f:0<2}"),
        None => format!("{currency} {sign}{grouped}"),
    }
}
