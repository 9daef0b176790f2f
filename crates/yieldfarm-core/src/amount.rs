//! Conversion between human-entered decimal quantities and ledger base units.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default exponent of the ledger's native unit (wei per ether).
pub const DEFAULT_DECIMALS: u32 = 18;

/// Largest exponent whose scale factor still fits in `u128`.
pub const MAX_DECIMALS: u32 = 38;

/// A non-negative quantity expressed in the ledger's indivisible base unit.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(u128);

/// Reasons a decimal string is not an acceptable amount.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,

    #[error("'{0}' is not a positive decimal number")]
    Malformed(String),

    #[error("at most {decimals} fractional digits are allowed")]
    TooPrecise { decimals: u32 },

    #[error("amount is too large")]
    Overflow,

    #[error("amount must be greater than zero")]
    NotPositive,
}

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn from_base_units(units: u128) -> Self {
        Self(units)
    }

    pub const fn base_units(self) -> u128 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Parses a human-entered decimal (`"1.5"`, `".25"`, `"3"`) into base units.
    ///
    /// Signs, exponents and separators are rejected, as is anything that
    /// scales to zero. `decimals` is the ledger's fixed exponent.
    pub fn parse_decimal(input: &str, decimals: u32) -> Result<Self, AmountError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(AmountError::Empty);
        }

        let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));
        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction)
        {
            return Err(AmountError::Malformed(trimmed.to_string()));
        }
        if decimals > MAX_DECIMALS {
            return Err(AmountError::Overflow);
        }
        if fraction.len() > decimals as usize {
            return Err(AmountError::TooPrecise { decimals });
        }

        let scale = 10u128.pow(decimals);
        // Digits are validated above, so a parse failure can only be overflow.
        let whole_units = if whole.is_empty() {
            0
        } else {
            whole.parse::<u128>().map_err(|_| AmountError::Overflow)?
        };
        let fraction_units = if fraction.is_empty() {
            0
        } else {
            format!("{:0<width$}", fraction, width = decimals as usize)
                .parse::<u128>()
                .map_err(|_| AmountError::Overflow)?
        };

        let total = whole_units
            .checked_mul(scale)
            .and_then(|units| units.checked_add(fraction_units))
            .ok_or(AmountError::Overflow)?;

        if total == 0 {
            return Err(AmountError::NotPositive);
        }
        Ok(Self(total))
    }

    /// Renders base units as a decimal string, trimming trailing zeros.
    pub fn format_decimal(self, decimals: u32) -> String {
        let digits = self.0.to_string();
        let width = decimals as usize;
        let padded = if digits.len() <= width {
            format!("{}{}", "0".repeat(width + 1 - digits.len()), digits)
        } else {
            digits
        };

        let (whole, fraction) = padded.split_at(padded.len() - width);
        let fraction = fraction.trim_end_matches('0');
        if fraction.is_empty() {
            whole.to_string()
        } else {
            format!("{whole}.{fraction}")
        }
    }
}

impl From<u128> for Amount {
    fn from(units: u128) -> Self {
        Self(units)
    }
}
