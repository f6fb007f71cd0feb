//! Fixed-point token amounts
//!
//! Amounts are non-negative integers counted in the smallest unit of the
//! ledger (`10^-decimal_scale` of a whole token). All arithmetic is checked:
//! overflow is an error, never a silent wrap or saturation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{LedgerError, Result};

/// Largest decimal scale accepted by [`Amount::scale`] and [`Amount::parse`].
pub const MAX_DECIMAL_SCALE: u32 = 30;

/// A raw amount in minimal units.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(u128);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn from_raw(raw: u128) -> Self {
        Amount(raw)
    }

    pub const fn raw(self) -> u128 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Convert a whole-token figure into minimal units.
    pub fn scale(human: u128, decimal_scale: u32) -> Result<Self> {
        let factor = unit_factor(decimal_scale)?;
        human
            .checked_mul(factor)
            .map(Amount)
            .ok_or(LedgerError::ArithmeticOverflow("scale"))
    }

    /// Parse a decimal string such as `"1500000"` or `"0.25"` into minimal units.
    ///
    /// More fractional digits than `decimal_scale` is an `InvalidAmount`:
    /// the value would not be an integral number of minimal units.
    pub fn parse(text: &str, decimal_scale: u32) -> Result<Self> {
        let text = text.trim().replace('_', "");
        let (whole, frac) = match text.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (text.as_str(), ""),
        };

        if whole.is_empty() && frac.is_empty() {
            return Err(LedgerError::InvalidAmount(format!("'{}' is empty", text)));
        }
        if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
            return Err(LedgerError::InvalidAmount(format!(
                "'{}' is not a decimal number",
                text
            )));
        }
        if frac.len() > decimal_scale as usize {
            return Err(LedgerError::InvalidAmount(format!(
                "'{}' has more than {} fractional digits",
                text, decimal_scale
            )));
        }

        let whole_units = if whole.is_empty() {
            0
        } else {
            whole
                .parse::<u128>()
                .map_err(|_| LedgerError::ArithmeticOverflow("parse"))?
        };
        let mut frac_units = 0u128;
        if !frac.is_empty() {
            let padding = unit_factor(decimal_scale - frac.len() as u32)?;
            frac_units = frac
                .parse::<u128>()
                .map_err(|_| LedgerError::ArithmeticOverflow("parse"))?
                .checked_mul(padding)
                .ok_or(LedgerError::ArithmeticOverflow("parse"))?;
        }

        Amount::scale(whole_units, decimal_scale)?.checked_add(Amount(frac_units))
    }

    /// Render with a decimal point at `decimal_scale`, trimming trailing zeros.
    pub fn display(self, decimal_scale: u32) -> String {
        if decimal_scale == 0 {
            return self.0.to_string();
        }
        let factor = match unit_factor(decimal_scale) {
            Ok(factor) => factor,
            Err(_) => return self.0.to_string(),
        };
        let whole = self.0 / factor;
        let frac = self.0 % factor;
        if frac == 0 {
            return whole.to_string();
        }
        let digits = format!("{:0width$}", frac, width = decimal_scale as usize);
        format!("{}.{}", whole, digits.trim_end_matches('0'))
    }

    pub fn checked_add(self, other: Amount) -> Result<Amount> {
        self.0
            .checked_add(other.0)
            .map(Amount)
            .ok_or(LedgerError::ArithmeticOverflow("add"))
    }

    pub fn checked_sub(self, other: Amount) -> Result<Amount> {
        self.0
            .checked_sub(other.0)
            .map(Amount)
            .ok_or(LedgerError::ArithmeticOverflow("sub"))
    }

    pub fn checked_mul(self, factor: u128) -> Result<Amount> {
        self.0
            .checked_mul(factor)
            .map(Amount)
            .ok_or(LedgerError::ArithmeticOverflow("mul"))
    }

    /// `self * bps / 10_000`, truncating.
    pub fn apply_bps(self, bps: u32) -> Result<Amount> {
        self.checked_mul(u128::from(bps))
            .map(|scaled| Amount(scaled.0 / u128::from(crate::BPS_DENOMINATOR)))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn unit_factor(decimal_scale: u32) -> Result<u128> {
    if decimal_scale > MAX_DECIMAL_SCALE {
        return Err(LedgerError::ArithmeticOverflow("decimal scale"));
    }
    10u128
        .checked_pow(decimal_scale)
        .ok_or(LedgerError::ArithmeticOverflow("decimal scale"))
}
