//! Fixed-point decimal numbers
//!
//! A [`Decimal`] is `units * 10^-scale`, kept normalized (no trailing zero
//! digits in the fraction) so that structural equality is numeric equality.

use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Largest supported number of fractional digits
pub const MAX_SCALE: u32 = 28;

/// Fixed-point decimal value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Decimal {
    units: i128,
    scale: u32,
}

impl Decimal {
    pub const ZERO: Decimal = Decimal { units: 0, scale: 0 };

    /// Create a decimal from raw units and scale, e.g. `new(12345, 2)` is `123.45`.
    ///
    /// # Errors
    ///
    /// Returns an error if the scale exceeds [`MAX_SCALE`].
    pub fn new(units: i128, scale: u32) -> Result<Self> {
        if scale > MAX_SCALE {
            return Err(Error::invalid_decimal(
                format!("{units}e-{scale}"),
                format!("scale exceeds {MAX_SCALE}"),
            ));
        }
        Ok(Self { units, scale }.normalized())
    }

    fn normalized(mut self) -> Self {
        while self.scale > 0 && self.units % 10 == 0 {
            self.units /= 10;
            self.scale -= 1;
        }
        self
    }

    /// Raw units.
    pub fn units(&self) -> i128 {
        self.units
    }

    /// Number of fractional digits.
    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Whether the value has no fractional part.
    pub fn is_integral(&self) -> bool {
        self.scale == 0
    }

    /// Integer value, when integral.
    pub fn to_i128(&self) -> Option<i128> {
        self.is_integral().then_some(self.units)
    }

    /// Nearest `f64`.
    #[allow(clippy::cast_precision_loss)]
    pub fn to_f64(&self) -> f64 {
        self.units as f64 / 10f64.powi(i32::try_from(self.scale).unwrap_or(i32::MAX))
    }

    /// Exact decimal for a finite float, using its shortest round-trip text.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        format!("{value}").parse().ok()
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Self {
            units: i128::from(value),
            scale: 0,
        }
    }
}

impl From<u64> for Decimal {
    fn from(value: u64) -> Self {
        Self {
            units: i128::from(value),
            scale: 0,
        }
    }
}

impl FromStr for Decimal {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };

        let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
        if whole.is_empty() && fraction.is_empty() {
            return Err(Error::invalid_decimal(input, "no digits"));
        }
        if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
            return Err(Error::invalid_decimal(input, "unexpected character"));
        }

        let scale = u32::try_from(fraction.len())
            .ok()
            .filter(|scale| *scale <= MAX_SCALE)
            .ok_or_else(|| Error::invalid_decimal(input, "too many fractional digits"))?;

        let mut units: i128 = 0;
        for c in whole.chars().chain(fraction.chars()) {
            let digit = i128::from(c.to_digit(10).unwrap_or(0));
            units = units
                .checked_mul(10)
                .and_then(|u| u.checked_add(digit))
                .ok_or_else(|| Error::invalid_decimal(input, "out of range"))?;
        }
        if negative {
            units = -units;
        }

        Ok(Self { units, scale }.normalized())
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.units);
        }
        let sign = if self.units < 0 { "-" } else { "" };
        let magnitude = self.units.unsigned_abs();
        let divisor = 10u128.pow(self.scale);
        let width = self.scale as usize;
        write!(
            f,
            "{sign}{}.{:0width$}",
            magnitude / divisor,
            magnitude % divisor
        )
    }
}
