//! Money amounts using decimal arithmetic.
//!
//! Amounts are kept at full precision while they are being combined and only
//! rounded (half-up, to cents) when a figure is presented or sent out.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// An amount in the store currency (EUR).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Number of decimal places used for presented amounts.
    pub const SCALE: u32 = 2;

    /// Wrap a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Build an amount from minor units (cents).
    #[must_use]
    pub const fn from_minor(cents: i64) -> Self {
        // `Decimal::new` is not `const`; build the same value from its parts.
        let magnitude = cents.unsigned_abs();
        Self(Decimal::from_parts(
            magnitude as u32,
            (magnitude >> 32) as u32,
            0,
            cents < 0,
            Self::SCALE,
        ))
    }

    /// Parse a decimal string such as `"19.99"` as returned by the content API.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a decimal number.
    pub fn parse(s: &str) -> Result<Self, rust_decimal::Error> {
        s.trim().parse::<Decimal>().map(Self)
    }

    /// The unrounded amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Round to cents, half away from zero, and fix the scale at two places.
    #[must_use]
    pub fn rounded(self) -> Self {
        let mut amount = self
            .0
            .round_dp_with_strategy(Self::SCALE, RoundingStrategy::MidpointAwayFromZero);
        amount.rescale(Self::SCALE);
        Self(amount)
    }

    /// Multiply by a rate, keeping full precision.
    #[must_use]
    pub fn times_rate(self, rate: Decimal) -> Self {
        Self(self.0 * rate)
    }

    /// True for exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// True for amounts below zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Mul<u32> for Money {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self {
        Self(self.0 * Decimal::from(rhs))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

/// Formats as the rounded amount followed by the currency sign, e.g. `19.99 €`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} €", self.rounded().0)
    }
}
