//! Signed monetary amount type with 2-decimal output resolution.
//!
//! Uses `rust_decimal` internally. Arithmetic keeps full precision so that
//! per-share division error cannot accumulate across a long history;
//! rounding to 2 decimal places happens only at output boundaries.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

/// A signed monetary amount.
///
/// Positive means money owed to a member, negative means money a member
/// owes, in balance context. Two amounts within [`Amount::tolerance`] of
/// each other are considered settled.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use expense_ledger::Amount;
///
/// let amount = Amount::from_str("10.5").unwrap();
/// assert_eq!(amount.to_string(), "10.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Amount(Decimal);

impl Amount {
    /// Decimal places used at presentation boundaries.
    pub const SCALE: u32 = 2;

    /// Zero value.
    pub const ZERO: Self = Amount(Decimal::ZERO);

    /// Creates an `Amount` from a raw `Decimal`, keeping its full precision.
    pub fn new(value: Decimal) -> Self {
        Amount(value)
    }

    /// The settlement tolerance: 0.01 (one cent).
    ///
    /// Balances and residuals smaller than this are treated as zero.
    pub fn tolerance() -> Decimal {
        Decimal::new(1, 2)
    }

    /// Returns `true` if this value is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns `true` if the magnitude is below the settlement tolerance.
    pub fn is_negligible(&self) -> bool {
        self.0.abs() < Self::tolerance()
    }

    /// Returns `true` if strictly positive.
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Returns `true` if strictly negative.
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Absolute value.
    pub fn abs(&self) -> Self {
        Amount(self.0.abs())
    }

    /// Smaller of two amounts.
    pub fn min(self, other: Self) -> Self {
        Amount(self.0.min(other.0))
    }

    /// Rounds to 2 decimal places, half away from zero.
    ///
    /// Only called when an amount crosses an output boundary (emitted
    /// transfers, report rows). Internal folds never round.
    pub fn round2(&self) -> Self {
        Amount(
            self.0
                .round_dp_with_strategy(Self::SCALE, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Divides evenly across `count` parties, at full precision.
    pub fn divide_among(&self, count: usize) -> Self {
        Amount(self.0 / Decimal::from(count as u64))
    }

    /// Computes `percent`% of this amount, at full precision.
    pub fn percent_of(&self, percent: Decimal) -> Self {
        Amount(self.0 * percent / Decimal::ONE_HUNDRED)
    }
}

impl FromStr for Amount {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let decimal = Decimal::from_str(s.trim())?;
        Ok(Amount(decimal))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.round2().0)
    }
}

impl Add for Amount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Amount(self.0 + rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Amount {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Amount(self.0 - rhs.0)
    }
}

impl SubAssign for Amount {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Amount {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Amount(-self.0)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, |acc, a| acc + a)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, |acc, a| acc + *a)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Full precision: stored shares must survive a round trip intact.
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}
