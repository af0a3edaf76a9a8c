//! Fixed-point minute arithmetic
//!
//! Balances are kept in integer hundredths of a minute so that the
//! round-to-one-decimal settlement rule is exact and reproducible.
//! Floating point only appears at the edges (display, config parsing).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// A signed quantity of minutes, stored as hundredths.
///
/// Serializes as a plain integer (hundredths of a minute).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Minutes(i64);

impl Minutes {
    pub const ZERO: Minutes = Minutes(0);

    pub const fn from_hundredths(h: i64) -> Self {
        Self(h)
    }

    pub const fn from_minutes(m: i64) -> Self {
        Self(m * 100)
    }

    /// One tenth of a minute; settlement amounts are multiples of this.
    pub const fn from_tenths(t: i64) -> Self {
        Self(t * 10)
    }

    /// Parse a fractional minute count, rounding to the nearest hundredth.
    pub fn from_minutes_f64(m: f64) -> Self {
        Self((m * 100.0).round() as i64)
    }

    /// Convert elapsed seconds to minutes rounded to one decimal place
    /// (half away from zero). This is the settlement rounding rule.
    pub const fn from_secs_rounded(secs: i64) -> Self {
        let tenths = if secs >= 0 {
            (secs * 10 + 30) / 60
        } else {
            (secs * 10 - 30) / 60
        };
        Self(tenths * 10)
    }

    pub const fn hundredths(self) -> i64 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Whole seconds represented by this quantity, truncated toward zero.
    pub const fn as_seconds(self) -> i64 {
        self.0 * 3 / 5
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Clamp to at least `floor`.
    pub fn clamp_floor(self, floor: Minutes) -> Self {
        self.max(floor)
    }

    /// Clamp to at most `cap`.
    pub fn clamp_cap(self, cap: Minutes) -> Self {
        self.min(cap)
    }
}

impl Add for Minutes {
    type Output = Minutes;

    fn add(self, rhs: Self) -> Self::Output {
        Minutes(self.0 + rhs.0)
    }
}

impl AddAssign for Minutes {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Minutes {
    type Output = Minutes;

    fn sub(self, rhs: Self) -> Self::Output {
        Minutes(self.0 - rhs.0)
    }
}

impl SubAssign for Minutes {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Minutes {
    type Output = Minutes;

    fn neg(self) -> Self::Output {
        Minutes(-self.0)
    }
}

impl Sum for Minutes {
    fn sum<I: Iterator<Item = Minutes>>(iter: I) -> Self {
        iter.fold(Minutes::ZERO, |acc, m| acc + m)
    }
}

impl fmt::Display for Minutes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 100 == 0 {
            write!(f, "{}", self.0 / 100)
        } else if self.0 % 10 == 0 {
            write!(f, "{:.1}", self.as_f64())
        } else {
            write!(f, "{:.2}", self.as_f64())
        }
    }
}
