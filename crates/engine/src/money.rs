use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Sub},
};

use serde::{Deserialize, Serialize};

/// Signed money amount in **integer minor units** (paise, cents).
///
/// Every monetary value in the engine (transaction amounts, limits,
/// aggregates) uses this type; only percentages are `f64`. Arithmetic
/// saturates at the `i64` bounds.
///
/// ```rust
/// use engine::MoneyCents;
///
/// let spent = MoneyCents::new(850_00);
/// assert_eq!(spent.to_string(), "850.00");
/// assert_eq!(spent.percentage_of(MoneyCents::new(1000_00)), Some(85.0));
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    /// Creates a new amount from integer minor units.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in minor units.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the amount is positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Negative amounts become zero.
    #[must_use]
    pub const fn clamp_non_negative(self) -> Self {
        if self.0 < 0 { Self::ZERO } else { self }
    }

    /// Unclamped share of `limit` in percent, `None` when no limit is set
    /// (`limit <= 0`).
    #[must_use]
    pub fn percentage_of(self, limit: MoneyCents) -> Option<f64> {
        if !limit.is_positive() {
            return None;
        }
        Some(self.0 as f64 / limit.0 as f64 * 100.0)
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let major = abs / 100;
        let minor = abs % 100;
        write!(f, "{sign}{major}.{minor:02}")
    }
}

impl From<i64> for MoneyCents {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<MoneyCents> for i64 {
    fn from(value: MoneyCents) -> Self {
        value.0
    }
}

impl Add for MoneyCents {
    type Output = MoneyCents;

    fn add(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for MoneyCents {
    fn add_assign(&mut self, rhs: MoneyCents) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for MoneyCents {
    type Output = MoneyCents;

    fn sub(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0.saturating_sub(rhs.0))
    }
}

impl Sum for MoneyCents {
    fn sum<I: Iterator<Item = MoneyCents>>(iter: I) -> Self {
        iter.fold(MoneyCents::ZERO, Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_two_decimals() {
        assert_eq!(MoneyCents::new(0).to_string(), "0.00");
        assert_eq!(MoneyCents::new(1).to_string(), "0.01");
        assert_eq!(MoneyCents::new(1050).to_string(), "10.50");
        assert_eq!(MoneyCents::new(-1050).to_string(), "-10.50");
    }

    #[test]
    fn percentage_is_unclamped_and_none_without_limit() {
        let limit = MoneyCents::new(1000_00);
        assert_eq!(MoneyCents::new(850_00).percentage_of(limit), Some(85.0));
        let over = MoneyCents::new(1100_00).percentage_of(limit).unwrap();
        assert!((over - 110.0).abs() < 1e-9);
        assert_eq!(MoneyCents::new(10).percentage_of(MoneyCents::ZERO), None);
        assert_eq!(MoneyCents::new(10).percentage_of(MoneyCents::new(-5)), None);
    }

    #[test]
    fn arithmetic_saturates() {
        let half = MoneyCents::new(i64::MAX / 2 + 1);
        let total: MoneyCents = [half, half].into_iter().sum();
        assert_eq!(total, MoneyCents::new(i64::MAX));

        let mut acc = MoneyCents::new(i64::MAX);
        acc += MoneyCents::new(1);
        assert_eq!(acc, MoneyCents::new(i64::MAX));
        assert_eq!(
            MoneyCents::new(i64::MIN) - MoneyCents::new(1),
            MoneyCents::new(i64::MIN)
        );
    }

    #[test]
    fn sum_and_clamp() {
        let total: MoneyCents = [1, 2, 3].into_iter().map(MoneyCents::new).sum();
        assert_eq!(total, MoneyCents::new(6));
        assert_eq!(MoneyCents::new(-3).clamp_non_negative(), MoneyCents::ZERO);
    }
}
