//! # Percent
//!
//! Whole-number percentage in `[0, 100]`, used for discounts and dealer
//! overheads.

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::arithmetic::{ArithmeticError, ArithmeticResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whole-number percentage within `[0, 100]`.
///
/// # Examples
///
/// ```
/// use vehicle_offers::domain::value_objects::Percent;
///
/// let ten = Percent::new(10).unwrap();
/// assert_eq!(ten.portion_of(25_000).unwrap(), 2_500);
/// assert!(Percent::new(101).is_err());
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "i64", into = "i64")]
pub struct Percent(u8);

impl Percent {
    /// Zero percent.
    pub const ZERO: Self = Self(0);

    /// One hundred percent.
    pub const HUNDRED: Self = Self(100);

    /// Creates a percentage.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidPercent`] if `value` is outside `[0, 100]`.
    pub fn new(value: i64) -> DomainResult<Self> {
        u8::try_from(value)
            .ok()
            .filter(|v| *v <= 100)
            .map(Self)
            .ok_or(DomainError::InvalidPercent(value))
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Returns true for zero percent.
    #[inline]
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Computes `amount * self / 100`, truncating toward zero.
    ///
    /// # Errors
    ///
    /// Returns [`ArithmeticError::Overflow`] if the intermediate product
    /// does not fit in an `i64`.
    pub fn portion_of(self, amount: i64) -> ArithmeticResult<i64> {
        amount
            .checked_mul(i64::from(self.0))
            .map(|product| product / 100)
            .ok_or(ArithmeticError::Overflow)
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl TryFrom<i64> for Percent {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Percent> for i64 {
    fn from(percent: Percent) -> Self {
        i64::from(percent.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn bounds() {
        assert_eq!(Percent::new(0).unwrap(), Percent::ZERO);
        assert_eq!(Percent::new(100).unwrap(), Percent::HUNDRED);
        assert_eq!(Percent::new(-1), Err(DomainError::InvalidPercent(-1)));
        assert_eq!(Percent::new(101), Err(DomainError::InvalidPercent(101)));
        assert_eq!(Percent::new(1_000), Err(DomainError::InvalidPercent(1_000)));
    }

    #[test]
    fn portion_truncates() {
        let seven = Percent::new(7).unwrap();
        // 7% of 999 = 69.93
        assert_eq!(seven.portion_of(999).unwrap(), 69);
        assert_eq!(Percent::ZERO.portion_of(12_345).unwrap(), 0);
    }

    #[test]
    fn portion_overflow() {
        let half = Percent::new(50).unwrap();
        assert_eq!(half.portion_of(i64::MAX), Err(ArithmeticError::Overflow));
    }

    #[test]
    fn serde_validates() {
        assert_eq!(serde_json::from_str::<Percent>("15").unwrap().get(), 15);
        assert!(serde_json::from_str::<Percent>("150").is_err());
        assert_eq!(serde_json::to_string(&Percent::new(5).unwrap()).unwrap(), "5");
    }

    #[test]
    fn display() {
        assert_eq!(Percent::new(12).unwrap().to_string(), "12%");
    }
}
