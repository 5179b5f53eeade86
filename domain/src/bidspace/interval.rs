//! Closed decimal intervals
//!
//! The bid-space engine reasons entirely in intervals of weighted utility.
//! An interval is a value type with exact equality and hashing, so it can
//! serve as part of a cache key.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A closed interval `[min, max]`. Empty when `min > max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    min: Decimal,
    max: Decimal,
}

impl Interval {
    /// The `[0,0]` interval, the additive identity
    pub const ZERO: Interval = Interval {
        min: Decimal::ZERO,
        max: Decimal::ZERO,
    };

    pub fn new(min: Decimal, max: Decimal) -> Self {
        Self { min, max }
    }

    pub fn min(&self) -> Decimal {
        self.min
    }

    pub fn max(&self) -> Decimal {
        self.max
    }

    /// True iff this interval contains no values
    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    /// True iff `min <= value <= max`
    pub fn contains(&self, value: Decimal) -> bool {
        self.min <= value && value <= self.max
    }

    /// `[min + other.min, max + other.max]`
    pub fn add(&self, other: &Interval) -> Interval {
        Interval::new(self.min + other.min, self.max + other.max)
    }

    /// The overlap of both intervals; empty when they do not overlap
    pub fn intersect(&self, other: &Interval) -> Interval {
        Interval::new(self.min.max(other.min), self.max.min(other.max))
    }

    /// Both ends shifted down by `value`
    pub fn subtract(&self, value: Decimal) -> Interval {
        Interval::new(self.min - value, self.max - value)
    }

    /// The values that, added to a value from `other`, can land in this
    /// interval: `[min - other.max, max - other.min]`. None when empty.
    pub fn invert(&self, other: &Interval) -> Option<Interval> {
        let min = self.min - other.max;
        let max = self.max - other.min;
        if min > max {
            return None;
        }
        Some(Interval::new(min, max))
    }

    /// Both ends scaled by `weight`
    pub fn multiply(&self, weight: Decimal) -> Interval {
        Interval::new(self.min * weight, self.max * weight)
    }

    /// Shrink to `precision` decimal digits: the min is ceiled and the max
    /// floored, so the rounded interval lies inside the original.
    pub fn round(&self, precision: u32) -> Interval {
        let factor = Decimal::from(10u64.pow(precision));
        Interval::new(
            (self.min * factor).ceil() / factor,
            (self.max * factor).floor() / factor,
        )
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{},{}]", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_contains_is_inclusive() {
        let interval = Interval::new(dec!(0.2), dec!(0.8));
        assert!(interval.contains(dec!(0.2)));
        assert!(interval.contains(dec!(0.8)));
        assert!(!interval.contains(dec!(0.81)));
    }

    #[test]
    fn test_empty() {
        assert!(Interval::new(dec!(1), dec!(0)).is_empty());
        assert!(!Interval::new(dec!(1), dec!(1)).is_empty());
    }

    #[test]
    fn test_add() {
        let a = Interval::new(dec!(0.1), dec!(0.4));
        let b = Interval::new(dec!(0.2), dec!(0.3));
        assert_eq!(a.add(&b), Interval::new(dec!(0.3), dec!(0.7)));
    }

    #[test]
    fn test_intersect_disjoint_is_empty() {
        let a = Interval::new(dec!(0), dec!(0.3));
        let b = Interval::new(dec!(0.5), dec!(1));
        assert!(a.intersect(&b).is_empty());
    }

    #[test]
    fn test_subtract_shifts_both_ends() {
        let interval = Interval::new(dec!(0.5), dec!(0.9)).subtract(dec!(0.2));
        assert_eq!(interval, Interval::new(dec!(0.3), dec!(0.7)));
    }

    #[test]
    fn test_invert() {
        let goal = Interval::new(dec!(0.5), dec!(0.9));
        let fixed = Interval::new(dec!(0.2), dec!(0.4));
        assert_eq!(
            goal.invert(&fixed),
            Some(Interval::new(dec!(0.1), dec!(0.7)))
        );
        let too_big = Interval::new(dec!(2), dec!(2));
        assert_eq!(Interval::new(dec!(0), dec!(0.5)).invert(&too_big), None);
    }

    #[test]
    fn test_round_shrinks_inward() {
        let interval = Interval::new(dec!(0.12345), dec!(0.67899)).round(3);
        assert_eq!(interval, Interval::new(dec!(0.124), dec!(0.678)));
        // already-exact bounds stay put
        assert_eq!(
            Interval::new(dec!(0.25), dec!(0.75)).round(2),
            Interval::new(dec!(0.25), dec!(0.75))
        );
    }

    #[test]
    fn test_round_can_empty_a_narrow_interval() {
        let narrow = Interval::new(dec!(0.1231), dec!(0.1239)).round(3);
        assert!(narrow.is_empty());
    }
}
