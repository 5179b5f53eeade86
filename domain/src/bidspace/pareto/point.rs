//! Pareto points

use crate::error::DomainError;
use crate::issue::Bid;
use crate::profile::LinearAdditiveUtilitySpace;
use rust_decimal::Decimal;

/// A (possibly partial) bid together with its utility in every profile
/// under comparison. Also a cache: utilities are computed once at
/// creation and only summed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParetoPoint {
    bid: Bid,
    utilities: Vec<Decimal>,
}

impl ParetoPoint {
    /// Evaluate `bid` in every space, in order
    pub fn create(bid: Bid, spaces: &[LinearAdditiveUtilitySpace]) -> Self {
        let utilities = spaces.iter().map(|space| space.utility(&bid)).collect();
        Self { bid, utilities }
    }

    pub fn bid(&self) -> &Bid {
        &self.bid
    }

    pub fn utilities(&self) -> &[Decimal] {
        &self.utilities
    }

    /// Merge the issues of both bids and sum the utility vectors.
    /// Additivity makes this exact; the bids' issue sets must be
    /// disjoint or the merge fails.
    pub fn merge(&self, other: &ParetoPoint) -> Result<ParetoPoint, DomainError> {
        let utilities = self
            .utilities
            .iter()
            .zip(&other.utilities)
            .map(|(a, b)| a + b)
            .collect();
        Ok(ParetoPoint {
            bid: self.bid.merge(&other.bid)?,
            utilities,
        })
    }

    /// True iff `other` is at least as good in every dimension
    pub fn is_dominated_by(&self, other: &ParetoPoint) -> bool {
        self.utilities
            .iter()
            .zip(&other.utilities)
            .all(|(mine, theirs)| theirs >= mine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::Value;
    use rust_decimal_macros::dec;

    fn point(utilities: &[Decimal], issue: &str, label: &str) -> ParetoPoint {
        ParetoPoint {
            bid: Bid::of([(issue, Value::discrete(label).unwrap())]),
            utilities: utilities.to_vec(),
        }
    }

    #[test]
    fn test_domination() {
        let weak = point(&[dec!(0.2), dec!(0.3)], "a", "x");
        let strong = point(&[dec!(0.5), dec!(0.3)], "a", "y");
        assert!(weak.is_dominated_by(&strong));
        assert!(!strong.is_dominated_by(&weak));
        // equal points dominate each other
        assert!(weak.is_dominated_by(&weak));
    }

    #[test]
    fn test_incomparable_points() {
        let a = point(&[dec!(0.8), dec!(0.1)], "a", "x");
        let b = point(&[dec!(0.1), dec!(0.8)], "a", "y");
        assert!(!a.is_dominated_by(&b));
        assert!(!b.is_dominated_by(&a));
    }

    #[test]
    fn test_merge_sums_utilities() {
        let a = point(&[dec!(0.2), dec!(0.3)], "a", "x");
        let b = point(&[dec!(0.4), dec!(0.1)], "b", "y");
        let merged = a.merge(&b).unwrap();
        assert_eq!(merged.utilities(), &[dec!(0.6), dec!(0.4)]);
        assert_eq!(merged.bid().len(), 2);
    }

    #[test]
    fn test_merge_overlapping_fails() {
        let a = point(&[dec!(0.2)], "a", "x");
        let b = point(&[dec!(0.4)], "a", "y");
        assert!(a.merge(&b).is_err());
    }
}
