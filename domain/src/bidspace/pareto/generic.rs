//! Brute-force pareto frontier for arbitrary orderings

use crate::bidspace::bid_list::AllBidsList;
use crate::error::DomainError;
use crate::issue::Bid;
use crate::profile::PartialOrdering;
use std::collections::BTreeSet;

/// Pareto frontier over any [`PartialOrdering`]s, by pairwise domination
/// checks across every complete bid in the space.
///
/// Complexity O(|bidspace|² · |profiles|): correct for orderings that are
/// not linear-additive, but asymptotically far worse than
/// [`ParetoLinearAdditive`](super::ParetoLinearAdditive). Bids are
/// enumerated through [`AllBidsList`], so the space itself is never
/// materialized; only the frontier is stored, computed once on first
/// use.
pub struct GenericPareto {
    profiles: Vec<Box<dyn PartialOrdering>>,
    points: std::sync::OnceLock<BTreeSet<Bid>>,
}

impl GenericPareto {
    /// At least two profiles are required and all must share one domain.
    pub fn new(profiles: Vec<Box<dyn PartialOrdering>>) -> Result<Self, DomainError> {
        if profiles.len() < 2 {
            return Err(DomainError::TooFewProfiles {
                needed: 2,
                got: profiles.len(),
            });
        }
        let domain = profiles[0].domain();
        for profile in &profiles {
            if profile.domain() != domain {
                return Err(DomainError::ProfileDomainMismatch {
                    expected: domain.name().to_string(),
                    found: profile.domain().name().to_string(),
                });
            }
        }
        Ok(Self {
            profiles,
            points: std::sync::OnceLock::new(),
        })
    }

    /// The pareto-optimal complete bids. Computed on first call, cached
    /// for the lifetime of this instance.
    pub fn points(&self) -> &BTreeSet<Bid> {
        self.points.get_or_init(|| self.compute())
    }

    /// Invariant while scanning: the working set only ever holds bids not
    /// dominated by any other bid seen so far, so each new bid is (1)
    /// checked against the set and (2), when it survives, used to evict
    /// members it dominates.
    fn compute(&self) -> BTreeSet<Bid> {
        let mut pareto: BTreeSet<Bid> = BTreeSet::new();
        for bid in AllBidsList::new(self.profiles[0].domain()).iter() {
            let dominated = pareto
                .iter()
                .any(|existing| self.is_dominated_by(&bid, existing));
            if !dominated {
                pareto.retain(|existing| !self.is_dominated_by(existing, &bid));
                pareto.insert(bid);
            }
        }
        pareto
    }

    /// True iff `dominant` is preferred or equal in every profile
    fn is_dominated_by(&self, bid: &Bid, dominant: &Bid) -> bool {
        self.profiles
            .iter()
            .all(|profile| profile.is_preferred_or_equal(dominant, bid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::{Domain, Value, ValueSet};
    use crate::profile::{LinearAdditiveUtilitySpace, ValueSetUtilities};
    use crate::bidspace::pareto::ParetoLinearAdditive;
    use rust_decimal_macros::dec;

    fn domain() -> Domain {
        Domain::new(
            "d",
            [
                ("a", ValueSet::labels(["a0", "a1"])),
                ("b", ValueSet::labels(["b0", "b1", "b2"])),
            ],
        )
        .unwrap()
    }

    fn space(name: &str, a1: rust_decimal::Decimal, b_up: bool) -> LinearAdditiveUtilitySpace {
        let b = if b_up {
            [("b0", dec!(0)), ("b1", dec!(0.5)), ("b2", dec!(1))]
        } else {
            [("b0", dec!(1)), ("b1", dec!(0.5)), ("b2", dec!(0))]
        };
        LinearAdditiveUtilitySpace::new(
            domain(),
            name,
            [
                (
                    "a",
                    ValueSetUtilities::labeled([("a0", dec!(1) - a1), ("a1", a1)]).unwrap(),
                ),
                ("b", ValueSetUtilities::labeled(b).unwrap()),
            ],
            [("a", dec!(0.4)), ("b", dec!(0.6))],
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_agrees_with_linear_additive_optimization() {
        let p1 = space("p1", dec!(1), true);
        let p2 = space("p2", dec!(0), false);

        let generic = GenericPareto::new(vec![
            Box::new(p1.clone()) as Box<dyn PartialOrdering>,
            Box::new(p2.clone()),
        ])
        .unwrap();
        let optimized = ParetoLinearAdditive::new(vec![p1, p2]).unwrap();

        assert_eq!(generic.points(), optimized.points());
    }

    #[test]
    fn test_single_profile_rejected() {
        let p1 = space("p1", dec!(1), true);
        assert!(matches!(
            GenericPareto::new(vec![Box::new(p1) as Box<dyn PartialOrdering>]),
            Err(DomainError::TooFewProfiles { .. })
        ));
    }

    #[test]
    fn test_identical_profiles_keep_only_the_top() {
        let p1 = space("p1", dec!(1), true);
        let p2 = space("p2", dec!(1), true);
        let generic = GenericPareto::new(vec![
            Box::new(p1) as Box<dyn PartialOrdering>,
            Box::new(p2),
        ])
        .unwrap();
        let points = generic.points();
        assert_eq!(points.len(), 1);
        let top = Bid::of([
            ("a", Value::discrete("a1").unwrap()),
            ("b", Value::discrete("b2").unwrap()),
        ]);
        assert!(points.contains(&top));
    }
}
