//! Optimized pareto frontier for linear-additive spaces

use super::partial::PartialPareto;
use crate::error::DomainError;
use crate::issue::Bid;
use crate::profile::LinearAdditiveUtilitySpace;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Pareto frontier of two or more linear-additive spaces on one domain.
///
/// Divide-and-conquer over the issue list keeps intermediate surfaces
/// small relative to the full product space; complexity is
/// output-sensitive (bounded per merge by the square of the surviving
/// surface) though still exponential when everything is pareto-optimal.
/// The frontier is computed once, on first use.
///
/// # Example
///
/// ```
/// # use parley_domain::{Domain, LinearAdditiveUtilitySpace, ParetoLinearAdditive,
/// #     ValueSet, ValueSetUtilities};
/// # use rust_decimal_macros::dec;
/// # let domain = Domain::new("d", [("a", ValueSet::labels(["x", "y"]))]).unwrap();
/// # let mk = |name: &str, ux, uy| LinearAdditiveUtilitySpace::new(
/// #     domain.clone(),
/// #     name,
/// #     [("a", ValueSetUtilities::labeled([("x", ux), ("y", uy)]).unwrap())],
/// #     [("a", dec!(1))],
/// #     None,
/// # ).unwrap();
/// let pareto = ParetoLinearAdditive::new(vec![
///     mk("one", dec!(1), dec!(0)),
///     mk("two", dec!(0), dec!(1)),
/// ])
/// .unwrap();
/// assert_eq!(pareto.points().len(), 2);
/// ```
#[derive(Debug)]
pub struct ParetoLinearAdditive {
    spaces: Vec<LinearAdditiveUtilitySpace>,
    points: OnceLock<BTreeSet<Bid>>,
}

impl ParetoLinearAdditive {
    /// At least two spaces are required and all must share one domain.
    pub fn new(spaces: Vec<LinearAdditiveUtilitySpace>) -> Result<Self, DomainError> {
        if spaces.len() < 2 {
            return Err(DomainError::TooFewProfiles {
                needed: 2,
                got: spaces.len(),
            });
        }
        let domain = spaces[0].domain();
        for space in &spaces {
            if space.domain() != domain {
                return Err(DomainError::ProfileDomainMismatch {
                    expected: domain.name().to_string(),
                    found: space.domain().name().to_string(),
                });
            }
        }
        Ok(Self {
            spaces,
            points: OnceLock::new(),
        })
    }

    pub fn profiles(&self) -> &[LinearAdditiveUtilitySpace] {
        &self.spaces
    }

    /// The pareto-optimal complete bids. Computed on first call, cached
    /// for the lifetime of this instance.
    pub fn points(&self) -> &BTreeSet<Bid> {
        self.points.get_or_init(|| self.compute())
    }

    fn compute(&self) -> BTreeSet<Bid> {
        let issues: Vec<String> = self.spaces[0]
            .domain()
            .issues()
            .map(String::from)
            .collect();
        PartialPareto::create(&self.spaces, &issues)
            .points()
            .iter()
            .map(|point| point.bid().clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::{Domain, Value, ValueSet};
    use crate::profile::ValueSetUtilities;
    use rust_decimal_macros::dec;

    fn two_issue_domain() -> Domain {
        Domain::new(
            "d",
            [
                ("a", ValueSet::labels(["a0", "a1"])),
                ("b", ValueSet::labels(["b0", "b1"])),
            ],
        )
        .unwrap()
    }

    fn space(
        name: &str,
        a: [(&'static str, rust_decimal::Decimal); 2],
        b: [(&'static str, rust_decimal::Decimal); 2],
    ) -> LinearAdditiveUtilitySpace {
        LinearAdditiveUtilitySpace::new(
            two_issue_domain(),
            name,
            [
                ("a", ValueSetUtilities::labeled(a).unwrap()),
                ("b", ValueSetUtilities::labeled(b).unwrap()),
            ],
            [("a", dec!(0.5)), ("b", dec!(0.5))],
            None,
        )
        .unwrap()
    }

    fn bid(a: &str, b: &str) -> Bid {
        Bid::of([
            ("a", Value::discrete(a).unwrap()),
            ("b", Value::discrete(b).unwrap()),
        ])
    }

    #[test]
    fn test_requires_two_profiles() {
        let one = space("p1", [("a0", dec!(0)), ("a1", dec!(1))], [("b0", dec!(0)), ("b1", dec!(1))]);
        assert!(matches!(
            ParetoLinearAdditive::new(vec![one]),
            Err(DomainError::TooFewProfiles { .. })
        ));
    }

    #[test]
    fn test_domains_must_match() {
        let p1 = space("p1", [("a0", dec!(0)), ("a1", dec!(1))], [("b0", dec!(0)), ("b1", dec!(1))]);
        let other_domain = Domain::new("other", [("a", ValueSet::labels(["a0"]))]).unwrap();
        let p2 = LinearAdditiveUtilitySpace::new(
            other_domain,
            "p2",
            [("a", ValueSetUtilities::labeled([("a0", dec!(1))]).unwrap())],
            [("a", dec!(1))],
            None,
        )
        .unwrap();
        assert!(matches!(
            ParetoLinearAdditive::new(vec![p1, p2]),
            Err(DomainError::ProfileDomainMismatch { .. })
        ));
    }

    #[test]
    fn test_hand_computed_frontier() {
        // profile 1 wants a1,b1; profile 2 wants a0,b1.
        // utilities (p1, p2) per bid:
        //   (a0,b0) -> (0.0, 0.5)   (a1,b0) -> (0.5, 0.0)
        //   (a0,b1) -> (0.5, 1.0)   (a1,b1) -> (1.0, 0.5)
        // (a0,b0) is dominated by (a0,b1); (a1,b0) by (a1,b1).
        let p1 = space("p1", [("a0", dec!(0)), ("a1", dec!(1))], [("b0", dec!(0)), ("b1", dec!(1))]);
        let p2 = space("p2", [("a0", dec!(1)), ("a1", dec!(0))], [("b0", dec!(0)), ("b1", dec!(1))]);
        let pareto = ParetoLinearAdditive::new(vec![p1, p2]).unwrap();
        let points = pareto.points();
        assert_eq!(points.len(), 2);
        assert!(points.contains(&bid("a0", "b1")));
        assert!(points.contains(&bid("a1", "b1")));
    }

    #[test]
    fn test_points_cached() {
        let p1 = space("p1", [("a0", dec!(0)), ("a1", dec!(1))], [("b0", dec!(0)), ("b1", dec!(1))]);
        let p2 = space("p2", [("a0", dec!(1)), ("a1", dec!(0))], [("b0", dec!(0)), ("b1", dec!(1))]);
        let pareto = ParetoLinearAdditive::new(vec![p1, p2]).unwrap();
        let first = pareto.points() as *const _;
        let second = pareto.points() as *const _;
        assert_eq!(first, second);
    }
}
