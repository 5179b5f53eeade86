//! Divide-and-conquer partial pareto surfaces

use super::point::ParetoPoint;
use crate::issue::Bid;
use crate::profile::LinearAdditiveUtilitySpace;

/// A pareto surface over a subset of the issues: partial bids with no
/// dominator among their peers. Intermediate product of
/// [`ParetoLinearAdditive`](super::ParetoLinearAdditive).
#[derive(Debug, Clone)]
pub(crate) struct PartialPareto {
    points: Vec<ParetoPoint>,
}

impl PartialPareto {
    /// Compute the partial pareto surface for `issues`, recursively
    /// splitting the issue list in half. The merge step is where the
    /// pruning pays off: dominated combinations are dropped before they
    /// can multiply in later merges.
    pub fn create(spaces: &[LinearAdditiveUtilitySpace], issues: &[String]) -> Self {
        if issues.len() == 1 {
            let issue = &issues[0];
            let mut points: Vec<ParetoPoint> = Vec::new();
            let values = spaces[0]
                .domain()
                .values(issue)
                .expect("issues come from this domain");
            for value in values.iter() {
                let bid = Bid::of([(issue.as_str(), value)]);
                Self::add(&mut points, ParetoPoint::create(bid, spaces));
            }
            return Self { points };
        }
        let halfway = issues.len() / 2;
        Self::create(spaces, &issues[..halfway]).merge(&Self::create(spaces, &issues[halfway..]))
    }

    pub fn points(&self) -> &[ParetoPoint] {
        &self.points
    }

    /// Combine two surfaces over disjoint issue subsets: every pairwise
    /// combination is formed, but only non-dominated ones survive.
    fn merge(&self, other: &PartialPareto) -> PartialPareto {
        let mut merged: Vec<ParetoPoint> = Vec::new();
        for point in &self.points {
            for other_point in &other.points {
                let combined = point
                    .merge(other_point)
                    .expect("surfaces cover disjoint issue subsets");
                Self::add(&mut merged, combined);
            }
        }
        PartialPareto { points: merged }
    }

    /// Insert `candidate` unless an existing point dominates it; when
    /// inserted, drop the existing points it now dominates.
    fn add(points: &mut Vec<ParetoPoint>, candidate: ParetoPoint) {
        if points
            .iter()
            .any(|existing| candidate.is_dominated_by(existing))
        {
            return;
        }
        points.retain(|existing| !existing.is_dominated_by(&candidate));
        points.push(candidate);
    }
}
