//! Interval queries over a bid space
//!
//! [`BidsWithUtility`] answers "which bids score inside `[a,b]`?" for a
//! linear-additive space without walking the cartesian product. The search
//! decomposes by issue: fixing one issue's value shifts the target
//! interval by that value's weighted utility, so a d-dimensional search
//! becomes d one-dimensional scans joined by interval arithmetic, with a
//! cache collapsing repeated subgoals.

use super::bid_list::BidList;
use super::interval::Interval;
use super::issue_info::IssueInfo;
use crate::error::DomainError;
use crate::issue::Bid;
use crate::profile::LinearAdditiveUtilitySpace;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Default digit precision. Suits the common range of issue counts,
/// utilities and weights.
pub const DEFAULT_PRECISION: u32 = 6;

/// Caching utility-interval query engine for one linear-additive space.
///
/// Reuse one instance to benefit from the cache; discard it when the
/// underlying utility space changes, since cached sublists would go
/// stale.
///
/// # Rounding
///
/// All weighted utilities are rounded to the configured precision. Bids
/// whose exact utility lies within one rounding step of a query boundary
/// may be included or excluded; callers needing exact boundary semantics
/// must pick the precision accordingly. Memory and time are bounded by
/// the number of distinct (issue, interval) subgoals, roughly
/// O(issues × 10^precision) in the worst case.
///
/// # Example
///
/// ```
/// use parley_domain::{BidsWithUtility, Interval};
/// # use parley_domain::{Domain, LinearAdditiveUtilitySpace, ValueSet, ValueSetUtilities};
/// # use rust_decimal_macros::dec;
/// # let domain = Domain::new("d", [("a", ValueSet::labels(["x", "y"]))]).unwrap();
/// # let profile = LinearAdditiveUtilitySpace::new(
/// #     domain,
/// #     "p",
/// #     [("a", ValueSetUtilities::labeled([("x", dec!(0)), ("y", dec!(1))]).unwrap())],
/// #     [("a", dec!(1))],
/// #     None,
/// # ).unwrap();
///
/// let engine = BidsWithUtility::create(&profile).unwrap();
/// let range = engine.range();
/// let top = engine.bids_in(&Interval::new(range.max(), range.max()));
/// assert_eq!(top.len(), 1);
/// ```
#[derive(Debug)]
pub struct BidsWithUtility {
    issue_info: Vec<IssueInfo>,
    precision: u32,
    // key = (issue prefix length - 1, pruned rounded goal); populated
    // after pruning so unreachable goals cache as empty
    cache: Mutex<HashMap<(usize, Interval), Arc<BidList>>>,
}

impl BidsWithUtility {
    /// Build an engine with [`DEFAULT_PRECISION`]
    pub fn create(space: &LinearAdditiveUtilitySpace) -> Result<Self, DomainError> {
        Self::with_precision(space, DEFAULT_PRECISION)
    }

    /// Build an engine with an explicit digit precision
    pub fn with_precision(
        space: &LinearAdditiveUtilitySpace,
        precision: u32,
    ) -> Result<Self, DomainError> {
        let issue_info: Vec<IssueInfo> = space
            .domain()
            .issues()
            .map(|issue| {
                let values = space
                    .domain()
                    .values(issue)
                    .expect("domain returns a value set for its own issue")
                    .clone();
                let utils = space
                    .utilities(issue)
                    .expect("space has utilities for every domain issue");
                IssueInfo::new(issue, values, utils, space.weight(issue), precision)
            })
            .collect();
        if issue_info.is_empty() {
            return Err(DomainError::NoIssues);
        }
        Ok(Self {
            issue_info,
            precision,
            cache: Mutex::new(HashMap::new()),
        })
    }

    /// The achievable (rounded) utility interval of the whole space
    pub fn range(&self) -> Interval {
        self.range_upto(self.issue_info.len() - 1)
    }

    /// All bids whose rounded utility lies inside `goal`, both ends
    /// inclusive. Possibly empty; never an error.
    pub fn bids_in(&self, goal: &Interval) -> Arc<BidList> {
        self.get(self.issue_info.len() - 1, goal.round(self.precision))
    }

    /// The single bid extremizing utility: the maximum when `is_max`,
    /// else the minimum.
    pub fn extreme_bid(&self, is_max: bool) -> Bid {
        let mut extreme = Bid::empty();
        for info in &self.issue_info {
            let value = info
                .extreme(is_max)
                .expect("issue value sets are non-empty by construction");
            let one = Bid::of([(info.name(), value)]);
            extreme = extreme
                .merge(&one)
                .expect("issues are distinct within a domain");
        }
        extreme
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    /// Partial-bid query considering only issues `0..=n`.
    fn get(&self, n: usize, goal: Interval) -> Arc<BidList> {
        // prune to what is reachable BEFORE consulting the cache, so
        // equivalent goals share an entry and unreachable goals cache as
        // a single empty list
        let goal = goal.intersect(&self.range_upto(n));

        let key = (n, goal);
        if let Some(hit) = self.cache.lock().expect("bidspace cache lock").get(&key) {
            return Arc::clone(hit);
        }

        let result = if goal.is_empty() {
            Arc::new(BidList::empty())
        } else {
            Arc::new(self.checked_get(n, &goal))
        };

        self.cache
            .lock()
            .expect("bidspace cache lock")
            .insert(key, Arc::clone(&result));
        result
    }

    fn checked_get(&self, n: usize, goal: &Interval) -> BidList {
        let info = &self.issue_info[n];

        if n == 0 {
            let bids: Vec<Bid> = info
                .subset(goal)
                .into_iter()
                .map(|value| Bid::of([(info.name(), value)]))
                .collect();
            return BidList::Fixed(bids);
        }

        let mut parts: Vec<Arc<BidList>> = Vec::new();
        for value in info.values().iter() {
            let subgoal = goal.subtract(info.weighted_util(&value));
            let partial_bids = self.get(n - 1, subgoal);
            if partial_bids.is_empty() {
                continue;
            }
            parts.push(Arc::new(BidList::Extended {
                inner: partial_bids,
                partial: Bid::of([(info.name(), value)]),
            }));
        }
        BidList::Joined(parts)
    }

    /// Sum of the per-issue intervals of issues `0..=n`
    fn range_upto(&self, n: usize) -> Interval {
        self.issue_info[..=n]
            .iter()
            .fold(Interval::ZERO, |acc, info| acc.add(&info.interval()))
    }
}
