//! Lazily indexable bid lists
//!
//! Interval queries over a large bid space can match astronomically many
//! bids. [`BidList`] represents such result sets as a composition of
//! joins and partial-bid extensions over shared sublists, so a query
//! returns in time proportional to the search, not to the result size.
//! [`AllBidsList`] indexes the complete bid space of a domain the same
//! way, by mixed-radix decoding of a flat index.

use crate::issue::{Bid, Domain, Value, ValueSet};
use std::sync::Arc;

/// An immutable, lazily indexed list of bids.
#[derive(Debug, Clone)]
pub enum BidList {
    /// Materialized bids, the leaves of a composition
    Fixed(Vec<Bid>),
    /// Concatenation of sublists
    Joined(Vec<Arc<BidList>>),
    /// Every bid of `inner`, merged with a fixed partial bid. The issue
    /// sets are disjoint by construction.
    Extended { inner: Arc<BidList>, partial: Bid },
}

impl BidList {
    /// The empty list
    pub fn empty() -> Self {
        BidList::Fixed(Vec::new())
    }

    /// Number of bids. u128 because composed lists can exceed u64.
    pub fn len(&self) -> u128 {
        match self {
            BidList::Fixed(bids) => bids.len() as u128,
            BidList::Joined(parts) => parts.iter().map(|p| p.len()).sum(),
            BidList::Extended { inner, .. } => inner.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The bid at `index`, or None past the end
    pub fn get(&self, index: u128) -> Option<Bid> {
        match self {
            BidList::Fixed(bids) => bids.get(usize::try_from(index).ok()?).cloned(),
            BidList::Joined(parts) => {
                let mut index = index;
                for part in parts {
                    let len = part.len();
                    if index < len {
                        return part.get(index);
                    }
                    index -= len;
                }
                None
            }
            BidList::Extended { inner, partial } => {
                inner.get(index)?.merge(partial).ok()
            }
        }
    }

    /// Iterate all bids in order. Only sensible for result sets known to
    /// be small; prefer [`BidList::get`] for sampling large ones.
    pub fn iter(&self) -> BidListIter<'_> {
        BidListIter {
            list: self,
            next: 0,
            len: self.len(),
        }
    }
}

pub struct BidListIter<'a> {
    list: &'a BidList,
    next: u128,
    len: u128,
}

impl Iterator for BidListIter<'_> {
    type Item = Bid;

    fn next(&mut self) -> Option<Bid> {
        if self.next >= self.len {
            return None;
        }
        let bid = self.list.get(self.next);
        self.next += 1;
        bid
    }
}

/// The complete bid space of a domain as a lazily indexed list.
///
/// Index decoding is mixed-radix over the per-issue cardinalities; no bid
/// is ever materialized until requested.
///
/// # Example
///
/// ```
/// use parley_domain::{AllBidsList, Domain, ValueSet};
///
/// let domain = Domain::new(
///     "d",
///     [
///         ("a", ValueSet::labels(["x", "y"])),
///         ("b", ValueSet::labels(["1", "2", "3"])),
///     ],
/// )
/// .unwrap();
/// let all = AllBidsList::new(&domain);
/// assert_eq!(all.len(), 6);
/// assert!(all.iter().all(|bid| domain.check_complete(&bid).is_ok()));
/// ```
#[derive(Debug, Clone)]
pub struct AllBidsList {
    issues: Vec<(String, ValueSet)>,
}

impl AllBidsList {
    pub fn new(domain: &Domain) -> Self {
        let issues = domain
            .issues()
            .map(|issue| {
                let values = domain
                    .values(issue)
                    .expect("domain returns a value set for its own issue")
                    .clone();
                (issue.to_string(), values)
            })
            .collect();
        Self { issues }
    }

    /// Size of the full bid space
    pub fn len(&self) -> u128 {
        self.issues.iter().map(|(_, vs)| vs.size() as u128).product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The complete bid at `index`
    pub fn get(&self, index: u128) -> Option<Bid> {
        if index >= self.len() {
            return None;
        }
        let mut remainder = index;
        let mut pairs: Vec<(&str, Value)> = Vec::with_capacity(self.issues.len());
        for (issue, values) in &self.issues {
            let radix = values.size() as u128;
            let digit = (remainder % radix) as u64;
            remainder /= radix;
            pairs.push((issue.as_str(), values.get(digit)?));
        }
        Some(Bid::of(pairs))
    }

    /// Iterate the whole space. Only call on domains known to be small.
    pub fn iter(&self) -> impl Iterator<Item = Bid> + '_ {
        (0..self.len()).map_while(|i| self.get(i))
    }
}
