//! Bids
//!
//! A bid assigns one value to some subset of a domain's issues. Partial
//! bids are first-class: the bid-space engine builds complete bids by
//! merging partial bids with disjoint issue sets.

use super::value::Value;
use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An assignment of values to issues, possibly partial.
///
/// Immutable; issue order is canonical (sorted by issue name) so that
/// equality and hashing are stable regardless of construction order.
///
/// # Example
///
/// ```
/// use parley_domain::{Bid, Value};
///
/// let fruit = Bid::of([("fruit", Value::discrete("apple").unwrap())]);
/// let juice = Bid::of([("juice", Value::discrete("none").unwrap())]);
/// let both = fruit.merge(&juice).unwrap();
/// assert_eq!(both.issues().count(), 2);
/// assert!(fruit.merge(&fruit).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Bid {
    issue_values: BTreeMap<String, Value>,
}

impl Bid {
    /// Create a bid from issue/value pairs. Later duplicates overwrite
    /// earlier ones.
    pub fn of<I: Into<String>>(pairs: impl IntoIterator<Item = (I, Value)>) -> Self {
        Self {
            issue_values: pairs.into_iter().map(|(i, v)| (i.into(), v)).collect(),
        }
    }

    /// The empty bid (no issues assigned)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Iterate the issue names in this bid
    pub fn issues(&self) -> impl Iterator<Item = &str> {
        self.issue_values.keys().map(String::as_str)
    }

    /// The value for `issue`, or None if this bid does not assign it
    pub fn value(&self, issue: &str) -> Option<&Value> {
        self.issue_values.get(issue)
    }

    /// All issue/value pairs, in canonical order
    pub fn issue_values(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.issue_values.iter().map(|(i, v)| (i.as_str(), v))
    }

    /// Number of issues assigned by this bid
    pub fn len(&self) -> usize {
        self.issue_values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issue_values.is_empty()
    }

    /// Combine this partial bid with another partial bid.
    ///
    /// The issue sets must be disjoint; overlap is a
    /// [`DomainError::OverlappingIssues`].
    pub fn merge(&self, other: &Bid) -> Result<Bid, DomainError> {
        let overlap: Vec<&str> = self
            .issue_values
            .keys()
            .filter(|issue| other.issue_values.contains_key(*issue))
            .map(String::as_str)
            .collect();
        if !overlap.is_empty() {
            return Err(DomainError::OverlappingIssues(overlap.join(",")));
        }
        let mut merged = self.issue_values.clone();
        merged.extend(other.issue_values.clone());
        Ok(Bid {
            issue_values: merged,
        })
    }
}

impl std::fmt::Display for Bid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Bid{{")?;
        for (i, (issue, value)) in self.issue_values.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}:{}", issue, value)?;
        }
        write!(f, "}}")
    }
}
