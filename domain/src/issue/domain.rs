//! Negotiation domains

use super::bid::Bid;
use super::value_set::ValueSet;
use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A named set of issues, each with its allowed values.
///
/// The bid space is the cartesian product of the per-issue value sets; its
/// size is available without enumeration via [`Domain::size`].
///
/// # Example
///
/// ```
/// use parley_domain::{Bid, Domain, Value, ValueSet};
///
/// let domain = Domain::new(
///     "jobs",
///     [("fte", ValueSet::labels(["0.5", "0.8", "1.0"]))],
/// )
/// .unwrap();
/// let bid = Bid::of([("fte", Value::discrete("0.8").unwrap())]);
/// assert!(domain.check_complete(&bid).is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Domain {
    name: String,
    issues: BTreeMap<String, ValueSet>,
}

impl Domain {
    /// Create a domain. The name must be simple (a-z, A-Z, 0-9, non-empty)
    /// and there must be at least one issue.
    pub fn new<I: Into<String>>(
        name: impl Into<String>,
        issues: impl IntoIterator<Item = (I, ValueSet)>,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(DomainError::InvalidName(name));
        }
        let issues: BTreeMap<String, ValueSet> =
            issues.into_iter().map(|(i, vs)| (i.into(), vs)).collect();
        if issues.is_empty() {
            return Err(DomainError::NoIssues);
        }
        if let Some((issue, _)) = issues.iter().find(|(_, vs)| vs.size() == 0) {
            return Err(DomainError::EmptyValueSet(issue.clone()));
        }
        Ok(Self { name, issues })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Issue names, in canonical order
    pub fn issues(&self) -> impl Iterator<Item = &str> {
        self.issues.keys().map(String::as_str)
    }

    pub fn issue_count(&self) -> usize {
        self.issues.len()
    }

    /// The allowed values for `issue`, or None for an unknown issue
    pub fn values(&self, issue: &str) -> Option<&ValueSet> {
        self.issues.get(issue)
    }

    /// Total number of complete bids: the product of the per-issue
    /// cardinalities. Can be astronomically large, hence u128.
    pub fn size(&self) -> u128 {
        self.issues
            .values()
            .map(|vs| vs.size() as u128)
            .product()
    }

    /// Check that every issue/value pair in `bid` is valid in this domain.
    /// Partial bids are fine.
    pub fn check_fits(&self, bid: &Bid) -> Result<(), DomainError> {
        for (issue, value) in bid.issue_values() {
            let values = self
                .issues
                .get(issue)
                .ok_or_else(|| DomainError::BidNotFitting(format!("unknown issue '{issue}'")))?;
            if !values.contains(value) {
                return Err(DomainError::BidNotFitting(format!(
                    "issue '{issue}' has illegal value {value}"
                )));
            }
        }
        Ok(())
    }

    /// Check that `bid` assigns a valid value to exactly the issues of
    /// this domain.
    pub fn check_complete(&self, bid: &Bid) -> Result<(), DomainError> {
        if bid.len() != self.issues.len() || !bid.issues().all(|i| self.issues.contains_key(i)) {
            return Err(DomainError::BidNotComplete(format!(
                "issues in bid ({}) do not match issues in domain ({})",
                bid.issues().collect::<Vec<_>>().join(","),
                self.issues().collect::<Vec<_>>().join(","),
            )));
        }
        self.check_fits(bid)
            .map_err(|e| DomainError::BidNotComplete(e.to_string()))
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Domain[{}]", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::Value;
    use rust_decimal_macros::dec;

    fn jobs_domain() -> Domain {
        Domain::new(
            "jobs",
            [
                ("fte", ValueSet::labels(["0.5", "0.8"])),
                ("lease", ValueSet::labels(["yes", "no"])),
                ("salary", ValueSet::numeric(dec!(2000), dec!(4000), dec!(1000))),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_bad_name_rejected() {
        assert!(matches!(
            Domain::new("has space", [("a", ValueSet::labels(["x"]))]),
            Err(DomainError::InvalidName(_))
        ));
    }

    #[test]
    fn test_empty_domain_rejected() {
        let no_issues: [(&str, ValueSet); 0] = [];
        assert_eq!(Domain::new("ok", no_issues), Err(DomainError::NoIssues));
    }

    #[test]
    fn test_empty_value_set_rejected() {
        let labels: [&str; 0] = [];
        assert_eq!(
            Domain::new("ok", [("a", ValueSet::labels(labels))]),
            Err(DomainError::EmptyValueSet("a".into()))
        );
    }

    #[test]
    fn test_size_is_product() {
        assert_eq!(jobs_domain().size(), 2 * 2 * 3);
    }

    #[test]
    fn test_fitting_partial_bid() {
        let domain = jobs_domain();
        let bid = Bid::of([("fte", Value::discrete("0.8").unwrap())]);
        assert!(domain.check_fits(&bid).is_ok());
        assert!(domain.check_complete(&bid).is_err());
    }

    #[test]
    fn test_unknown_issue_does_not_fit() {
        let domain = jobs_domain();
        let bid = Bid::of([("holidays", Value::number(dec!(25)))]);
        assert!(matches!(
            domain.check_fits(&bid),
            Err(DomainError::BidNotFitting(_))
        ));
    }

    #[test]
    fn test_complete_bid() {
        let domain = jobs_domain();
        let bid = Bid::of([
            ("fte", Value::discrete("0.5").unwrap()),
            ("lease", Value::discrete("no").unwrap()),
            ("salary", Value::number(dec!(3000))),
        ]);
        assert!(domain.check_complete(&bid).is_ok());
    }

    #[test]
    fn test_illegal_value_not_complete() {
        let domain = jobs_domain();
        let bid = Bid::of([
            ("fte", Value::discrete("0.5").unwrap()),
            ("lease", Value::discrete("maybe").unwrap()),
            ("salary", Value::number(dec!(3000))),
        ]);
        assert!(matches!(
            domain.check_complete(&bid),
            Err(DomainError::BidNotComplete(_))
        ));
    }
}
