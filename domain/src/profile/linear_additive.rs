//! Linear-additive utility spaces

use super::value_utils::ValueSetUtilities;
use super::PartialOrdering;
use crate::error::DomainError;
use crate::issue::{Bid, Domain, Value};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A utility space defined as a weighted sum of per-issue preferences.
///
/// Construction guarantees:
/// - the weights sum to exactly 1
/// - the issues of the utility map and weight map match the domain
/// - each per-issue utility function fits its value set
/// - the reservation bid, when present, fits the domain
///
/// Works with complete bids; a missing issue value contributes 0.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinearAdditiveUtilitySpace {
    name: String,
    domain: Domain,
    issue_utilities: BTreeMap<String, ValueSetUtilities>,
    issue_weights: BTreeMap<String, Decimal>,
    reservation_bid: Option<Bid>,
}

impl LinearAdditiveUtilitySpace {
    pub fn new<I: Into<String>, J: Into<String>>(
        domain: Domain,
        name: impl Into<String>,
        issue_utilities: impl IntoIterator<Item = (I, ValueSetUtilities)>,
        issue_weights: impl IntoIterator<Item = (J, Decimal)>,
        reservation_bid: Option<Bid>,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(DomainError::InvalidName(name));
        }
        let issue_utilities: BTreeMap<String, ValueSetUtilities> = issue_utilities
            .into_iter()
            .map(|(i, u)| (i.into(), u))
            .collect();
        let issue_weights: BTreeMap<String, Decimal> = issue_weights
            .into_iter()
            .map(|(i, w)| (i.into(), w))
            .collect();

        check_issue_match(&domain, issue_utilities.keys(), "utilities")?;
        check_issue_match(&domain, issue_weights.keys(), "weights")?;

        for (issue, utilities) in &issue_utilities {
            // domain membership was just checked
            let values = domain.values(issue).expect("issue checked against domain");
            utilities.check_fits(values)?;
        }

        let total: Decimal = issue_weights.values().sum();
        if total != Decimal::ONE {
            return Err(DomainError::WeightsNotNormalized(total));
        }

        if let Some(bid) = &reservation_bid {
            domain
                .check_fits(bid)
                .map_err(|e| DomainError::ReservationBidNotFitting(e.to_string()))?;
        }

        Ok(Self {
            name,
            domain,
            issue_utilities,
            issue_weights,
            reservation_bid,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn reservation_bid(&self) -> Option<&Bid> {
        self.reservation_bid.as_ref()
    }

    /// The weight of `issue`. Zero for unknown issues.
    pub fn weight(&self, issue: &str) -> Decimal {
        self.issue_weights.get(issue).copied().unwrap_or(Decimal::ZERO)
    }

    /// The per-issue utility function for `issue`
    pub fn utilities(&self, issue: &str) -> Option<&ValueSetUtilities> {
        self.issue_utilities.get(issue)
    }

    /// All per-issue utility functions, in canonical issue order
    pub fn issue_utilities(&self) -> impl Iterator<Item = (&str, &ValueSetUtilities)> {
        self.issue_utilities.iter().map(|(i, u)| (i.as_str(), u))
    }

    /// All per-issue weights, in canonical issue order
    pub fn issue_weights(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.issue_weights.iter().map(|(i, w)| (i.as_str(), *w))
    }

    /// Total utility of `bid`: the weighted sum of the per-issue
    /// utilities. Issues missing from the bid contribute 0, so partial
    /// bids score partial utility.
    pub fn utility(&self, bid: &Bid) -> Decimal {
        self.issue_weights
            .keys()
            .map(|issue| self.weighted_util(issue, bid.value(issue)))
            .sum()
    }

    fn weighted_util(&self, issue: &str, value: Option<&Value>) -> Decimal {
        let Some(value) = value else {
            return Decimal::ZERO;
        };
        self.issue_weights[issue] * self.issue_utilities[issue].utility(value)
    }
}

impl PartialOrdering for LinearAdditiveUtilitySpace {
    fn domain(&self) -> &Domain {
        &self.domain
    }

    fn is_preferred_or_equal(&self, bid1: &Bid, bid2: &Bid) -> bool {
        self.utility(bid1) >= self.utility(bid2)
    }
}

impl std::fmt::Display for LinearAdditiveUtilitySpace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LinearAdditive[{},{}]", self.name, self.domain)
    }
}

fn check_issue_match<'a>(
    domain: &Domain,
    issues: impl Iterator<Item = &'a String>,
    part: &'static str,
) -> Result<(), DomainError> {
    let found: Vec<&str> = issues.map(String::as_str).collect();
    let expected: Vec<&str> = domain.issues().collect();
    if found != expected {
        return Err(DomainError::IssueSetMismatch {
            part,
            found: found.join(","),
            expected: expected.join(","),
        });
    }
    Ok(())
}
