//! Agreement extraction strategies

use super::collected::CollectedVotes;
use crate::inform::Agreements;
use crate::issue::Bid;
use crate::party::PartyId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How a MOPAC session turns a round of votes into agreements.
///
/// # Example
///
/// ```
/// use parley_domain::VotingEvaluator;
///
/// let evaluator: VotingEvaluator = "largestAgreementsLoop".parse().unwrap();
/// assert_eq!(evaluator, VotingEvaluator::LargestAgreementsLoop);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VotingEvaluator {
    /// Take only the single consensus group with the largest total
    /// power, then stop.
    #[default]
    LargestAgreement,
    /// Iteratively peel off successive largest-power groups from the
    /// remaining parties until fewer than 2 remain.
    LargestAgreementsLoop,
}

impl VotingEvaluator {
    /// The agreements these votes produce under this strategy.
    pub fn evaluate(&self, votes: &CollectedVotes) -> Agreements {
        match self {
            VotingEvaluator::LargestAgreement => {
                match largest_agreement(votes) {
                    Some((bid, parties)) => to_agreements(&bid, &parties),
                    None => Agreements::new(),
                }
            }
            VotingEvaluator::LargestAgreementsLoop => {
                let mut agreements = Agreements::new();
                let mut remaining = votes.clone();
                while let Some((bid, parties)) = largest_agreement(&remaining) {
                    agreements = agreements
                        .merged_with(&to_agreements(&bid, &parties))
                        .expect("peeled groups are disjoint");
                    remaining = remaining.without(&parties);
                }
                agreements
            }
        }
    }
}

/// The bid with the strictly largest qualifying total power, with its
/// consensus group. None when no bid has a viable group.
fn largest_agreement(votes: &CollectedVotes) -> Option<(Bid, BTreeSet<PartyId>)> {
    votes
        .max_agreements()
        .into_iter()
        .max_by_key(|(_, parties)| votes.total_power(parties.iter()))
}

fn to_agreements(bid: &Bid, parties: &BTreeSet<PartyId>) -> Agreements {
    Agreements::of(parties.iter().map(|p| (p.clone(), bid.clone())))
}

impl std::fmt::Display for VotingEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VotingEvaluator::LargestAgreement => write!(f, "LargestAgreement"),
            VotingEvaluator::LargestAgreementsLoop => write!(f, "LargestAgreementsLoop"),
        }
    }
}

impl std::str::FromStr for VotingEvaluator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "largestagreement" => Ok(VotingEvaluator::LargestAgreement),
            "largestagreementsloop" => Ok(VotingEvaluator::LargestAgreementsLoop),
            _ => Err(format!(
                "Unknown voting evaluator: {s}. Valid: largestAgreement, largestAgreementsLoop"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{Vote, Votes};
    use crate::issue::Value;

    fn party(name: &str) -> PartyId {
        PartyId::new(name).unwrap()
    }

    fn bid(label: &str) -> Bid {
        Bid::of([("issue", Value::discrete(label).unwrap())])
    }

    fn ballot(who: &str, entries: &[(&str, u32, u32)]) -> Votes {
        let actor = party(who);
        Votes::new(
            actor.clone(),
            entries
                .iter()
                .map(|(label, min, max)| Vote::new(actor.clone(), bid(label), *min, *max).unwrap())
                .collect::<Vec<_>>(),
        )
        .unwrap()
    }

    /// powers {1,1,2}; bid x is backed by alice+bob (power 2), bid y by
    /// alice+carol (power 3): LargestAgreement must pick y.
    #[test]
    fn test_largest_agreement_picks_highest_power() {
        let collected = CollectedVotes::new(
            [
                ballot("alice", &[("x", 2, 9), ("y", 2, 9)]),
                ballot("bob", &[("x", 2, 9)]),
                ballot("carol", &[("y", 2, 9)]),
            ],
            [(party("alice"), 1), (party("bob"), 1), (party("carol"), 2)],
        );
        let agreements = VotingEvaluator::LargestAgreement.evaluate(&collected);
        assert_eq!(agreements.len(), 2);
        assert_eq!(agreements.bid_of(&party("alice")), Some(&bid("y")));
        assert_eq!(agreements.bid_of(&party("carol")), Some(&bid("y")));
        assert_eq!(agreements.bid_of(&party("bob")), None);
    }

    #[test]
    fn test_largest_agreement_stops_after_first() {
        // four parties forming two disjoint pairs; only one pair agrees
        let collected = CollectedVotes::new(
            [
                ballot("alice", &[("x", 2, 2)]),
                ballot("bob", &[("x", 2, 2)]),
                ballot("carol", &[("y", 2, 2)]),
                ballot("dave", &[("y", 2, 2)]),
            ],
            [
                (party("alice"), 1),
                (party("bob"), 1),
                (party("carol"), 1),
                (party("dave"), 1),
            ],
        );
        let agreements = VotingEvaluator::LargestAgreement.evaluate(&collected);
        assert_eq!(agreements.len(), 2);
    }

    #[test]
    fn test_loop_peels_successive_groups() {
        let collected = CollectedVotes::new(
            [
                ballot("alice", &[("x", 2, 2)]),
                ballot("bob", &[("x", 2, 2)]),
                ballot("carol", &[("y", 2, 2)]),
                ballot("dave", &[("y", 2, 2)]),
            ],
            [
                (party("alice"), 1),
                (party("bob"), 1),
                (party("carol"), 1),
                (party("dave"), 1),
            ],
        );
        let agreements = VotingEvaluator::LargestAgreementsLoop.evaluate(&collected);
        assert_eq!(agreements.len(), 4);
        assert_eq!(agreements.bid_of(&party("carol")), Some(&bid("y")));
    }

    #[test]
    fn test_no_consensus_no_agreements() {
        let collected = CollectedVotes::new(
            [ballot("alice", &[("x", 2, 9)]), ballot("bob", &[("y", 2, 9)])],
            [(party("alice"), 1), (party("bob"), 1)],
        );
        assert!(VotingEvaluator::LargestAgreement.evaluate(&collected).is_empty());
        assert!(VotingEvaluator::LargestAgreementsLoop
            .evaluate(&collected)
            .is_empty());
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            "largestAgreement".parse::<VotingEvaluator>().ok(),
            Some(VotingEvaluator::LargestAgreement)
        );
        assert!("somethingElse".parse::<VotingEvaluator>().is_err());
    }
}
