//! Party actions
//!
//! Everything a party can do in a negotiation, as one tagged sum
//! dispatched by pattern matching. Every action carries the id of the
//! acting party; protocols verify it against the connection the action
//! arrived on.

use crate::error::DomainError;
use crate::issue::Bid;
use crate::party::PartyId;
use serde::{Deserialize, Serialize};

/// An action taken by one party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    /// Propose a bid for others to accept
    Offer { actor: PartyId, bid: Bid },
    /// Agree with a previously offered bid
    Accept { actor: PartyId, bid: Bid },
    /// Walk away from the negotiation
    EndNegotiation { actor: PartyId },
    /// Conditionally accept a set of bids (MOPAC voting)
    Votes(Votes),
}

impl Action {
    /// The party that did this action
    pub fn actor(&self) -> &PartyId {
        match self {
            Action::Offer { actor, .. } => actor,
            Action::Accept { actor, .. } => actor,
            Action::EndNegotiation { actor } => actor,
            Action::Votes(votes) => votes.actor(),
        }
    }

    /// The bid this action is about, if any
    pub fn bid(&self) -> Option<&Bid> {
        match self {
            Action::Offer { bid, .. } | Action::Accept { bid, .. } => Some(bid),
            Action::EndNegotiation { .. } | Action::Votes(_) => None,
        }
    }

    /// Short action kind name for logging and violation messages
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Offer { .. } => "Offer",
            Action::Accept { .. } => "Accept",
            Action::EndNegotiation { .. } => "EndNegotiation",
            Action::Votes(_) => "Votes",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Offer { actor, bid } => write!(f, "Offer[{actor},{bid}]"),
            Action::Accept { actor, bid } => write!(f, "Accept[{actor},{bid}]"),
            Action::EndNegotiation { actor } => write!(f, "EndNegotiation[{actor}]"),
            Action::Votes(votes) => write!(f, "{votes}"),
        }
    }
}

/// A conditional accept of one bid: valid only while the total power of
/// the agreeing group lies inside `[min_power, max_power]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    actor: PartyId,
    bid: Bid,
    min_power: u32,
    max_power: u32,
}

impl Vote {
    pub fn new(actor: PartyId, bid: Bid, min_power: u32, max_power: u32) -> Result<Self, DomainError> {
        if min_power < 1 || max_power < min_power {
            return Err(DomainError::InvalidPowerWindow {
                min: min_power,
                max: max_power,
            });
        }
        Ok(Self {
            actor,
            bid,
            min_power,
            max_power,
        })
    }

    pub fn actor(&self) -> &PartyId {
        &self.actor
    }

    pub fn bid(&self) -> &Bid {
        &self.bid
    }

    pub fn min_power(&self) -> u32 {
        self.min_power
    }

    pub fn max_power(&self) -> u32 {
        self.max_power
    }
}

impl std::fmt::Display for Vote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Vote[{},{},{},{}]",
            self.actor, self.bid, self.min_power, self.max_power
        )
    }
}

/// A party's ballot: at most one [`Vote`] per bid, all by the same actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Votes {
    actor: PartyId,
    votes: Vec<Vote>,
}

impl Votes {
    pub fn new(actor: PartyId, votes: impl IntoIterator<Item = Vote>) -> Result<Self, DomainError> {
        let mut collected: Vec<Vote> = Vec::new();
        for vote in votes {
            if vote.actor() != &actor {
                return Err(DomainError::ForeignVote {
                    expected: actor.to_string(),
                    found: vote.actor().to_string(),
                });
            }
            if collected.iter().any(|v| v.bid() == vote.bid()) {
                return Err(DomainError::DuplicateVote(vote.bid().to_string()));
            }
            collected.push(vote);
        }
        Ok(Self {
            actor,
            votes: collected,
        })
    }

    pub fn actor(&self) -> &PartyId {
        &self.actor
    }

    pub fn votes(&self) -> impl Iterator<Item = &Vote> {
        self.votes.iter()
    }

    pub fn len(&self) -> usize {
        self.votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }

    /// This party's vote for `bid`, if any
    pub fn vote_for(&self, bid: &Bid) -> Option<&Vote> {
        self.votes.iter().find(|v| v.bid() == bid)
    }

    /// True iff this ballot extends `other`: same actor, and every bid
    /// voted in `other` is also voted here with an equal or wider power
    /// window. Shrinking or dropping a previous vote is not extending.
    pub fn is_extending(&self, other: &Votes) -> bool {
        if self.actor != other.actor {
            return false;
        }
        other.votes().all(|previous| {
            self.vote_for(previous.bid()).is_some_and(|mine| {
                mine.min_power() <= previous.min_power()
                    && mine.max_power() >= previous.max_power()
            })
        })
    }
}

impl std::fmt::Display for Votes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Votes[{},{} votes]", self.actor, self.votes.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::Value;

    fn party(name: &str) -> PartyId {
        PartyId::new(name).unwrap()
    }

    fn bid(label: &str) -> Bid {
        Bid::of([("issue", Value::discrete(label).unwrap())])
    }

    #[test]
    fn test_vote_power_window_validation() {
        let p = party("alice");
        assert!(Vote::new(p.clone(), bid("x"), 1, 3).is_ok());
        assert!(Vote::new(p.clone(), bid("x"), 0, 3).is_err());
        assert!(Vote::new(p, bid("x"), 3, 2).is_err());
    }

    #[test]
    fn test_votes_reject_foreign_vote() {
        let alice = party("alice");
        let bob_vote = Vote::new(party("bob"), bid("x"), 1, 2).unwrap();
        assert!(matches!(
            Votes::new(alice, [bob_vote]),
            Err(DomainError::ForeignVote { .. })
        ));
    }

    #[test]
    fn test_votes_reject_duplicate_bid() {
        let alice = party("alice");
        let v1 = Vote::new(alice.clone(), bid("x"), 1, 2).unwrap();
        let v2 = Vote::new(alice.clone(), bid("x"), 1, 5).unwrap();
        assert!(matches!(
            Votes::new(alice, [v1, v2]),
            Err(DomainError::DuplicateVote(_))
        ));
    }

    #[test]
    fn test_extending_widens_window() {
        let alice = party("alice");
        let before = Votes::new(
            alice.clone(),
            [Vote::new(alice.clone(), bid("x"), 2, 3).unwrap()],
        )
        .unwrap();
        let wider = Votes::new(
            alice.clone(),
            [
                Vote::new(alice.clone(), bid("x"), 1, 4).unwrap(),
                Vote::new(alice.clone(), bid("y"), 1, 9).unwrap(),
            ],
        )
        .unwrap();
        assert!(wider.is_extending(&before));
        assert!(!before.is_extending(&wider));
    }

    #[test]
    fn test_dropping_a_vote_is_not_extending() {
        let alice = party("alice");
        let before = Votes::new(
            alice.clone(),
            [
                Vote::new(alice.clone(), bid("x"), 1, 3).unwrap(),
                Vote::new(alice.clone(), bid("y"), 1, 3).unwrap(),
            ],
        )
        .unwrap();
        let after = Votes::new(
            alice.clone(),
            [Vote::new(alice.clone(), bid("x"), 1, 3).unwrap()],
        )
        .unwrap();
        assert!(!after.is_extending(&before));
    }

    #[test]
    fn test_shrinking_a_window_is_not_extending() {
        let alice = party("alice");
        let before = Votes::new(
            alice.clone(),
            [Vote::new(alice.clone(), bid("x"), 1, 5).unwrap()],
        )
        .unwrap();
        let shrunk = Votes::new(
            alice.clone(),
            [Vote::new(alice.clone(), bid("x"), 2, 5).unwrap()],
        )
        .unwrap();
        assert!(!shrunk.is_extending(&before));
    }

    #[test]
    fn test_action_accessors() {
        let offer = Action::Offer {
            actor: party("alice"),
            bid: bid("x"),
        };
        assert_eq!(offer.actor(), &party("alice"));
        assert_eq!(offer.bid(), Some(&bid("x")));
        assert_eq!(offer.kind(), "Offer");

        let end = Action::EndNegotiation {
            actor: party("bob"),
        };
        assert_eq!(end.bid(), None);
    }
}
