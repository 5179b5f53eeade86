//! Collected ballots of one voting round

use crate::actions::{Vote, Votes};
use crate::issue::Bid;
use crate::party::PartyId;
use std::collections::{BTreeMap, BTreeSet};

/// All ballots collected in one round, with the parties' voting powers.
///
/// Consensus-subset search enumerates subsets of the votes per bid and is
/// exponential in the number of voters; fine for realistic sessions
/// (documented up to ~10 parties).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedVotes {
    votes: BTreeMap<PartyId, Votes>,
    powers: BTreeMap<PartyId, u32>,
}

impl CollectedVotes {
    /// `powers` may cover more parties than `votes`, never fewer.
    pub fn new(
        votes: impl IntoIterator<Item = Votes>,
        powers: impl IntoIterator<Item = (PartyId, u32)>,
    ) -> Self {
        let votes: BTreeMap<PartyId, Votes> = votes
            .into_iter()
            .map(|v| (v.actor().clone(), v))
            .collect();
        let powers: BTreeMap<PartyId, u32> = powers.into_iter().collect();
        debug_assert!(
            votes.keys().all(|p| powers.contains_key(p)),
            "every voting party must have a power"
        );
        Self { votes, powers }
    }

    pub fn votes(&self) -> &BTreeMap<PartyId, Votes> {
        &self.votes
    }

    pub fn powers(&self) -> &BTreeMap<PartyId, u32> {
        &self.powers
    }

    /// These votes without the given parties
    pub fn without(&self, parties: &BTreeSet<PartyId>) -> CollectedVotes {
        CollectedVotes {
            votes: self
                .votes
                .iter()
                .filter(|(p, _)| !parties.contains(*p))
                .map(|(p, v)| (p.clone(), v.clone()))
                .collect(),
            powers: self
                .powers
                .iter()
                .filter(|(p, _)| !parties.contains(*p))
                .map(|(p, w)| (p.clone(), *w))
                .collect(),
        }
    }

    /// Combined voting power of `parties`
    pub fn total_power<'a>(&self, parties: impl IntoIterator<Item = &'a PartyId>) -> u32 {
        parties
            .into_iter()
            .map(|p| self.powers.get(p).copied().unwrap_or(0))
            .sum()
    }

    /// All bids that received votes, with the votes per bid
    pub fn all_bids(&self) -> BTreeMap<Bid, Vec<Vote>> {
        let mut bids: BTreeMap<Bid, Vec<Vote>> = BTreeMap::new();
        for votes in self.votes.values() {
            for vote in votes.votes() {
                bids.entry(vote.bid().clone()).or_default().push(vote.clone());
            }
        }
        bids
    }

    /// Per bid, the satisfied voter subset with maximum total power.
    /// Bids with no viable subset at all are absent from the result.
    pub fn max_agreements(&self) -> BTreeMap<Bid, BTreeSet<PartyId>> {
        let mut agreements = BTreeMap::new();
        for (bid, votes) in self.all_bids() {
            let group = self.max_power_group(&votes);
            if !group.is_empty() {
                agreements.insert(bid, group);
            }
        }
        agreements
    }

    /// The maximum-power viable subset of `votes`, all for one bid.
    /// Empty when no subset is viable. Exponential subset walk.
    fn max_power_group(&self, votes: &[Vote]) -> BTreeSet<PartyId> {
        let mut max_group = BTreeSet::new();
        let mut max_power = 0;
        // subsets by bitmask; the empty subset is never viable
        for mask in 1u64..(1u64 << votes.len()) {
            let subset: Vec<&Vote> = votes
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, v)| v)
                .collect();
            if !self.is_viable(&subset) {
                continue;
            }
            let parties: BTreeSet<PartyId> =
                subset.iter().map(|v| v.actor().clone()).collect();
            let power = self.total_power(&parties);
            if power > max_power {
                max_power = power;
                max_group = parties;
            }
        }
        max_group
    }

    /// A vote subset is viable when at least 2 parties are in it and the
    /// group's total power lies inside every member's power window.
    fn is_viable(&self, votes: &[&Vote]) -> bool {
        let parties: BTreeSet<&PartyId> = votes.iter().map(|v| v.actor()).collect();
        if parties.len() < 2 {
            return false;
        }
        let total = self.total_power(parties.into_iter());
        let min_needed = votes.iter().map(|v| v.min_power()).max().unwrap_or(0);
        let max_allowed = votes.iter().map(|v| v.max_power()).min().unwrap_or(u32::MAX);
        total >= min_needed && total <= max_allowed
    }
}
