//! Per-phase party bookkeeping

use crate::actions::Action;
use crate::inform::Agreements;
use crate::party::PartyId;
use crate::protocol::{ProtocolViolation, ViolationKind};
use std::collections::{BTreeMap, BTreeSet};

/// Where every party stands within one phase.
///
/// Invariant: each party is in exactly one bucket — not yet acted, acted
/// (its action recorded), agreed, walked away, or faulted. Phase-finish
/// moves non-responders to faulted; flush moves the acted back to
/// not-yet-acted for the next phase.
#[derive(Debug, Clone, PartialEq)]
pub struct PartyStates {
    powers: BTreeMap<PartyId, u32>,
    not_yet_acted: BTreeSet<PartyId>,
    actions: Vec<Action>,
    agreements: Agreements,
    walked_away: Vec<PartyId>,
    exceptions: BTreeMap<PartyId, ProtocolViolation>,
}

impl PartyStates {
    /// Fresh states: every party still has to act.
    pub fn new(powers: BTreeMap<PartyId, u32>) -> Self {
        Self {
            not_yet_acted: powers.keys().cloned().collect(),
            powers,
            actions: Vec::new(),
            agreements: Agreements::new(),
            walked_away: Vec::new(),
            exceptions: BTreeMap::new(),
        }
    }

    pub fn powers(&self) -> &BTreeMap<PartyId, u32> {
        &self.powers
    }

    pub fn not_yet_acted(&self) -> &BTreeSet<PartyId> {
        &self.not_yet_acted
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn agreements(&self) -> &Agreements {
        &self.agreements
    }

    pub fn walked_away(&self) -> &[PartyId] {
        &self.walked_away
    }

    pub fn exceptions(&self) -> &BTreeMap<PartyId, ProtocolViolation> {
        &self.exceptions
    }

    /// Parties still in the negotiation: not yet acted plus those whose
    /// action is recorded this phase.
    pub fn negotiating_parties(&self) -> BTreeSet<PartyId> {
        let mut parties: BTreeSet<PartyId> =
            self.actions.iter().map(|a| a.actor().clone()).collect();
        parties.extend(self.not_yet_acted.iter().cloned());
        parties
    }

    /// Record an action by an active party. Legality of the action is
    /// the phase's business; this only enforces the one-state invariant.
    /// An `EndNegotiation` walks the party away instead.
    pub fn with_action(&self, action: Action) -> PartyStates {
        debug_assert!(
            self.not_yet_acted.contains(action.actor()),
            "actor already acted: {action}"
        );
        if let Action::EndNegotiation { actor } = &action {
            return self.with_walk_away(actor);
        }
        let mut next = self.clone();
        next.not_yet_acted.remove(action.actor());
        next.actions.push(action);
        next
    }

    /// Merge newly found agreements: the agreeing parties' actions are
    /// dropped and the parties move to the agreement bucket.
    pub fn with_agreements(&self, new_agreements: &Agreements) -> PartyStates {
        let mut next = self.clone();
        next.actions
            .retain(|a| new_agreements.bid_of(a.actor()).is_none());
        next.agreements = self
            .agreements
            .merged_with(new_agreements)
            .unwrap_or_else(|_| self.agreements.clone());
        next
    }

    pub fn with_walk_away(&self, actor: &PartyId) -> PartyStates {
        debug_assert!(self.not_yet_acted.contains(actor), "actor already acted");
        let mut next = self.clone();
        next.not_yet_acted.remove(actor);
        next.walked_away.push(actor.clone());
        next
    }

    /// Move a party from active to faulted. A party that already acted
    /// is left alone: its earlier valid action stands.
    pub fn with_exception(&self, violation: ProtocolViolation) -> PartyStates {
        let Some(party) = violation.party.clone() else {
            return self.clone();
        };
        if !self.not_yet_acted.contains(&party) {
            return self.clone();
        }
        let mut next = self.clone();
        next.not_yet_acted.remove(&party);
        next.exceptions.insert(party, violation);
        next
    }

    /// Phase end: everyone who never acted is faulted with
    /// [`ViolationKind::NoAction`].
    pub fn finish(&self) -> PartyStates {
        let mut next = self.clone();
        for party in self.not_yet_acted.clone() {
            next = next.with_exception(ProtocolViolation::new(party, ViolationKind::NoAction));
        }
        next
    }

    /// Ready the states for the next phase: all parties that acted move
    /// back to not-yet-acted, the action list resets.
    pub fn flush(&self) -> PartyStates {
        debug_assert!(
            self.not_yet_acted.is_empty(),
            "some parties did not yet act"
        );
        let mut next = self.clone();
        next.not_yet_acted = self.negotiating_parties();
        next.actions = Vec::new();
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::{Bid, Value};

    fn party(name: &str) -> PartyId {
        PartyId::new(name).unwrap()
    }

    fn three_parties() -> PartyStates {
        PartyStates::new(
            [(party("p1"), 1), (party("p2"), 1), (party("p3"), 2)]
                .into_iter()
                .collect(),
        )
    }

    fn offer(who: &str) -> Action {
        Action::Offer {
            actor: party(who),
            bid: Bid::of([("a", Value::discrete("x").unwrap())]),
        }
    }

    #[test]
    fn test_action_moves_party_out_of_active() {
        let states = three_parties().with_action(offer("p1"));
        assert!(!states.not_yet_acted().contains(&party("p1")));
        assert_eq!(states.actions().len(), 1);
        assert_eq!(states.negotiating_parties().len(), 3);
    }

    #[test]
    fn test_end_negotiation_walks_away() {
        let states = three_parties().with_action(Action::EndNegotiation {
            actor: party("p2"),
        });
        assert_eq!(states.walked_away(), &[party("p2")]);
        assert_eq!(states.negotiating_parties().len(), 2);
    }

    #[test]
    fn test_finish_faults_non_responders() {
        let states = three_parties().with_action(offer("p1")).finish();
        assert!(states.not_yet_acted().is_empty());
        assert_eq!(states.exceptions().len(), 2);
        assert_eq!(
            states.exceptions()[&party("p2")].kind,
            ViolationKind::NoAction
        );
        // p1's action survives
        assert_eq!(states.actions().len(), 1);
    }

    #[test]
    fn test_exception_after_acting_is_ignored() {
        let states = three_parties().with_action(offer("p1"));
        let again = states.with_exception(ProtocolViolation::new(
            party("p1"),
            ViolationKind::ActionNotAllowed,
        ));
        assert_eq!(states, again);
    }

    #[test]
    fn test_agreements_remove_actions() {
        let states = three_parties()
            .with_action(offer("p1"))
            .with_action(offer("p2"));
        let bid = Bid::of([("a", Value::discrete("x").unwrap())]);
        let agreed = Agreements::of([(party("p1"), bid.clone()), (party("p2"), bid)]);
        let states = states.with_agreements(&agreed);
        assert!(states.actions().is_empty());
        assert_eq!(states.agreements().len(), 2);
        // agreed parties left the pool
        assert_eq!(states.negotiating_parties(), [party("p3")].into_iter().collect());
    }

    #[test]
    fn test_flush_restores_actors() {
        let states = three_parties()
            .with_action(offer("p1"))
            .with_action(offer("p2"))
            .with_action(offer("p3"))
            .flush();
        assert_eq!(states.not_yet_acted().len(), 3);
        assert!(states.actions().is_empty());
    }
}
