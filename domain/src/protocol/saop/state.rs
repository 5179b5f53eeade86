//! SAOP session state

use super::settings::SaopSettings;
use crate::actions::Action;
use crate::error::DomainError;
use crate::inform::Agreements;
use crate::issue::Bid;
use crate::party::PartyId;
use crate::progress::Progress;
use crate::protocol::{PartyWithProfile, ProtocolViolation, SessionResult, ViolationKind};
use std::collections::BTreeMap;

/// The complete state of one SAOP session. Immutable: every transition
/// returns a new state, so readers can never observe a half-applied
/// action.
///
/// Turn order is round-robin over the connected parties by
/// `actions.len() % connections.len()`. When a party is disconnected the
/// session continues with the survivors as long as at least 2 remain;
/// see the accompanying tests for that decision.
#[derive(Debug, Clone)]
pub struct SaopState {
    actions: Vec<Action>,
    connections: Vec<PartyId>,
    progress: Option<Progress>,
    settings: SaopSettings,
    party_profiles: BTreeMap<PartyId, PartyWithProfile>,
    error: Option<ProtocolViolation>,
}

impl SaopState {
    /// The initial state: no connections, no progress, nothing happened.
    pub fn new(settings: SaopSettings) -> Self {
        Self {
            actions: Vec::new(),
            connections: Vec::new(),
            progress: None,
            settings,
            party_profiles: BTreeMap::new(),
            error: None,
        }
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn connections(&self) -> &[PartyId] {
        &self.connections
    }

    pub fn progress(&self) -> Option<&Progress> {
        self.progress.as_ref()
    }

    pub fn settings(&self) -> &SaopSettings {
        &self.settings
    }

    pub fn party_profiles(&self) -> &BTreeMap<PartyId, PartyWithProfile> {
        &self.party_profiles
    }

    pub fn error(&self) -> Option<&ProtocolViolation> {
        self.error.as_ref()
    }

    /// Register a newly connected party. A second connection for the
    /// same party is refused.
    pub fn with_party(
        &self,
        party: PartyId,
        profile: PartyWithProfile,
    ) -> Result<SaopState, DomainError> {
        if self.connections.contains(&party) {
            return Err(DomainError::InvalidPartyId(format!(
                "duplicate connection for party {party}"
            )));
        }
        let mut next = self.clone();
        next.connections.push(party.clone());
        next.party_profiles.insert(party, profile);
        Ok(next)
    }

    pub fn with_progress(&self, progress: Progress) -> SaopState {
        let mut next = self.clone();
        next.progress = Some(progress);
        next
    }

    pub fn with_error(&self, error: ProtocolViolation) -> SaopState {
        let mut next = self.clone();
        next.error = Some(error);
        next
    }

    /// Remove a (kicked or disconnected) party
    pub fn without_party(&self, party: &PartyId) -> SaopState {
        let mut next = self.clone();
        next.connections.retain(|p| p != party);
        next
    }

    /// The party whose turn it is, round-robin by action count.
    pub fn next_actor(&self) -> Option<&PartyId> {
        if self.connections.is_empty() {
            return None;
        }
        self.connections
            .get(self.actions.len() % self.connections.len())
    }

    /// Validate and apply `action` by `actor`, advancing round progress
    /// when the last party in the cycle acted.
    pub fn with_action(
        &self,
        actor: &PartyId,
        action: Action,
    ) -> Result<SaopState, ProtocolViolation> {
        self.check_action(actor, &action)?;
        let mut next = self.clone();
        next.actions.push(action);
        if self.is_last_actor() {
            next.progress = self.progress.map(|p| p.advance());
        }
        Ok(next)
    }

    fn check_action(&self, actor: &PartyId, action: &Action) -> Result<(), ProtocolViolation> {
        if actor != action.actor() {
            return Err(ProtocolViolation::new(actor.clone(), ViolationKind::WrongCredentials)
                .with_detail(format!("action by {}", action.actor())));
        }
        if self.next_actor() != Some(actor) {
            return Err(ProtocolViolation::new(actor.clone(), ViolationKind::OutOfTurn));
        }
        match action {
            Action::Offer { .. } | Action::EndNegotiation { .. } => Ok(()),
            Action::Accept { bid, .. } => {
                let last = self.last_bid().ok_or_else(|| {
                    ProtocolViolation::new(actor.clone(), ViolationKind::NoRecentOffer)
                })?;
                if last != bid {
                    return Err(ProtocolViolation::new(
                        actor.clone(),
                        ViolationKind::AcceptMismatch,
                    )
                    .with_detail(format!("last offer {last}, accepted {bid}")));
                }
                Ok(())
            }
            Action::Votes(_) => Err(ProtocolViolation::new(
                actor.clone(),
                ViolationKind::ActionNotAllowed,
            )
            .with_detail("Votes is not a SAOP action")),
        }
    }

    /// The bid of the standing offer: the most recent offer at most
    /// participants-1 actions back, so a chain of accepts keeps it alive.
    fn last_bid(&self) -> Option<&Bid> {
        let lookback = self.connections.len().saturating_sub(1);
        self.actions
            .iter()
            .rev()
            .take(lookback)
            .find_map(|action| match action {
                Action::Offer { bid, .. } => Some(bid),
                _ => None,
            })
    }

    fn is_last_actor(&self) -> bool {
        let n = self.connections.len();
        n > 0 && self.actions.len() % n == n - 1
    }

    /// The agreements in this state: non-empty exactly when the last
    /// `n` actions are one offer followed by `n-1` accepts of its bid,
    /// with `n` the number of connected parties. All connected parties
    /// then share the agreement.
    pub fn agreements(&self) -> Agreements {
        let n = self.connections.len();
        if n < 2 || self.actions.len() < n {
            return Agreements::new();
        }
        let offer_bid = match &self.actions[self.actions.len() - n] {
            Action::Offer { bid, .. } => bid,
            _ => return Agreements::new(),
        };
        let all_accept = self.actions[self.actions.len() - (n - 1)..]
            .iter()
            .all(|action| matches!(action, Action::Accept { bid, .. } if bid == offer_bid));
        if !all_accept {
            return Agreements::new();
        }
        Agreements::of(
            self.connections
                .iter()
                .map(|party| (party.clone(), offer_bid.clone())),
        )
    }

    /// Final when an error occurred, the deadline passed, an agreement
    /// exists or somebody ended the negotiation.
    pub fn is_final(&self, now_ms: u64) -> bool {
        self.error.is_some()
            || self
                .progress
                .as_ref()
                .is_some_and(|p| p.is_past_deadline(now_ms))
            || !self.agreements().is_empty()
            || matches!(self.actions.last(), Some(Action::EndNegotiation { .. }))
    }

    pub fn result(&self) -> SessionResult {
        SessionResult {
            agreements: self.agreements(),
            error: self.error.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::{Domain, Value, ValueSet};
    use crate::profile::{LinearAdditiveUtilitySpace, ValueSetUtilities};
    use crate::progress::Deadline;
    use rust_decimal_macros::dec;

    fn profile() -> LinearAdditiveUtilitySpace {
        let domain = Domain::new("d", [("a", ValueSet::labels(["x", "y"]))]).unwrap();
        LinearAdditiveUtilitySpace::new(
            domain,
            "p",
            [(
                "a",
                ValueSetUtilities::labeled([("x", dec!(1)), ("y", dec!(0))]).unwrap(),
            )],
            [("a", dec!(1))],
            None,
        )
        .unwrap()
    }

    fn party(name: &str) -> PartyId {
        PartyId::new(name).unwrap()
    }

    fn bid(label: &str) -> Bid {
        Bid::of([("a", Value::discrete(label).unwrap())])
    }

    fn connected_state(names: &[&str]) -> SaopState {
        let settings = SaopSettings::new(
            names
                .iter()
                .map(|_| PartyWithProfile::new("builtin", profile()))
                .collect(),
            Deadline::Time { duration_ms: 1000 },
        )
        .unwrap();
        let mut state = SaopState::new(settings);
        for name in names {
            state = state
                .with_party(party(name), PartyWithProfile::new("builtin", profile()))
                .unwrap();
        }
        state.with_progress(Progress::Time {
            start_ms: 0,
            duration_ms: 1000,
        })
    }

    fn offer(who: &str, label: &str) -> Action {
        Action::Offer {
            actor: party(who),
            bid: bid(label),
        }
    }

    fn accept(who: &str, label: &str) -> Action {
        Action::Accept {
            actor: party(who),
            bid: bid(label),
        }
    }

    #[test]
    fn test_duplicate_connection_refused() {
        let state = connected_state(&["p1", "p2"]);
        assert!(state
            .with_party(party("p1"), PartyWithProfile::new("builtin", profile()))
            .is_err());
    }

    #[test]
    fn test_turn_order_round_robin() {
        let state = connected_state(&["p1", "p2", "p3"]);
        assert_eq!(state.next_actor(), Some(&party("p1")));
        let state = state.with_action(&party("p1"), offer("p1", "x")).unwrap();
        assert_eq!(state.next_actor(), Some(&party("p2")));
    }

    #[test]
    fn test_out_of_turn_is_violation() {
        let state = connected_state(&["p1", "p2", "p3"]);
        let violation = state
            .with_action(&party("p2"), offer("p2", "x"))
            .unwrap_err();
        assert_eq!(violation.kind, ViolationKind::OutOfTurn);
        assert_eq!(violation.party, Some(party("p2")));
    }

    /// The scripted sequence from the protocol description: Offer(B1) by
    /// P1, Offer(B2) by P2, Accept(B2) by P3, Accept(B2) by P1. No
    /// agreement after 3 actions, unanimous agreement on B2 after the 4th.
    #[test]
    fn test_agreement_after_unanimous_accept() {
        let state = connected_state(&["p1", "p2", "p3"]);
        let state = state.with_action(&party("p1"), offer("p1", "x")).unwrap();
        let state = state.with_action(&party("p2"), offer("p2", "y")).unwrap();
        let state = state.with_action(&party("p3"), accept("p3", "y")).unwrap();
        assert!(state.agreements().is_empty());
        assert!(!state.is_final(10));

        let state = state.with_action(&party("p1"), accept("p1", "y")).unwrap();
        let agreements = state.agreements();
        assert_eq!(agreements.len(), 3);
        for name in ["p1", "p2", "p3"] {
            assert_eq!(agreements.bid_of(&party(name)), Some(&bid("y")));
        }
        assert!(state.is_final(10));
    }

    #[test]
    fn test_accept_mismatch_is_violation() {
        let state = connected_state(&["p1", "p2"]);
        let state = state.with_action(&party("p1"), offer("p1", "x")).unwrap();
        let violation = state
            .with_action(&party("p2"), accept("p2", "y"))
            .unwrap_err();
        assert_eq!(violation.kind, ViolationKind::AcceptMismatch);
        assert_eq!(violation.party, Some(party("p2")));
        // the state is unchanged, so no agreement can have formed
        assert!(state.agreements().is_empty());
    }

    #[test]
    fn test_accept_without_offer_is_violation() {
        let state = connected_state(&["p1", "p2"]);
        let violation = state
            .with_action(&party("p1"), accept("p1", "x"))
            .unwrap_err();
        assert_eq!(violation.kind, ViolationKind::NoRecentOffer);
    }

    #[test]
    fn test_votes_not_allowed() {
        use crate::actions::{Vote, Votes};
        let state = connected_state(&["p1", "p2"]);
        let votes = Votes::new(
            party("p1"),
            [Vote::new(party("p1"), bid("x"), 1, 2).unwrap()],
        )
        .unwrap();
        let violation = state
            .with_action(&party("p1"), Action::Votes(votes))
            .unwrap_err();
        assert_eq!(violation.kind, ViolationKind::ActionNotAllowed);
    }

    #[test]
    fn test_end_negotiation_is_final() {
        let state = connected_state(&["p1", "p2"]);
        let state = state
            .with_action(
                &party("p1"),
                Action::EndNegotiation { actor: party("p1") },
            )
            .unwrap();
        assert!(state.is_final(10));
        assert!(state.agreements().is_empty());
    }

    #[test]
    fn test_deadline_makes_final() {
        let state = connected_state(&["p1", "p2"]);
        assert!(!state.is_final(1000));
        assert!(state.is_final(1001));
    }

    /// Decision for the open question: after a kick the session goes on
    /// with the survivors when at least 2 remain. The turn index is
    /// recomputed over the shrunk connection list.
    #[test]
    fn test_survivors_continue_after_disconnect() {
        let state = connected_state(&["p1", "p2", "p3"]);
        let state = state.with_action(&party("p1"), offer("p1", "x")).unwrap();
        let state = state.without_party(&party("p2"));
        assert_eq!(state.connections().len(), 2);
        assert!(!state.is_final(10));
        // 1 action done, 2 parties left: turn belongs to p3
        assert_eq!(state.next_actor(), Some(&party("p3")));
        let state = state.with_action(&party("p3"), accept("p3", "x")).unwrap();
        // offer + accept by everyone else: agreement among survivors
        assert_eq!(state.agreements().len(), 2);
    }

    #[test]
    fn test_error_state_is_final_and_reported() {
        let state = connected_state(&["p1", "p2"]);
        let violation = ProtocolViolation::new(party("p1"), ViolationKind::MalformedAction);
        let state = state.with_error(violation.clone());
        assert!(state.is_final(0));
        assert_eq!(state.result().error, Some(violation));
    }
}
