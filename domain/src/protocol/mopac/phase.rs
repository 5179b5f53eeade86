//! MOPAC phases

use super::party_states::PartyStates;
use crate::actions::{Action, Votes};
use crate::inform::Inform;
use crate::party::PartyId;
use crate::protocol::{ProtocolViolation, ViolationKind};
use crate::voting::{CollectedVotes, VotingEvaluator};

/// Maximum duration of a single phase
pub const PHASE_MAXTIME_MS: u64 = 30_000;
/// Starting a phase shorter than this makes no sense
pub const PHASE_MINTIME_MS: u64 = 100;

/// One step of the offer / voting / opt-in cycle.
///
/// A phase always keeps itself consistent: an illegal action does not
/// fail the transition, it moves the offender into the faulted bucket of
/// the contained [`PartyStates`]. Each phase carries its own deadline in
/// ms since the epoch; the phase may end earlier (everyone acted), never
/// later.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    /// Every active party must place one offer (or walk away)
    Offer {
        states: PartyStates,
        deadline_ms: u64,
    },
    /// The collected offers are out; every party votes
    Voting {
        offers: Vec<Action>,
        states: PartyStates,
        deadline_ms: u64,
    },
    /// The collected votes are out; parties may widen their votes
    OptIn {
        votes: Vec<Votes>,
        states: PartyStates,
        deadline_ms: u64,
    },
}

impl Phase {
    pub fn states(&self) -> &PartyStates {
        match self {
            Phase::Offer { states, .. }
            | Phase::Voting { states, .. }
            | Phase::OptIn { states, .. } => states,
        }
    }

    pub fn deadline_ms(&self) -> u64 {
        match self {
            Phase::Offer { deadline_ms, .. }
            | Phase::Voting { deadline_ms, .. }
            | Phase::OptIn { deadline_ms, .. } => *deadline_ms,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Phase::Offer { .. } => "Offer",
            Phase::Voting { .. } => "Voting",
            Phase::OptIn { .. } => "OptIn",
        }
    }

    /// The announcement sent to every active party when this phase opens
    pub fn inform(&self) -> Inform {
        match self {
            Phase::Offer { .. } => Inform::YourTurn,
            Phase::Voting { offers, states, .. } => Inform::Voting {
                offers: offers.clone(),
                powers: states.powers().clone(),
            },
            Phase::OptIn { votes, .. } => Inform::OptIn {
                votes: votes.clone(),
            },
        }
    }

    /// Over when the deadline passed or every party has acted.
    pub fn is_final(&self, now_ms: u64) -> bool {
        now_ms >= self.deadline_ms() || self.states().not_yet_acted().is_empty()
    }

    /// Handle an action. A violation faults the offender; a legal action
    /// is recorded in the party states.
    pub fn with_action(&self, actor: &PartyId, action: Action, now_ms: u64) -> Phase {
        if let Err(violation) = self.check_action(actor, &action, now_ms) {
            return self.with_exception(violation);
        }
        self.replace_states(self.states().with_action(action))
    }

    /// Fault a party, e.g. for a broken connection.
    pub fn with_exception(&self, violation: ProtocolViolation) -> Phase {
        self.replace_states(self.states().with_exception(violation))
    }

    /// Wrap up: non-responders are faulted, and at opt-in finish the
    /// evaluator extracts agreements from the final votes.
    pub fn finish(&self, evaluator: &VotingEvaluator) -> Phase {
        let states = self.states().finish();
        match self {
            Phase::OptIn { .. } => {
                let ballots: Vec<Votes> = states
                    .actions()
                    .iter()
                    .filter_map(|action| match action {
                        Action::Votes(votes) => Some(votes.clone()),
                        _ => None,
                    })
                    .collect();
                let collected = CollectedVotes::new(ballots, states.powers().clone());
                let agreements = evaluator.evaluate(&collected);
                if !agreements.is_empty() {
                    tracing::debug!(count = agreements.len(), "detected new agreements");
                }
                self.replace_states(states.with_agreements(&agreements))
            }
            _ => self.replace_states(states),
        }
    }

    /// The next phase, its deadline `duration_ms` from `now_ms`. Must
    /// only be called on a finished phase; the caller guarantees the
    /// duration is within phase bounds.
    pub fn next(&self, now_ms: u64, duration_ms: u64) -> Phase {
        debug_assert!(
            (PHASE_MINTIME_MS..=PHASE_MAXTIME_MS).contains(&duration_ms),
            "illegal phase duration {duration_ms}"
        );
        debug_assert!(self.is_final(now_ms), "phase is not final");
        let deadline_ms = now_ms + duration_ms;
        match self {
            Phase::Offer { states, .. } => {
                let offers: Vec<Action> = states
                    .actions()
                    .iter()
                    .filter(|a| matches!(a, Action::Offer { .. }))
                    .cloned()
                    .collect();
                Phase::Voting {
                    offers,
                    states: states.flush(),
                    deadline_ms,
                }
            }
            Phase::Voting { states, .. } => {
                let votes: Vec<Votes> = states
                    .actions()
                    .iter()
                    .filter_map(|action| match action {
                        Action::Votes(votes) => Some(votes.clone()),
                        _ => None,
                    })
                    .collect();
                Phase::OptIn {
                    votes,
                    states: states.flush(),
                    deadline_ms,
                }
            }
            Phase::OptIn { states, .. } => Phase::Offer {
                states: states.flush(),
                deadline_ms,
            },
        }
    }

    fn replace_states(&self, states: PartyStates) -> Phase {
        let mut next = self.clone();
        match &mut next {
            Phase::Offer { states: s, .. }
            | Phase::Voting { states: s, .. }
            | Phase::OptIn { states: s, .. } => *s = states,
        }
        next
    }

    fn check_action(
        &self,
        actor: &PartyId,
        action: &Action,
        now_ms: u64,
    ) -> Result<(), ProtocolViolation> {
        if actor != action.actor() {
            return Err(
                ProtocolViolation::new(actor.clone(), ViolationKind::WrongCredentials)
                    .with_detail(format!("action by {}", action.actor())),
            );
        }
        if self.is_final(now_ms) {
            return Err(ProtocolViolation::new(
                actor.clone(),
                ViolationKind::PastDeadline,
            ));
        }
        if !self.allows(action) {
            return Err(
                ProtocolViolation::new(actor.clone(), ViolationKind::ActionNotAllowed)
                    .with_detail(format!("{} in {} phase", action.kind(), self.name())),
            );
        }
        if !self.states().not_yet_acted().contains(actor) {
            return Err(ProtocolViolation::new(
                actor.clone(),
                ViolationKind::AlreadyActed,
            ));
        }
        if let (Phase::OptIn { votes, .. }, Action::Votes(new_votes)) = (self, action) {
            // the party is active, so it voted last round
            let previous = votes.iter().find(|v| v.actor() == actor);
            if let Some(previous) = previous {
                if !new_votes.is_extending(previous) {
                    return Err(ProtocolViolation::new(
                        actor.clone(),
                        ViolationKind::NotExtending,
                    )
                    .with_detail(format!("{new_votes} does not extend {previous}")));
                }
            }
        }
        Ok(())
    }

    fn allows(&self, action: &Action) -> bool {
        match self {
            Phase::Offer { .. } => {
                matches!(action, Action::Offer { .. } | Action::EndNegotiation { .. })
            }
            Phase::Voting { .. } | Phase::OptIn { .. } => {
                matches!(action, Action::Votes(_) | Action::EndNegotiation { .. })
            }
        }
    }
}
