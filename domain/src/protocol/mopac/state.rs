//! MOPAC session state

use super::party_states::PartyStates;
use super::phase::{Phase, PHASE_MAXTIME_MS, PHASE_MINTIME_MS};
use super::settings::MopacSettings;
use crate::actions::Action;
use crate::error::DomainError;
use crate::inform::Agreements;
use crate::party::PartyId;
use crate::progress::Progress;
use crate::protocol::{PartyWithProfile, ProtocolViolation, SessionResult};
use std::collections::BTreeMap;

/// The complete state of one MOPAC session.
///
/// Two lives: during setup (`phase` is None) connections are added one by
/// one; [`MopacState::init_phase`] then freezes the participant set and
/// opens the first offer phase. From then on every party event and phase
/// transition produces a replacement state.
#[derive(Debug, Clone)]
pub struct MopacState {
    phase: Option<Phase>,
    /// Actions of completed phases; a phase's agreement-producing
    /// actions are consumed by the agreement and do not show up here.
    actions: Vec<Action>,
    progress: Option<Progress>,
    settings: MopacSettings,
    party_profiles: BTreeMap<PartyId, PartyWithProfile>,
}

impl MopacState {
    /// The initial, still-connecting state.
    pub fn new(settings: MopacSettings) -> Self {
        Self {
            phase: None,
            actions: Vec::new(),
            progress: None,
            settings,
            party_profiles: BTreeMap::new(),
        }
    }

    pub fn settings(&self) -> &MopacSettings {
        &self.settings
    }

    pub fn progress(&self) -> Option<&Progress> {
        self.progress.as_ref()
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn party_profiles(&self) -> &BTreeMap<PartyId, PartyWithProfile> {
        &self.party_profiles
    }

    /// The running phase. Panics only if called before
    /// [`MopacState::init_phase`], which is a driver bug.
    pub fn phase(&self) -> &Phase {
        self.phase.as_ref().expect("phase initialized")
    }

    /// Register a connected party. Only possible while initializing.
    pub fn with_party(
        &self,
        party: PartyId,
        profile: PartyWithProfile,
    ) -> Result<MopacState, DomainError> {
        if self.phase.is_some() {
            return Err(DomainError::InvalidPartyId(
                "parties can only join while initializing".into(),
            ));
        }
        if self.party_profiles.contains_key(&party) {
            return Err(DomainError::InvalidPartyId(format!(
                "duplicate connection for party {party}"
            )));
        }
        let mut next = self.clone();
        next.party_profiles.insert(party, profile);
        Ok(next)
    }

    /// Freeze the participant set, set the progress and open the first
    /// offer phase.
    pub fn init_phase(&self, progress: Progress, now_ms: u64) -> MopacState {
        debug_assert!(
            self.phase.is_none() && self.progress.is_none(),
            "init_phase called twice"
        );
        let states = PartyStates::new(
            self.party_profiles
                .iter()
                .map(|(party, pwp)| (party.clone(), pwp.power()))
                .collect(),
        );
        let first = Phase::Offer {
            states,
            deadline_ms: now_ms + available_phase_time(&progress, now_ms),
        };
        let mut next = self.clone();
        next.phase = Some(first);
        next.progress = Some(progress);
        next
    }

    /// Feed one party action into the running phase. Illegal actions
    /// fault the offender inside the phase; this call itself never
    /// fails.
    pub fn with_action(&self, actor: &PartyId, action: Action, now_ms: u64) -> MopacState {
        let mut next = self.clone();
        next.phase = Some(self.phase().with_action(actor, action, now_ms));
        next
    }

    /// Fault a party, e.g. on a connection error.
    pub fn with_exception(&self, violation: ProtocolViolation) -> MopacState {
        let mut next = self.clone();
        next.phase = Some(self.phase().with_exception(violation));
        next
    }

    /// Wrap up the current phase: kick non-responders, collect
    /// agreements, append the phase's surviving actions to the history.
    pub fn finish_phase(&self) -> MopacState {
        let finished = self.phase().finish(self.settings.evaluator());
        let mut next = self.clone();
        next.actions.extend(finished.states().actions().iter().cloned());
        next.phase = Some(finished);
        next
    }

    /// Open the next phase. Round progress advances when an opt-in phase
    /// closes. Call only when [`MopacState::is_new_phase_possible`].
    pub fn next_phase(&self, now_ms: u64) -> MopacState {
        let progress = self.incremented_progress();
        let remaining = progress.termination_time_ms().saturating_sub(now_ms);
        let duration = remaining.min(PHASE_MAXTIME_MS);
        let mut next = self.clone();
        next.phase = Some(self.phase().next(now_ms, duration));
        next.progress = Some(progress);
        next
    }

    /// True while >= 2 parties are negotiating and the deadline leaves
    /// room for a meaningful phase.
    pub fn is_new_phase_possible(&self, now_ms: u64) -> bool {
        let progress = self.incremented_progress();
        if progress.is_past_deadline(now_ms + PHASE_MINTIME_MS) {
            return false;
        }
        self.phase().states().negotiating_parties().len() >= 2
            && available_phase_time(&progress, now_ms) > PHASE_MINTIME_MS
    }

    /// Final when the running phase is over and no further phase can
    /// start.
    pub fn is_final(&self, now_ms: u64) -> bool {
        match &self.phase {
            None => false,
            Some(phase) => phase.is_final(now_ms) && !self.is_new_phase_possible(now_ms),
        }
    }

    pub fn agreements(&self) -> Agreements {
        match &self.phase {
            Some(phase) => phase.states().agreements().clone(),
            None => Agreements::new(),
        }
    }

    pub fn result(&self) -> SessionResult {
        SessionResult {
            agreements: self.agreements(),
            error: None,
        }
    }

    /// Progress advances one round each time an opt-in phase completes.
    fn incremented_progress(&self) -> Progress {
        let progress = self.progress.expect("progress initialized");
        match self.phase {
            Some(Phase::OptIn { .. }) => progress.advance(),
            _ => progress,
        }
    }
}

/// The longest phase the remaining session time allows.
fn available_phase_time(progress: &Progress, now_ms: u64) -> u64 {
    progress
        .termination_time_ms()
        .saturating_sub(now_ms)
        .min(PHASE_MAXTIME_MS)
}
