//! Time-dependent conceding party

use super::NegotiationParty;
use parley_domain::{
    Action, BidsWithUtility, Inform, Interval, LinearAdditiveUtilitySpace, Parameters, PartyId,
    Progress, Vote, Votes,
};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

/// Default concession exponent: below 1 concedes slowly (boulware)
const DEFAULT_E: f64 = 0.2;
/// Power window placed on every vote
const VOTE_MIN_POWER: u32 = 2;
const VOTE_MAX_POWER: u32 = 9_999;

/// A party that concedes utility over time.
///
/// Its target utility follows `max - (max-min) * t^(1/e)` over the
/// session progress `t`; bids are picked from the engine's interval
/// query around the target, widening the window toward the target when
/// the band is empty. Works for both SAOP (offer/accept) and MOPAC
/// (votes for every offer at or above target).
pub struct ConcederParty {
    parameters: Parameters,
    me: Option<PartyId>,
    profile: Option<LinearAdditiveUtilitySpace>,
    engine: Option<BidsWithUtility>,
    progress: Option<Progress>,
    /// standing offer by another party, SAOP only
    last_offer: Option<parley_domain::Bid>,
    /// votes placed in the current round, repeated at opt-in
    last_votes: Option<Votes>,
}

impl ConcederParty {
    pub fn new(parameters: Parameters) -> Self {
        Self {
            parameters,
            me: None,
            profile: None,
            engine: None,
            progress: None,
            last_offer: None,
            last_votes: None,
        }
    }

    fn concession_exponent(&self) -> f64 {
        self.parameters
            .get("e")
            .and_then(|v| v.as_f64())
            .filter(|e| *e > 0.0)
            .unwrap_or(DEFAULT_E)
    }

    /// Current target utility on the concession curve.
    fn target_utility(&self, engine: &BidsWithUtility) -> Decimal {
        let range = engine.range();
        let t = self
            .progress
            .as_ref()
            .map(|p| p.get(now_ms()))
            .unwrap_or(0.0);
        let concession = t.powf(1.0 / self.concession_exponent());
        let span = range.max() - range.min();
        let give = span * Decimal::from_f64(concession).unwrap_or(Decimal::ONE);
        range.max() - give
    }

    /// A bid at or above target, preferring the tight band right at the
    /// target and widening to the full remaining range when that band is
    /// empty.
    fn pick_bid(&self, engine: &BidsWithUtility, target: Decimal) -> parley_domain::Bid {
        let range = engine.range();
        let band = Interval::new(target, target + (range.max() - target) / Decimal::from(10));
        let candidates = engine.bids_in(&band);
        if let Some(bid) = candidates.get(0) {
            return bid;
        }
        let wide = engine.bids_in(&Interval::new(target, range.max()));
        match wide.get(0) {
            Some(bid) => bid,
            // empty only when target rounds above every bid
            None => engine.extreme_bid(true),
        }
    }

    fn on_your_turn(&mut self) -> Vec<Action> {
        let (Some(me), Some(profile), Some(engine)) = (&self.me, &self.profile, &self.engine)
        else {
            warn!("turn before settings, staying silent");
            return Vec::new();
        };
        let target = self.target_utility(engine);
        if let Some(offer) = &self.last_offer {
            if profile.utility(offer) >= target {
                return vec![Action::Accept {
                    actor: me.clone(),
                    bid: offer.clone(),
                }];
            }
        }
        let bid = self.pick_bid(engine, target);
        debug!(%me, %target, %bid, "conceder offering");
        vec![Action::Offer {
            actor: me.clone(),
            bid,
        }]
    }

    fn on_voting(&mut self, offers: &[Action]) -> Vec<Action> {
        let (Some(me), Some(profile), Some(engine)) = (&self.me, &self.profile, &self.engine)
        else {
            return Vec::new();
        };
        let target = self.target_utility(engine);
        let votes: Vec<Vote> = offers
            .iter()
            .filter_map(|offer| offer.bid())
            .filter(|bid| profile.utility(bid) >= target)
            .filter_map(|bid| {
                Vote::new(me.clone(), bid.clone(), VOTE_MIN_POWER, VOTE_MAX_POWER).ok()
            })
            .collect();
        match Votes::new(me.clone(), dedup_bids(votes)) {
            Ok(votes) => {
                self.last_votes = Some(votes.clone());
                vec![Action::Votes(votes)]
            }
            Err(e) => {
                warn!(error = %e, "could not build votes");
                Vec::new()
            }
        }
    }

    fn on_opt_in(&mut self) -> Vec<Action> {
        // repeat the previous ballot unchanged; repeating is a valid
        // extension
        match (&self.me, &self.last_votes) {
            (Some(me), Some(votes)) if votes.actor() == me => {
                vec![Action::Votes(votes.clone())]
            }
            (Some(me), None) => Votes::new(me.clone(), [])
                .map(|v| vec![Action::Votes(v)])
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }
}

impl NegotiationParty for ConcederParty {
    fn notify(&mut self, inform: &Inform) -> Vec<Action> {
        match inform {
            Inform::Settings {
                party,
                profile,
                progress,
                ..
            } => {
                match BidsWithUtility::create(profile) {
                    Ok(engine) => self.engine = Some(engine),
                    Err(e) => warn!(error = %e, "cannot analyze profile"),
                }
                self.me = Some(party.clone());
                self.profile = Some((**profile).clone());
                self.progress = Some(*progress);
                Vec::new()
            }
            Inform::YourTurn => self.on_your_turn(),
            Inform::ActionDone { action } => {
                if let Action::Offer { actor, bid } = action {
                    if Some(actor) != self.me.as_ref() {
                        self.last_offer = Some(bid.clone());
                    }
                }
                Vec::new()
            }
            Inform::Voting { offers, .. } => self.on_voting(offers),
            Inform::OptIn { .. } => self.on_opt_in(),
            Inform::Finished { .. } => Vec::new(),
        }
    }
}

fn dedup_bids(votes: Vec<Vote>) -> Vec<Vote> {
    let mut seen = std::collections::BTreeSet::new();
    votes
        .into_iter()
        .filter(|vote| seen.insert(vote.bid().clone()))
        .collect()
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_domain::{Bid, Domain, Value, ValueSet, ValueSetUtilities};
    use rust_decimal_macros::dec;

    fn profile() -> LinearAdditiveUtilitySpace {
        let domain = Domain::new(
            "d",
            [("a", ValueSet::labels(["bad", "mid", "good"]))],
        )
        .unwrap();
        LinearAdditiveUtilitySpace::new(
            domain,
            "p",
            [(
                "a",
                ValueSetUtilities::labeled([
                    ("bad", dec!(0)),
                    ("mid", dec!(0.5)),
                    ("good", dec!(1)),
                ])
                .unwrap(),
            )],
            [("a", dec!(1))],
            None,
        )
        .unwrap()
    }

    fn settings_inform(duration_ms: u64) -> Inform {
        Inform::Settings {
            party: PartyId::new("me").unwrap(),
            profile: Box::new(profile()),
            protocol: "SAOP".into(),
            progress: Progress::Time {
                start_ms: super::now_ms(),
                duration_ms,
            },
            parameters: Parameters::new(),
        }
    }

    fn bid(label: &str) -> Bid {
        Bid::of([("a", Value::discrete(label).unwrap())])
    }

    #[test]
    fn test_opens_with_best_bid() {
        let mut party = ConcederParty::new(Parameters::new());
        party.notify(&settings_inform(600_000));
        let actions = party.notify(&Inform::YourTurn);
        assert_eq!(actions.len(), 1);
        match &actions[0] {
            Action::Offer { bid: offered, .. } => assert_eq!(offered, &bid("good")),
            other => panic!("expected offer, got {other}"),
        }
    }

    #[test]
    fn test_accepts_good_standing_offer() {
        let mut party = ConcederParty::new(Parameters::new());
        party.notify(&settings_inform(600_000));
        party.notify(&Inform::ActionDone {
            action: Action::Offer {
                actor: PartyId::new("other").unwrap(),
                bid: bid("good"),
            },
        });
        let actions = party.notify(&Inform::YourTurn);
        assert!(matches!(&actions[0], Action::Accept { .. }));
    }

    #[test]
    fn test_rejects_bad_standing_offer_early() {
        let mut party = ConcederParty::new(Parameters::new());
        party.notify(&settings_inform(600_000));
        party.notify(&Inform::ActionDone {
            action: Action::Offer {
                actor: PartyId::new("other").unwrap(),
                bid: bid("bad"),
            },
        });
        let actions = party.notify(&Inform::YourTurn);
        assert!(matches!(&actions[0], Action::Offer { .. }));
    }

    #[test]
    fn test_votes_only_for_bids_at_target() {
        let mut party = ConcederParty::new(Parameters::new());
        party.notify(&settings_inform(600_000));
        let offers = vec![
            Action::Offer {
                actor: PartyId::new("other").unwrap(),
                bid: bid("bad"),
            },
            Action::Offer {
                actor: PartyId::new("other").unwrap(),
                bid: bid("good"),
            },
        ];
        let actions = party.notify(&Inform::Voting {
            offers,
            powers: Default::default(),
        });
        match &actions[0] {
            Action::Votes(votes) => {
                assert_eq!(votes.len(), 1);
                assert!(votes.vote_for(&bid("good")).is_some());
            }
            other => panic!("expected votes, got {other}"),
        }
    }

    #[test]
    fn test_opt_in_repeats_previous_votes() {
        let mut party = ConcederParty::new(Parameters::new());
        party.notify(&settings_inform(600_000));
        let offers = vec![Action::Offer {
            actor: PartyId::new("other").unwrap(),
            bid: bid("good"),
        }];
        let first = party.notify(&Inform::Voting {
            offers,
            powers: Default::default(),
        });
        let second = party.notify(&Inform::OptIn { votes: Vec::new() });
        assert_eq!(first, second);
    }

    #[test]
    fn test_silent_before_settings() {
        let mut party = ConcederParty::new(Parameters::new());
        assert!(party.notify(&Inform::YourTurn).is_empty());
    }

    /// Concession is monotone in time: an offer too poor for a fresh
    /// session is acceptable once the deadline looms.
    #[test]
    fn test_concedes_as_deadline_approaches() {
        let mid_offer = Inform::ActionDone {
            action: Action::Offer {
                actor: PartyId::new("other").unwrap(),
                bid: bid("mid"),
            },
        };

        let mut fresh = ConcederParty::new(Parameters::new());
        fresh.notify(&settings_inform(600_000));
        fresh.notify(&mid_offer);
        assert!(matches!(
            &fresh.notify(&Inform::YourTurn)[0],
            Action::Offer { .. }
        ));

        // same party but with virtually no time left
        let mut stale = ConcederParty::new(Parameters::new());
        stale.notify(&Inform::Settings {
            party: PartyId::new("me").unwrap(),
            profile: Box::new(profile()),
            protocol: "SAOP".into(),
            progress: Progress::Time {
                start_ms: super::now_ms().saturating_sub(600_000),
                duration_ms: 600_001,
            },
            parameters: Parameters::new(),
        });
        stale.notify(&mid_offer);
        assert!(matches!(
            &stale.notify(&Inform::YourTurn)[0],
            Action::Accept { .. }
        ));
    }
}
