//! Uniform random bidder

use super::NegotiationParty;
use parley_domain::{
    Action, AllBidsList, Inform, LinearAdditiveUtilitySpace, Parameters, PartyId, Vote, Votes,
};
use rand::Rng;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use tracing::warn;

/// Accept threshold when the `minUtility` parameter is absent
const DEFAULT_MIN_UTILITY: f64 = 0.6;

/// A party that offers uniformly random bids and accepts anything at or
/// above its utility floor. Useful as a baseline opponent and as a
/// stress source for the protocols.
pub struct RandomParty {
    parameters: Parameters,
    me: Option<PartyId>,
    profile: Option<LinearAdditiveUtilitySpace>,
    all_bids: Option<AllBidsList>,
    last_offer: Option<parley_domain::Bid>,
    last_votes: Option<Votes>,
}

impl RandomParty {
    pub fn new(parameters: Parameters) -> Self {
        Self {
            parameters,
            me: None,
            profile: None,
            all_bids: None,
            last_offer: None,
            last_votes: None,
        }
    }

    fn min_utility(&self) -> Decimal {
        let floor = self
            .parameters
            .get("minUtility")
            .and_then(|v| v.as_f64())
            .unwrap_or(DEFAULT_MIN_UTILITY);
        Decimal::from_f64(floor).unwrap_or_else(|| Decimal::new(6, 1))
    }

    fn random_bid(&self) -> Option<parley_domain::Bid> {
        let all = self.all_bids.as_ref()?;
        if all.is_empty() {
            return None;
        }
        let index = rand::thread_rng().gen_range(0..all.len());
        all.get(index)
    }

    fn on_your_turn(&mut self) -> Vec<Action> {
        let (Some(me), Some(profile)) = (&self.me, &self.profile) else {
            warn!("turn before settings, staying silent");
            return Vec::new();
        };
        if let Some(offer) = &self.last_offer {
            if profile.utility(offer) >= self.min_utility() {
                return vec![Action::Accept {
                    actor: me.clone(),
                    bid: offer.clone(),
                }];
            }
        }
        match self.random_bid() {
            Some(bid) => vec![Action::Offer {
                actor: me.clone(),
                bid,
            }],
            None => vec![Action::EndNegotiation { actor: me.clone() }],
        }
    }

    fn on_voting(&mut self, offers: &[Action]) -> Vec<Action> {
        let (Some(me), Some(profile)) = (&self.me, &self.profile) else {
            return Vec::new();
        };
        let floor = self.min_utility();
        let votes: Vec<Vote> = offers
            .iter()
            .filter_map(|offer| offer.bid())
            .filter(|bid| profile.utility(bid) >= floor)
            .filter_map(|bid| Vote::new(me.clone(), bid.clone(), 2, 9_999).ok())
            .collect();
        let mut seen = std::collections::BTreeSet::new();
        let votes: Vec<Vote> = votes
            .into_iter()
            .filter(|vote| seen.insert(vote.bid().clone()))
            .collect();
        match Votes::new(me.clone(), votes) {
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
}

impl NegotiationParty for RandomParty {
    fn notify(&mut self, inform: &Inform) -> Vec<Action> {
        match inform {
            Inform::Settings {
                party, profile, ..
            } => {
                self.me = Some(party.clone());
                self.all_bids = Some(AllBidsList::new(profile.domain()));
                self.profile = Some((**profile).clone());
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
            Inform::OptIn { .. } => match (&self.me, &self.last_votes) {
                (Some(_), Some(votes)) => vec![Action::Votes(votes.clone())],
                (Some(me), None) => Votes::new(me.clone(), [])
                    .map(|v| vec![Action::Votes(v)])
                    .unwrap_or_default(),
                _ => Vec::new(),
            },
            Inform::Finished { .. } => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_domain::{Bid, Domain, Progress, Value, ValueSet, ValueSetUtilities};
    use rust_decimal_macros::dec;

    fn profile() -> LinearAdditiveUtilitySpace {
        let domain = Domain::new(
            "d",
            [
                ("a", ValueSet::labels(["x", "y"])),
                ("b", ValueSet::labels(["1", "2"])),
            ],
        )
        .unwrap();
        LinearAdditiveUtilitySpace::new(
            domain,
            "p",
            [
                (
                    "a",
                    ValueSetUtilities::labeled([("x", dec!(1)), ("y", dec!(0))]).unwrap(),
                ),
                (
                    "b",
                    ValueSetUtilities::labeled([("1", dec!(1)), ("2", dec!(0))]).unwrap(),
                ),
            ],
            [("a", dec!(0.5)), ("b", dec!(0.5))],
            None,
        )
        .unwrap()
    }

    fn settings_inform() -> Inform {
        Inform::Settings {
            party: PartyId::new("me").unwrap(),
            profile: Box::new(profile()),
            protocol: "SAOP".into(),
            progress: Progress::Time {
                start_ms: 0,
                duration_ms: 1000,
            },
            parameters: Parameters::new(),
        }
    }

    #[test]
    fn test_offers_are_complete_bids() {
        let mut party = RandomParty::new(Parameters::new());
        party.notify(&settings_inform());
        for _ in 0..20 {
            let actions = party.notify(&Inform::YourTurn);
            match &actions[0] {
                Action::Offer { bid, .. } => {
                    assert!(profile().domain().check_complete(bid).is_ok())
                }
                other => panic!("expected offer, got {other}"),
            }
        }
    }

    #[test]
    fn test_accepts_above_floor() {
        let mut party = RandomParty::new(Parameters::new());
        party.notify(&settings_inform());
        let top = Bid::of([
            ("a", Value::discrete("x").unwrap()),
            ("b", Value::discrete("1").unwrap()),
        ]);
        party.notify(&Inform::ActionDone {
            action: Action::Offer {
                actor: PartyId::new("other").unwrap(),
                bid: top.clone(),
            },
        });
        let actions = party.notify(&Inform::YourTurn);
        assert!(matches!(&actions[0], Action::Accept { bid, .. } if bid == &top));
    }
}
