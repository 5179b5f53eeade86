//! Per-issue bid-space bookkeeping

use super::interval::Interval;
use crate::issue::{Value, ValueSet};
use crate::profile::ValueSetUtilities;
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::BTreeMap;

/// All the engine needs to know about one issue: the weighted utility of
/// every value, rounded to the configured precision, and the interval
/// those utilities span.
///
/// Rounding at the precision is deliberate lossy behavior; it bounds the
/// cache-key space and may include or exclude bids whose exact utility
/// sits within one rounding step of a query boundary.
#[derive(Debug, Clone)]
pub struct IssueInfo {
    name: String,
    values: ValueSet,
    weighted_utils: BTreeMap<Value, Decimal>,
    interval: Interval,
}

impl IssueInfo {
    pub fn new(
        name: impl Into<String>,
        values: ValueSet,
        utils: &ValueSetUtilities,
        weight: Decimal,
        precision: u32,
    ) -> Self {
        let weighted_utils: BTreeMap<Value, Decimal> = values
            .iter()
            .map(|value| {
                let weighted = (utils.utility(&value) * weight)
                    .round_dp_with_strategy(precision, RoundingStrategy::MidpointNearestEven);
                (value, weighted)
            })
            .collect();
        let min = weighted_utils.values().copied().min().unwrap_or(Decimal::ZERO);
        let max = weighted_utils.values().copied().max().unwrap_or(Decimal::ZERO);
        Self {
            name: name.into(),
            values,
            weighted_utils,
            interval: Interval::new(min, max),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &ValueSet {
        &self.values
    }

    /// The weighted minimum and maximum utility achievable with this
    /// issue alone
    pub fn interval(&self) -> Interval {
        self.interval
    }

    /// Weighted utility of `value`, rounded to the engine precision.
    /// Zero for values outside the issue's value set.
    pub fn weighted_util(&self, value: &Value) -> Decimal {
        self.weighted_utils.get(value).copied().unwrap_or(Decimal::ZERO)
    }

    /// The value with maximum (or minimum) weighted utility
    pub fn extreme(&self, is_max: bool) -> Option<Value> {
        let picked = if is_max {
            self.weighted_utils.iter().max_by_key(|(_, u)| **u)
        } else {
            self.weighted_utils.iter().min_by_key(|(_, u)| **u)
        };
        picked.map(|(v, _)| v.clone())
    }

    /// All values whose weighted utility lies inside `interval`
    pub fn subset(&self, interval: &Interval) -> Vec<Value> {
        self.weighted_utils
            .iter()
            .filter(|(_, util)| interval.contains(**util))
            .map(|(value, _)| value.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn info() -> IssueInfo {
        let values = ValueSet::labels(["bad", "ok", "good"]);
        let utils = ValueSetUtilities::labeled([
            ("bad", dec!(0)),
            ("ok", dec!(0.5)),
            ("good", dec!(1)),
        ])
        .unwrap();
        IssueInfo::new("quality", values, &utils, dec!(0.4), 6)
    }

    #[test]
    fn test_weighted_utils() {
        let info = info();
        assert_eq!(info.weighted_util(&Value::discrete("ok").unwrap()), dec!(0.2));
        assert_eq!(info.weighted_util(&Value::discrete("good").unwrap()), dec!(0.4));
        assert_eq!(info.weighted_util(&Value::discrete("unknown").unwrap()), dec!(0));
    }

    #[test]
    fn test_interval_spans_values() {
        assert_eq!(info().interval(), Interval::new(dec!(0), dec!(0.4)));
    }

    #[test]
    fn test_extremes() {
        let info = info();
        assert_eq!(info.extreme(true), Some(Value::discrete("good").unwrap()));
        assert_eq!(info.extreme(false), Some(Value::discrete("bad").unwrap()));
    }

    #[test]
    fn test_subset() {
        let info = info();
        let subset = info.subset(&Interval::new(dec!(0.1), dec!(0.4)));
        assert_eq!(subset.len(), 2);
        assert!(subset.contains(&Value::discrete("ok").unwrap()));
        assert!(subset.contains(&Value::discrete("good").unwrap()));
    }

    #[test]
    fn test_rounding_at_precision() {
        let values = ValueSet::labels(["third"]);
        let utils = ValueSetUtilities::labeled([("third", dec!(0.333333333))]).unwrap();
        let info = IssueInfo::new("frac", values, &utils, dec!(1), 4);
        assert_eq!(info.weighted_util(&Value::discrete("third").unwrap()), dec!(0.3333));
    }
}
