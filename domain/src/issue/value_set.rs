//! Per-issue value sets
//!
//! Either an explicit list of discrete values or a numeric range enumerated
//! lazily by index. Both variants are ordered, finite and indexable, which
//! is what lets the bid-space engine walk issue values without allocating.

use super::value::Value;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The allowed values for a single issue.
///
/// # Example
///
/// ```
/// use parley_domain::ValueSet;
/// use rust_decimal_macros::dec;
///
/// let prices = ValueSet::numeric(dec!(100), dec!(200), dec!(50));
/// assert_eq!(prices.size(), 3);
/// assert_eq!(prices.get(2).unwrap().as_number(), Some(dec!(200)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueSet {
    /// Explicit discrete values, deduplicated, in insertion order
    Discrete { values: Vec<Value> },
    /// Numbers from `low` to at most `high` in increments of `step`
    NumberRange {
        low: Decimal,
        high: Decimal,
        step: Decimal,
    },
}

impl ValueSet {
    /// Create a discrete value set. Duplicates are dropped, first
    /// occurrence wins.
    pub fn discrete(values: impl IntoIterator<Item = Value>) -> Self {
        let mut deduped: Vec<Value> = Vec::new();
        for value in values {
            if !deduped.contains(&value) {
                deduped.push(value);
            }
        }
        ValueSet::Discrete { values: deduped }
    }

    /// Convenience constructor for discrete labels
    pub fn labels<S: Into<String>>(labels: impl IntoIterator<Item = S>) -> Self {
        Self::discrete(labels.into_iter().map(|l| Value::Discrete(l.into())))
    }

    /// Create a numeric range set `[low, low+step, ...]` bounded by `high`
    pub fn numeric(low: Decimal, high: Decimal, step: Decimal) -> Self {
        ValueSet::NumberRange { low, high, step }
    }

    /// Number of values in this set
    pub fn size(&self) -> u64 {
        match self {
            ValueSet::Discrete { values } => values.len() as u64,
            ValueSet::NumberRange { low, high, step } => {
                if low > high || *step <= Decimal::ZERO {
                    0
                } else {
                    1 + ((high - low) / step).floor().to_u64().unwrap_or(u64::MAX - 1)
                }
            }
        }
    }

    /// The value at `index`, or None past the end
    pub fn get(&self, index: u64) -> Option<Value> {
        if index >= self.size() {
            return None;
        }
        match self {
            ValueSet::Discrete { values } => values.get(index as usize).cloned(),
            ValueSet::NumberRange { low, step, .. } => {
                Some(Value::Number(low + step * Decimal::from(index)))
            }
        }
    }

    /// True iff `value` is a member of this set
    pub fn contains(&self, value: &Value) -> bool {
        match self {
            ValueSet::Discrete { values } => values.contains(value),
            ValueSet::NumberRange { low, high, step } => match value.as_number() {
                None => false,
                Some(x) => {
                    *step > Decimal::ZERO
                        && x >= *low
                        && x <= *high
                        && ((x - low) % step) == Decimal::ZERO
                }
            },
        }
    }

    /// Iterate over all values in order
    pub fn iter(&self) -> impl Iterator<Item = Value> + '_ {
        (0..self.size()).map_while(|i| self.get(i))
    }
}

impl std::fmt::Display for ValueSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSet::Discrete { values } => {
                write!(f, "{{")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "}}")
            }
            ValueSet::NumberRange { low, high, step } => {
                write!(f, "[{}..{} step {}]", low, high, step)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_discrete_dedup_keeps_order() {
        let set = ValueSet::labels(["red", "green", "red", "blue"]);
        assert_eq!(set.size(), 3);
        assert_eq!(set.get(0), Some(Value::Discrete("red".into())));
        assert_eq!(set.get(2), Some(Value::Discrete("blue".into())));
    }

    #[test]
    fn test_numeric_enumeration() {
        let set = ValueSet::numeric(dec!(1.0), dec!(2.0), dec!(0.4));
        // 1.0, 1.4, 1.8
        assert_eq!(set.size(), 3);
        assert_eq!(set.get(1).unwrap().as_number(), Some(dec!(1.4)));
        assert_eq!(set.get(3), None);
    }

    #[test]
    fn test_numeric_empty_when_inverted() {
        let set = ValueSet::numeric(dec!(5), dec!(1), dec!(1));
        assert_eq!(set.size(), 0);
        assert_eq!(set.get(0), None);
    }

    #[test]
    fn test_numeric_empty_when_step_is_not_positive() {
        let set = ValueSet::numeric(dec!(1), dec!(5), dec!(0));
        assert_eq!(set.size(), 0);
        assert!(!set.contains(&Value::number(dec!(1))));
    }

    #[test]
    fn test_numeric_contains_respects_step() {
        let set = ValueSet::numeric(dec!(0), dec!(10), dec!(2));
        assert!(set.contains(&Value::number(dec!(4))));
        assert!(!set.contains(&Value::number(dec!(5))));
        assert!(!set.contains(&Value::number(dec!(12))));
        assert!(!set.contains(&Value::Discrete("4".into())));
    }

    #[test]
    fn test_iter_matches_get() {
        let set = ValueSet::numeric(dec!(0), dec!(1), dec!(0.25));
        let collected: Vec<Value> = set.iter().collect();
        assert_eq!(collected.len(), 5);
        assert_eq!(collected[4].as_number(), Some(dec!(1.0)));
    }
}
