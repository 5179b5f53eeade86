//! Per-issue utility functions

use crate::error::DomainError;
use crate::issue::{Value, ValueSet};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Internal rounding of interpolated utilities, enough headroom for any
/// engine precision.
const INTERPOLATION_DIGITS: u32 = 8;

/// Maps the values of one issue to utilities in [0,1].
///
/// Mirrors [`ValueSet`]: an explicit per-value table for discrete issues,
/// two-point linear interpolation for numeric ranges.
///
/// # Example
///
/// ```
/// use parley_domain::{Value, ValueSetUtilities};
/// use rust_decimal_macros::dec;
///
/// let utils = ValueSetUtilities::numeric(dec!(0), dec!(0), dec!(10), dec!(1)).unwrap();
/// assert_eq!(utils.utility(&Value::number(dec!(5))), dec!(0.5));
/// // out of range scores zero
/// assert_eq!(utils.utility(&Value::number(dec!(11))), dec!(0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueSetUtilities {
    /// Utility per discrete value; unlisted values score 0
    DiscreteUtilities { utilities: BTreeMap<Value, Decimal> },
    /// Linear interpolation between (low_value, low_utility) and
    /// (high_value, high_utility); values outside the range score 0
    #[serde(rename_all = "camelCase")]
    NumberUtilities {
        low_value: Decimal,
        low_utility: Decimal,
        high_value: Decimal,
        high_utility: Decimal,
    },
}

impl ValueSetUtilities {
    /// Create a discrete utility table. All utilities must be in [0,1].
    pub fn discrete<V: Into<Value>>(
        utilities: impl IntoIterator<Item = (V, Decimal)>,
    ) -> Result<Self, DomainError> {
        let utilities: BTreeMap<Value, Decimal> = utilities
            .into_iter()
            .map(|(v, u)| (v.into(), u))
            .collect();
        for utility in utilities.values() {
            check_in_zero_one(*utility)?;
        }
        Ok(ValueSetUtilities::DiscreteUtilities { utilities })
    }

    /// Convenience constructor taking discrete labels
    pub fn labeled<S: Into<String>>(
        utilities: impl IntoIterator<Item = (S, Decimal)>,
    ) -> Result<Self, DomainError> {
        Self::discrete(
            utilities
                .into_iter()
                .map(|(l, u)| (Value::Discrete(l.into()), u)),
        )
    }

    /// Create a numeric two-point interpolation. Both utilities must be in
    /// [0,1] and `high_value` must exceed `low_value`.
    pub fn numeric(
        low_value: Decimal,
        low_utility: Decimal,
        high_value: Decimal,
        high_utility: Decimal,
    ) -> Result<Self, DomainError> {
        check_in_zero_one(low_utility)?;
        check_in_zero_one(high_utility)?;
        if high_value <= low_value {
            return Err(DomainError::DegenerateValueRange);
        }
        Ok(ValueSetUtilities::NumberUtilities {
            low_value,
            low_utility,
            high_value,
            high_utility,
        })
    }

    /// The utility of `value`, in [0,1]. Unknown or out-of-range values
    /// score 0.
    pub fn utility(&self, value: &Value) -> Decimal {
        match self {
            ValueSetUtilities::DiscreteUtilities { utilities } => {
                utilities.get(value).copied().unwrap_or(Decimal::ZERO)
            }
            ValueSetUtilities::NumberUtilities {
                low_value,
                low_utility,
                high_value,
                high_utility,
            } => {
                let Some(x) = value.as_number() else {
                    return Decimal::ZERO;
                };
                if x < *low_value || x > *high_value {
                    return Decimal::ZERO;
                }
                // lowU + deltaU * (x-lowV)/deltaV, ordered to keep the
                // division last
                let delta_u = high_utility - low_utility;
                let delta_v = high_value - low_value;
                (low_utility + delta_u * (x - low_value) / delta_v).round_dp_with_strategy(
                    INTERPOLATION_DIGITS,
                    RoundingStrategy::MidpointAwayFromZero,
                )
            }
        }
    }

    /// Check that this utility function covers exactly the given value
    /// set. Returns a descriptive error when it does not.
    pub fn check_fits(&self, value_set: &ValueSet) -> Result<(), DomainError> {
        match (self, value_set) {
            (ValueSetUtilities::DiscreteUtilities { utilities }, ValueSet::Discrete { values }) => {
                let missing: Vec<String> = values
                    .iter()
                    .filter(|v| !utilities.contains_key(v))
                    .map(|v| v.to_string())
                    .collect();
                if !missing.is_empty() {
                    return Err(DomainError::UtilitiesNotFitting(format!(
                        "no utility for values {}",
                        missing.join(",")
                    )));
                }
                Ok(())
            }
            (
                ValueSetUtilities::NumberUtilities {
                    low_value,
                    high_value,
                    ..
                },
                ValueSet::NumberRange { low, high, .. },
            ) => {
                if low != low_value {
                    return Err(DomainError::UtilitiesNotFitting(format!(
                        "utilities start at {low_value} but the value set starts at {low}"
                    )));
                }
                if high != high_value {
                    return Err(DomainError::UtilitiesNotFitting(format!(
                        "utilities end at {high_value} but the value set ends at {high}"
                    )));
                }
                Ok(())
            }
            _ => Err(DomainError::UtilitiesNotFitting(
                "utility function kind does not match the value set kind".into(),
            )),
        }
    }
}

fn check_in_zero_one(utility: Decimal) -> Result<(), DomainError> {
    if utility < Decimal::ZERO || utility > Decimal::ONE {
        return Err(DomainError::UtilityOutOfRange(utility));
    }
    Ok(())
}
