//! Issue values
//!
//! A value is either discrete (a label) or numeric (an exact decimal).

use crate::error::DomainError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A possible value for one issue.
///
/// Immutable scalar; equality and hashing follow the underlying value.
///
/// # Example
///
/// ```
/// use parley_domain::Value;
/// use rust_decimal_macros::dec;
///
/// let color = Value::discrete("red").unwrap();
/// let price = Value::number(dec!(1200));
/// assert_ne!(color, price);
/// assert_eq!(color.to_string(), "\"red\"");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// An exact decimal, member of some numeric value set
    Number(Decimal),
    /// A label for a discrete issue, always non-empty
    Discrete(String),
}

impl Value {
    /// Create a discrete value. Fails on the empty string.
    pub fn discrete(label: impl Into<String>) -> Result<Self, DomainError> {
        let label = label.into();
        if label.is_empty() {
            return Err(DomainError::EmptyDiscreteValue);
        }
        Ok(Value::Discrete(label))
    }

    /// Create a numeric value
    pub fn number(value: Decimal) -> Self {
        Value::Number(value)
    }

    /// The decimal payload, if this is a numeric value
    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            Value::Number(d) => Some(*d),
            Value::Discrete(_) => None,
        }
    }

    /// The label payload, if this is a discrete value
    pub fn as_discrete(&self) -> Option<&str> {
        match self {
            Value::Number(_) => None,
            Value::Discrete(s) => Some(s),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Number(d) => write!(f, "{}", d),
            Value::Discrete(s) => write!(f, "\"{}\"", s),
        }
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Value::Number(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_discrete_value() {
        let value = Value::discrete("lease").unwrap();
        assert_eq!(value.as_discrete(), Some("lease"));
        assert_eq!(value.as_number(), None);
    }

    #[test]
    fn test_empty_discrete_rejected() {
        assert_eq!(Value::discrete(""), Err(DomainError::EmptyDiscreteValue));
    }

    #[test]
    fn test_number_value_equality() {
        assert_eq!(Value::number(dec!(1.50)), Value::number(dec!(1.50)));
        assert_ne!(Value::number(dec!(1.5)), Value::Discrete("1.5".into()));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::number(dec!(12)).to_string(), "12");
        assert_eq!(Value::discrete("red").unwrap().to_string(), "\"red\"");
    }
}
