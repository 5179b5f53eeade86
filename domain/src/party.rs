//! Party identities

use crate::error::DomainError;
use serde::{Deserialize, Serialize};

/// Unique id of a party in a negotiation.
///
/// A letter followed by word characters (letters, digits or `_`).
/// Protocols hand these out; parties should not invent their own.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartyId(String);

impl PartyId {
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        let mut chars = name.chars();
        let valid = match chars.next() {
            Some(first) => {
                first.is_ascii_alphabetic()
                    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            None => false,
        };
        if !valid {
            return Err(DomainError::InvalidPartyId(name));
        }
        Ok(PartyId(name))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PartyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_ids() {
        assert!(PartyId::new("alice").is_ok());
        assert!(PartyId::new("party_2").is_ok());
        assert!(PartyId::new("A1_b2").is_ok());
    }

    #[test]
    fn test_invalid_ids() {
        assert!(PartyId::new("").is_err());
        assert!(PartyId::new("2party").is_err());
        assert!(PartyId::new("has space").is_err());
        assert!(PartyId::new("_underscore").is_err());
    }
}
