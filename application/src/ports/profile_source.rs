//! Profile source port

use async_trait::async_trait;
use parley_domain::LinearAdditiveUtilitySpace;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("profile '{0}' not found")]
    NotFound(String),

    #[error("profile '{reference}' is invalid: {detail}")]
    Invalid { reference: String, detail: String },

    #[error("failed to read profile '{reference}': {detail}")]
    Io { reference: String, detail: String },
}

/// Resolves profile references to utility spaces.
///
/// Implementations may be file-backed (static) or live; a caller holding
/// engine caches derived from a fetched profile must rebuild them when
/// it fetches an updated profile, since the caches are only valid for
/// the exact space they were built from.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn fetch(&self, reference: &str) -> Result<LinearAdditiveUtilitySpace, ProfileError>;
}
