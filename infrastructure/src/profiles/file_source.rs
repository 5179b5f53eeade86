//! JSON file profile source

use async_trait::async_trait;
use parley_application::{ProfileError, ProfileSource};
use parley_domain::LinearAdditiveUtilitySpace;
use std::path::PathBuf;
use tracing::debug;

/// Loads profiles from JSON files, resolved relative to a base
/// directory. A reference is the file path, with or without the `.json`
/// extension.
///
/// Deserialization alone would bypass the utility-space invariants
/// (normalized weights, fitting utilities), so every loaded profile is
/// reconstructed through the validating constructor before it is handed
/// out.
pub struct FileProfileSource {
    base_dir: PathBuf,
}

impl FileProfileSource {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn resolve(&self, reference: &str) -> PathBuf {
        let mut path = self.base_dir.join(reference);
        if path.extension().is_none() {
            path.set_extension("json");
        }
        path
    }
}

#[async_trait]
impl ProfileSource for FileProfileSource {
    async fn fetch(&self, reference: &str) -> Result<LinearAdditiveUtilitySpace, ProfileError> {
        let path = self.resolve(reference);
        debug!(reference, path = %path.display(), "loading profile");
        let contents = tokio::fs::read_to_string(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ProfileError::NotFound(reference.to_string())
            } else {
                ProfileError::Io {
                    reference: reference.to_string(),
                    detail: e.to_string(),
                }
            }
        })?;
        let raw: LinearAdditiveUtilitySpace =
            serde_json::from_str(&contents).map_err(|e| ProfileError::Invalid {
                reference: reference.to_string(),
                detail: e.to_string(),
            })?;
        // run the parsed space back through the validating constructor
        LinearAdditiveUtilitySpace::new(
            raw.domain().clone(),
            raw.name(),
            raw.issue_utilities()
                .map(|(i, u)| (i.to_string(), u.clone()))
                .collect::<Vec<_>>(),
            raw.issue_weights()
                .map(|(i, w)| (i.to_string(), w))
                .collect::<Vec<_>>(),
            raw.reservation_bid().cloned(),
        )
        .map_err(|e| ProfileError::Invalid {
            reference: reference.to_string(),
            detail: e.to_string(),
        })
    }
}
