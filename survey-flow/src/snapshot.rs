//! Preview snapshots stored as JSON files.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use survey_flow_types::{LookupError, SurveyDefinition, SurveyLookup, preview_key};

/// Reads preview snapshots from `<dir>/preview-{token}.json`.
///
/// Live lookups go to the inner lookup, if one is set.
#[derive(Clone)]
pub struct SnapshotDirectory {
    dir: PathBuf,
    live: Option<Arc<dyn SurveyLookup>>,
}

impl std::fmt::Debug for SnapshotDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotDirectory")
            .field("dir", &self.dir)
            .field("live", &self.live.is_some())
            .finish()
    }
}

impl SnapshotDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            live: None,
        }
    }

    /// Serve live lookups from `lookup`.
    pub fn with_live(mut self, lookup: Arc<dyn SurveyLookup>) -> Self {
        self.live = Some(lookup);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The snapshot file for a token, or `None` if the token is not a plain name.
    pub fn snapshot_path(&self, token: &str) -> Option<PathBuf> {
        if token.is_empty() || token.contains(['/', '\\']) || token.contains("..") {
            return None;
        }
        Some(self.dir.join(format!("{}.json", preview_key(token))))
    }

    /// Write a snapshot for a token.
    pub async fn store(
        &self,
        token: &str,
        definition: &SurveyDefinition,
    ) -> Result<(), LookupError> {
        let path = self
            .snapshot_path(token)
            .ok_or_else(|| LookupError::malformed(format!("invalid preview token '{token}'")))?;
        let json = serde_json::to_vec_pretty(definition)?;
        tokio::fs::write(&path, json).await.map_err(LookupError::backend)?;
        tracing::debug!(path = %path.display(), "stored preview snapshot");
        Ok(())
    }
}

#[async_trait]
impl SurveyLookup for SnapshotDirectory {
    async fn load_survey(
        &self,
        token: &str,
        preview: bool,
    ) -> Result<Option<SurveyDefinition>, LookupError> {
        if !preview {
            return match &self.live {
                Some(live) => live.load_survey(token, false).await,
                None => Ok(None),
            };
        }

        let Some(path) = self.snapshot_path(token) else {
            tracing::warn!(token, "rejecting preview token with path characters");
            return Ok(None);
        };
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no preview snapshot");
                return Ok(None);
            }
            Err(err) => return Err(LookupError::backend(err)),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }
}
