//! JSON-file-backed SnapshotRepository implementation.
//!
//! One file per interview under the snapshot directory:
//!
//! ```text
//! base_dir/
//! ├── interview-42.json
//! └── interview-57.json
//! ```
//!
//! Writes go through a temp file followed by a rename, so a crash mid-write
//! never leaves a truncated snapshot behind.

use async_trait::async_trait;
use intervox_core::dialogue::{DialogueSnapshot, SnapshotRepository};
use intervox_core::error::{IntervoxError, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// File-system snapshot repository, one JSON document per interview.
pub struct JsonSnapshotRepository {
    base_dir: PathBuf,
}

impl JsonSnapshotRepository {
    /// Creates a repository at the default platform location.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the snapshot directory cannot be resolved or
    /// created.
    pub async fn default_location() -> Result<Self> {
        let base_dir = crate::paths::IntervoxPaths::snapshots_dir()
            .map_err(|err| IntervoxError::storage(err.to_string()))?;
        Self::new(base_dir).await
    }

    /// Creates a repository rooted at `base_dir`, creating it if needed.
    pub async fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir).await?;
        Ok(Self { base_dir })
    }

    fn snapshot_path(&self, interview_id: &str) -> PathBuf {
        self.base_dir.join(format!("{interview_id}.json"))
    }
}

#[async_trait]
impl SnapshotRepository for JsonSnapshotRepository {
    async fn find_by_interview(&self, interview_id: &str) -> Result<Option<DialogueSnapshot>> {
        let path = self.snapshot_path(interview_id);
        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let snapshot: DialogueSnapshot = serde_json::from_str(&raw)?;
        tracing::debug!(
            interview_id,
            turns = snapshot.turns.len(),
            "loaded dialogue snapshot"
        );
        Ok(Some(snapshot))
    }

    async fn save(&self, interview_id: &str, snapshot: &DialogueSnapshot) -> Result<()> {
        let path = self.snapshot_path(interview_id);
        let tmp_path = self.base_dir.join(format!("{interview_id}.json.tmp"));

        let raw = serde_json::to_string_pretty(snapshot)?;
        fs::write(&tmp_path, raw).await?;
        fs::rename(&tmp_path, &path).await?;

        tracing::debug!(
            interview_id,
            turns = snapshot.turns.len(),
            cursor = snapshot.question_cursor,
            "saved dialogue snapshot"
        );
        Ok(())
    }
}
