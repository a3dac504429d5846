//! Snapshot repository trait.
//!
//! Defines the interface for persisting dialogue progress.

use super::model::DialogueSnapshot;
use crate::error::Result;
use async_trait::async_trait;

/// An abstract store for dialogue snapshots, keyed by interview id.
///
/// Keying by interview id (rather than a fixed global key) prevents two
/// interviews conducted on the same device from bleeding into each other's
/// resumption state.
#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// Finds the snapshot for an interview.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(snapshot))`: a prior session exists
    /// - `Ok(None)`: fresh interview
    /// - `Err(_)`: storage failure
    async fn find_by_interview(&self, interview_id: &str) -> Result<Option<DialogueSnapshot>>;

    /// Writes the snapshot for an interview, replacing any prior one.
    async fn save(&self, interview_id: &str, snapshot: &DialogueSnapshot) -> Result<()>;
}
