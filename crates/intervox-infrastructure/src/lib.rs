//! Persistence for the Intervox interview stack.
//!
//! Currently a single concern: dialogue snapshots stored as one JSON file
//! per interview, so an interrupted session can resume where it left off.

pub mod paths;
pub mod snapshot_repository;

pub use snapshot_repository::JsonSnapshotRepository;
