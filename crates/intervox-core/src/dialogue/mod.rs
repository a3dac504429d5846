//! Dialogue progression domain module.
//!
//! Sequences interview questions, maintains the append-only turn history,
//! and persists a resumable snapshot of dialogue progress.
//!
//! # Module Structure
//!
//! - `model`: Turn, dialogue state, and snapshot types
//! - `service`: Port trait for the remote dialogue-generation service
//! - `repository`: Port trait for the snapshot store
//! - `engine`: The progression engine (`DialogueEngine`)

mod engine;
mod model;
mod repository;
mod service;

// Re-export public API
pub use engine::{BootstrapOutcome, DialogueEngine, SubmitOutcome};
pub use model::{DialogueSnapshot, DialogueState, Speaker, Turn};
pub use repository::SnapshotRepository;
pub use service::{DialogueService, IntroductionRequest, NextUtteranceRequest};
