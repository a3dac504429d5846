//! Intervox core: domain logic for AI-driven interview sessions.
//!
//! The crate is organized around four independently-failing subsystems
//! (`capture`, `speech`, `avatar`, `dialogue`) and the orchestrator in
//! `session` that composes them into one interview lifecycle. All
//! external collaborators — device APIs, the speech recognizer, the
//! streaming-avatar provider, the dialogue-generation backend, and the
//! snapshot store — are port traits implemented outside this crate.

pub mod avatar;
pub mod capture;
pub mod context;
pub mod dialogue;
pub mod error;
pub mod session;
pub mod speech;

// Re-export common error types
pub use error::{IntervoxError, Stage};
