//! Interview session module.
//!
//! Composes the four subsystems (capture, avatar, speech, dialogue) into
//! one coherent interview lifecycle.
//!
//! # Module Structure
//!
//! - `event`: Lifecycle states and events published to the UI layer
//! - `orchestrator`: The session orchestrator (`InterviewOrchestrator`)

mod event;
mod orchestrator;

// Re-export public API
pub use event::{Lifecycle, SessionEvent};
pub use orchestrator::{InterviewOrchestrator, SessionConfig};
