//! Speech-to-text capture domain module.
//!
//! Wraps a continuous recognition stream and maintains the distinction
//! between a natural end-of-utterance (keep listening) and a deliberate
//! stop (stay stopped).
//!
//! # Module Structure
//!
//! - `model`: Recognition options and backend signals
//! - `backend`: Port trait for the platform speech engine
//! - `engine`: The capture engine (`SpeechCaptureEngine`)

mod backend;
mod engine;
mod model;

// Re-export public API
pub use backend::SpeechBackend;
pub use engine::SpeechCaptureEngine;
pub use model::{SpeechOptions, SpeechSignal};
