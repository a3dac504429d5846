//! Speech recognition domain types.

use serde::{Deserialize, Serialize};

/// Options for a recognition session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechOptions {
    /// BCP-47 language tag for the recognizer.
    pub language: String,
    /// Whether the engine keeps listening across utterances.
    pub continuous: bool,
    /// Whether interim (non-final) fragments are delivered.
    pub interim_results: bool,
}

impl Default for SpeechOptions {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            continuous: true,
            interim_results: true,
        }
    }
}

/// A signal delivered by the platform recognizer to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechSignal {
    /// A transcript fragment, interim or final.
    Fragment { text: String, is_final: bool },
    /// The recognizer ended a run naturally (end of utterance).
    Ended,
    /// The recognizer reported an error.
    Error {
        message: String,
        /// True when the error means microphone access was revoked.
        permission_denied: bool,
    },
}
