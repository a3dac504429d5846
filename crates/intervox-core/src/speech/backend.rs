//! Port trait for the platform speech recognition engine.

use crate::error::Result;
use async_trait::async_trait;

/// An abstract interface over the platform's speech-to-text subsystem.
///
/// A backend runs one recognition pass at a time; the hosting layer
/// forwards recognizer callbacks to the engine as
/// [`SpeechSignal`](super::SpeechSignal)s.
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    /// Whether the platform offers a speech engine at all.
    fn is_supported(&self) -> bool;

    /// Whether microphone permission is currently available.
    async fn microphone_available(&self) -> bool;

    /// Begins a recognition pass.
    ///
    /// # Errors
    ///
    /// Returns an error when the platform recognizer fails to start.
    async fn start(&self) -> Result<()>;

    /// Aborts the current recognition pass, if any.
    async fn abort(&self);
}
