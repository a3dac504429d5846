//! Speech capture engine with explicit deliberate-stop tracking.

use super::backend::SpeechBackend;
use super::model::{SpeechOptions, SpeechSignal};
use crate::error::{IntervoxError, Result};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct EngineState {
    listening: bool,
    /// Set by `stop()`; checked before auto-restart so a deliberate stop
    /// never turns into a silent restart.
    stopped_by_user: bool,
    failed: bool,
    committed: String,
    interim: String,
}

impl EngineState {
    fn transcript(&self) -> String {
        if self.interim.is_empty() {
            self.committed.clone()
        } else if self.committed.is_empty() {
            self.interim.clone()
        } else {
            format!("{} {}", self.committed, self.interim)
        }
    }
}

/// Wraps a continuous speech-to-text stream for one interview session.
///
/// In continuous mode the engine restarts the recognizer after a natural
/// end-of-utterance, unless `stop()` was called or an unrecoverable error
/// occurred. Only one listening session may be active at a time; starting
/// while already listening is a no-op.
pub struct SpeechCaptureEngine {
    backend: Arc<dyn SpeechBackend>,
    options: SpeechOptions,
    state: Mutex<EngineState>,
}

impl SpeechCaptureEngine {
    /// Creates a new engine over the given backend.
    pub fn new(backend: Arc<dyn SpeechBackend>, options: SpeechOptions) -> Self {
        Self {
            backend,
            options,
            state: Mutex::new(EngineState::default()),
        }
    }

    /// Begins listening.
    ///
    /// # Errors
    ///
    /// - `Unsupported` when the platform offers no speech engine
    /// - `MicrophoneUnavailable` when microphone permission was revoked
    pub async fn start(&self) -> Result<()> {
        if !self.backend.is_supported() {
            return Err(IntervoxError::Unsupported);
        }
        if !self.backend.microphone_available().await {
            return Err(IntervoxError::MicrophoneUnavailable);
        }

        let mut state = self.state.lock().await;
        if state.listening {
            tracing::debug!("speech engine already listening, start ignored");
            return Ok(());
        }
        state.stopped_by_user = false;
        state.failed = false;

        self.backend.start().await?;
        state.listening = true;
        tracing::info!(language = %self.options.language, "speech recognition started");
        Ok(())
    }

    /// Stops listening deliberately.
    ///
    /// Marks the stop as user-initiated so the natural-end auto-restart
    /// does not fire. Stopping while not listening is a no-op.
    pub async fn stop(&self) {
        let mut state = self.state.lock().await;
        state.stopped_by_user = true;
        if state.listening {
            state.listening = false;
            drop(state);
            self.backend.abort().await;
            tracing::info!("speech recognition stopped by user");
        }
    }

    /// Clears the accumulated transcript without affecting listening state.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        state.committed.clear();
        state.interim.clear();
    }

    /// Whether the engine is currently listening.
    pub async fn is_listening(&self) -> bool {
        self.state.lock().await.listening
    }

    /// The current composed transcript (committed + interim).
    pub async fn transcript(&self) -> String {
        self.state.lock().await.transcript()
    }

    /// Handles a signal forwarded from the platform recognizer.
    ///
    /// Returns the updated transcript when a fragment changed it, `None`
    /// otherwise. A natural `Ended` signal restarts the recognizer when
    /// configured for continuous capture, unless the engine was stopped
    /// deliberately or has failed.
    pub async fn handle_signal(&self, signal: SpeechSignal) -> Result<Option<String>> {
        let mut state = self.state.lock().await;
        match signal {
            SpeechSignal::Fragment { text, is_final } => {
                if !is_final && !self.options.interim_results {
                    return Ok(None);
                }
                if is_final {
                    if !state.committed.is_empty() {
                        state.committed.push(' ');
                    }
                    state.committed.push_str(text.trim());
                    state.interim.clear();
                } else {
                    state.interim = text;
                }
                Ok(Some(state.transcript()))
            }
            SpeechSignal::Ended => {
                state.listening = false;
                if self.options.continuous && !state.stopped_by_user && !state.failed {
                    self.backend.start().await?;
                    state.listening = true;
                    tracing::debug!("speech recognition auto-restarted after end of utterance");
                }
                Ok(None)
            }
            SpeechSignal::Error {
                message,
                permission_denied,
            } => {
                state.listening = false;
                state.failed = true;
                tracing::warn!(%message, "speech recognition error");
                if permission_denied {
                    Err(IntervoxError::MicrophoneUnavailable)
                } else {
                    Err(IntervoxError::internal(format!(
                        "speech recognition error: {message}"
                    )))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct MockSpeechBackend {
        supported: bool,
        microphone: AtomicBool,
        starts: AtomicUsize,
        aborts: AtomicUsize,
    }

    impl MockSpeechBackend {
        fn new() -> Self {
            Self {
                supported: true,
                microphone: AtomicBool::new(true),
                starts: AtomicUsize::new(0),
                aborts: AtomicUsize::new(0),
            }
        }

        fn unsupported() -> Self {
            Self {
                supported: false,
                ..Self::new()
            }
        }
    }

    #[async_trait]
    impl SpeechBackend for MockSpeechBackend {
        fn is_supported(&self) -> bool {
            self.supported
        }

        async fn microphone_available(&self) -> bool {
            self.microphone.load(Ordering::SeqCst)
        }

        async fn start(&self) -> Result<()> {
            self.starts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn abort(&self) {
            self.aborts.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn engine_with(backend: Arc<MockSpeechBackend>) -> SpeechCaptureEngine {
        SpeechCaptureEngine::new(backend, SpeechOptions::default())
    }

    #[tokio::test]
    async fn test_start_fails_when_unsupported() {
        let engine = engine_with(Arc::new(MockSpeechBackend::unsupported()));
        let err = engine.start().await.unwrap_err();
        assert!(matches!(err, IntervoxError::Unsupported));
    }

    #[tokio::test]
    async fn test_start_fails_when_microphone_revoked() {
        let backend = Arc::new(MockSpeechBackend::new());
        backend.microphone.store(false, Ordering::SeqCst);
        let engine = engine_with(backend);

        let err = engine.start().await.unwrap_err();
        assert!(matches!(err, IntervoxError::MicrophoneUnavailable));
    }

    #[tokio::test]
    async fn test_start_while_listening_is_noop() {
        let backend = Arc::new(MockSpeechBackend::new());
        let engine = engine_with(backend.clone());

        engine.start().await.unwrap();
        engine.start().await.unwrap();

        assert_eq!(backend.starts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_natural_end_auto_restarts() {
        let backend = Arc::new(MockSpeechBackend::new());
        let engine = engine_with(backend.clone());
        engine.start().await.unwrap();

        engine.handle_signal(SpeechSignal::Ended).await.unwrap();

        assert!(engine.is_listening().await);
        assert_eq!(backend.starts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_deliberate_stop_suppresses_restart() {
        let backend = Arc::new(MockSpeechBackend::new());
        let engine = engine_with(backend.clone());
        engine.start().await.unwrap();

        engine.stop().await;
        engine.handle_signal(SpeechSignal::Ended).await.unwrap();

        assert!(!engine.is_listening().await);
        assert_eq!(backend.starts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_error_suppresses_restart() {
        let backend = Arc::new(MockSpeechBackend::new());
        let engine = engine_with(backend.clone());
        engine.start().await.unwrap();

        let err = engine
            .handle_signal(SpeechSignal::Error {
                message: "audio-capture".to_string(),
                permission_denied: false,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, IntervoxError::Internal(_)));

        engine.handle_signal(SpeechSignal::Ended).await.unwrap();
        assert!(!engine.is_listening().await);
        assert_eq!(backend.starts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fragments_compose_transcript() {
        let engine = engine_with(Arc::new(MockSpeechBackend::new()));
        engine.start().await.unwrap();

        let t = engine
            .handle_signal(SpeechSignal::Fragment {
                text: "I built".to_string(),
                is_final: false,
            })
            .await
            .unwrap();
        assert_eq!(t.as_deref(), Some("I built"));

        let t = engine
            .handle_signal(SpeechSignal::Fragment {
                text: "I built a cache".to_string(),
                is_final: true,
            })
            .await
            .unwrap();
        assert_eq!(t.as_deref(), Some("I built a cache"));
    }

    #[tokio::test]
    async fn test_reset_keeps_listening_state() {
        let engine = engine_with(Arc::new(MockSpeechBackend::new()));
        engine.start().await.unwrap();
        engine
            .handle_signal(SpeechSignal::Fragment {
                text: "hello".to_string(),
                is_final: true,
            })
            .await
            .unwrap();

        engine.reset().await;

        assert_eq!(engine.transcript().await, "");
        assert!(engine.is_listening().await);
    }
}
