//! Interview session orchestrator.

use super::event::{Lifecycle, SessionEvent};
use crate::avatar::{AvatarConfig, AvatarController, AvatarPhase, AvatarTransport};
use crate::capture::{CaptureBackend, CaptureManager, CaptureState, DeviceSelection};
use crate::context::InterviewContext;
use crate::dialogue::{
    BootstrapOutcome, DialogueEngine, DialogueService, SnapshotRepository, Turn,
};
use crate::error::{IntervoxError, Result, Stage};
use crate::speech::{SpeechBackend, SpeechCaptureEngine, SpeechOptions, SpeechSignal};
use std::sync::Arc;
use tokio::sync::{RwLock, mpsc};

/// Per-session settings gathered before orchestration starts.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Camera/microphone pair chosen by the candidate.
    pub selection: DeviceSelection,
    /// Token for the streaming-avatar provider.
    pub avatar_token: String,
    /// Avatar session configuration.
    pub avatar_config: AvatarConfig,
    /// Speech recognition options.
    pub speech_options: SpeechOptions,
}

/// Composes the four interview subsystems into one coherent lifecycle.
///
/// Startup order is fixed: device capture, then the avatar session, then
/// the dialogue bootstrap — a failure at any stage halts the downstream
/// stages and surfaces a stage-tagged error. Teardown is always avatar
/// stop then capture release, run unconditionally on interview end or
/// fatal error so neither camera indicators nor remote sessions leak.
///
/// The orchestrator is the only component permitted to tear down the
/// local stream or the remote session; subsystems never touch each other.
pub struct InterviewOrchestrator {
    capture: CaptureManager,
    avatar: AvatarController,
    speech: SpeechCaptureEngine,
    dialogue: DialogueEngine,
    avatar_token: String,
    lifecycle: RwLock<Lifecycle>,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl InterviewOrchestrator {
    /// Composes a session from its port implementations.
    ///
    /// Returns the orchestrator and the receiving end of its event
    /// channel; the UI layer drains the receiver.
    pub fn new(
        capture_backend: Arc<dyn CaptureBackend>,
        speech_backend: Arc<dyn SpeechBackend>,
        avatar_transport: Arc<dyn AvatarTransport>,
        dialogue_service: Arc<dyn DialogueService>,
        snapshot_repository: Arc<dyn SnapshotRepository>,
        context: InterviewContext,
        config: SessionConfig,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let orchestrator = Self {
            capture: CaptureManager::new(capture_backend, config.selection),
            avatar: AvatarController::new(avatar_transport, config.avatar_config),
            speech: SpeechCaptureEngine::new(speech_backend, config.speech_options),
            dialogue: DialogueEngine::new(dialogue_service, snapshot_repository, context),
            avatar_token: config.avatar_token,
            lifecycle: RwLock::new(Lifecycle::Idle),
            events,
        };
        (orchestrator, receiver)
    }

    /// Brings the session up in dependency order.
    ///
    /// Device capture must succeed before the remote avatar session is
    /// requested, and the dialogue bootstraps only once the avatar is
    /// ready. The first stage to fail halts everything downstream.
    pub async fn start(&self) -> Result<()> {
        {
            let mut lifecycle = self.lifecycle.write().await;
            if *lifecycle != Lifecycle::Idle {
                return Err(IntervoxError::internal("session already started"));
            }
            *lifecycle = Lifecycle::Initializing;
        }
        self.emit(SessionEvent::LifecycleChanged {
            lifecycle: Lifecycle::Initializing,
        });

        let capture_state = match self.capture.acquire().await {
            Ok(state) => state,
            Err(err) => {
                self.fail(Stage::Capture, err.clone()).await;
                return Err(err);
            }
        };
        self.emit(SessionEvent::CaptureChanged {
            state: capture_state,
        });

        let stream = match self.avatar.initialize(&self.avatar_token).await {
            Ok(stream) => stream,
            Err(err) => {
                self.fail(Stage::Avatar, err.clone()).await;
                return Err(err);
            }
        };
        self.emit(SessionEvent::AvatarStreamReady { stream });

        let outcome = match self.dialogue.bootstrap().await {
            Ok(outcome) => outcome,
            Err(err) => {
                self.fail(Stage::Dialogue, err.clone()).await;
                return Err(err);
            }
        };
        if let Err(err) = self.apply_bootstrap(outcome).await {
            self.fail(Stage::Avatar, err.clone()).await;
            return Err(err);
        }

        self.set_lifecycle(Lifecycle::Active).await;
        tracing::info!("interview session active");
        Ok(())
    }

    async fn apply_bootstrap(&self, outcome: BootstrapOutcome) -> Result<()> {
        match outcome {
            BootstrapOutcome::Introduced { utterance } => {
                self.emit(SessionEvent::TurnAppended {
                    turn: utterance.clone(),
                });
                self.speak_line(&utterance.text).await
            }
            BootstrapOutcome::Resumed { reannounce } => {
                self.emit(SessionEvent::HistoryRestored {
                    turns: self.dialogue.turns().await,
                });
                self.speak_line(&reannounce).await
            }
            BootstrapOutcome::ResumedAdvanced { utterance } => {
                self.emit(SessionEvent::HistoryRestored {
                    turns: self.dialogue.turns().await,
                });
                self.speak_line(&utterance.text).await
            }
        }
    }

    /// Processes one composed candidate utterance (typed, dictated, or
    /// both — the input field arbitration happens outside the core).
    ///
    /// Outside an active session the submission is ignored. A `Busy`
    /// rejection from the single-flight guard and dialogue service
    /// failures are returned to the caller; the latter also surface as a
    /// `DialogueError` event and are retry-safe.
    pub async fn submit_utterance(&self, text: &str) -> Result<()> {
        if *self.lifecycle.read().await != Lifecycle::Active {
            tracing::warn!("utterance submitted outside an active session, ignored");
            return Ok(());
        }

        match self.dialogue.submit(text).await {
            Ok(None) => Ok(()),
            Ok(Some(outcome)) => {
                self.emit(SessionEvent::TurnAppended {
                    turn: outcome.candidate,
                });
                self.emit(SessionEvent::TurnAppended {
                    turn: outcome.reply.clone(),
                });
                if let Err(err) = self.speak_line(&outcome.reply.text).await {
                    self.fail(Stage::Avatar, err.clone()).await;
                    return Err(err);
                }
                if outcome.finished {
                    self.emit(SessionEvent::InterviewFinished);
                }
                Ok(())
            }
            Err(err) if err.is_busy() => Err(err),
            Err(err) => {
                self.emit(SessionEvent::DialogueError { error: err.clone() });
                Err(err)
            }
        }
    }

    /// Flips the microphone track on the local stream.
    pub async fn toggle_mic(&self) -> CaptureState {
        let state = self.capture.toggle_mic().await;
        self.emit(SessionEvent::CaptureChanged { state });
        state
    }

    /// Flips the camera track on the local stream.
    pub async fn toggle_camera(&self) -> CaptureState {
        let state = self.capture.toggle_camera().await;
        self.emit(SessionEvent::CaptureChanged { state });
        state
    }

    /// Starts voice capture for the answer input field.
    pub async fn start_listening(&self) -> Result<()> {
        self.speech.start().await
    }

    /// Stops voice capture deliberately.
    pub async fn stop_listening(&self) {
        self.speech.stop().await;
    }

    /// Clears the composed voice transcript.
    pub async fn reset_transcript(&self) {
        self.speech.reset().await;
    }

    /// Forwards a recognizer signal to the speech engine.
    ///
    /// Transcript changes are published as `TranscriptUpdated`; speech
    /// errors stop listening and surface as a `SpeechError` event rather
    /// than halting the session.
    pub async fn handle_speech_signal(&self, signal: SpeechSignal) {
        match self.speech.handle_signal(signal).await {
            Ok(Some(transcript)) => {
                self.emit(SessionEvent::TranscriptUpdated { transcript });
            }
            Ok(None) => {}
            Err(error) => {
                self.emit(SessionEvent::SpeechError { error });
            }
        }
    }

    /// Handles an out-of-band avatar disconnect notification.
    ///
    /// Never treated as a normal stop: the avatar goes terminal and the
    /// whole session fails with an avatar stage tag.
    pub async fn handle_avatar_disconnect(&self) {
        {
            let lifecycle = self.lifecycle.read().await;
            if matches!(*lifecycle, Lifecycle::Ended | Lifecycle::Errored { .. }) {
                return;
            }
        }
        self.avatar.notify_disconnected().await;
        self.fail(Stage::Avatar, IntervoxError::TransportDisconnected)
            .await;
    }

    /// Ends the interview and tears everything down.
    ///
    /// Idempotent; an already-ended or failed session is left as is. An
    /// in-flight dialogue call is not aborted — it settles against an
    /// already-stopped avatar, which is harmless.
    pub async fn end_interview(&self) {
        {
            let lifecycle = self.lifecycle.read().await;
            if matches!(*lifecycle, Lifecycle::Ended | Lifecycle::Errored { .. }) {
                return;
            }
        }
        self.teardown().await;
        self.set_lifecycle(Lifecycle::Ended).await;
        tracing::info!("interview session ended");
    }

    /// Voices one interviewer line through the avatar.
    async fn speak_line(&self, text: &str) -> Result<()> {
        self.avatar.speak(text).await
    }

    /// Tears down in fixed order: speech, then avatar, then capture.
    async fn teardown(&self) {
        self.speech.stop().await;
        if let Err(err) = self.avatar.stop().await {
            tracing::warn!(%err, "avatar teardown reported an error");
        }
        self.capture.release().await;
    }

    async fn fail(&self, stage: Stage, error: IntervoxError) {
        {
            // A session that already ended (or failed) stays terminal; a
            // late error from a settling call must not reopen it.
            let lifecycle = self.lifecycle.read().await;
            if matches!(*lifecycle, Lifecycle::Ended | Lifecycle::Errored { .. }) {
                tracing::debug!(?stage, %error, "error after terminal lifecycle, ignored");
                return;
            }
        }
        tracing::error!(?stage, %error, "interview session failed");
        self.teardown().await;
        self.emit(SessionEvent::FatalError {
            stage,
            error,
        });
        self.set_lifecycle(Lifecycle::Errored { stage }).await;
    }

    async fn set_lifecycle(&self, lifecycle: Lifecycle) {
        *self.lifecycle.write().await = lifecycle;
        self.emit(SessionEvent::LifecycleChanged { lifecycle });
    }

    fn emit(&self, event: SessionEvent) {
        // The receiver may be gone during shutdown; nothing to do then.
        let _ = self.events.send(event);
    }

    /// Current composed lifecycle.
    pub async fn lifecycle(&self) -> Lifecycle {
        *self.lifecycle.read().await
    }

    /// Read-only ordered turn history.
    pub async fn turn_history(&self) -> Vec<Turn> {
        self.dialogue.turns().await
    }

    /// Current capture state snapshot.
    pub async fn capture_state(&self) -> CaptureState {
        self.capture.state().await
    }

    /// Current avatar phase.
    pub async fn avatar_phase(&self) -> AvatarPhase {
        self.avatar.phase().await
    }

    /// Current composed voice transcript.
    pub async fn transcript(&self) -> String {
        self.speech.transcript().await
    }
}
