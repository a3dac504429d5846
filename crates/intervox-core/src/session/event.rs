//! Session lifecycle and events published to the UI layer.

use crate::avatar::RemoteStreamHandle;
use crate::capture::CaptureState;
use crate::dialogue::Turn;
use crate::error::{IntervoxError, Stage};
use serde::Serialize;

/// Composed lifecycle of one interview session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Lifecycle {
    /// Nothing started yet.
    Idle,
    /// Subsystems are coming up in dependency order.
    Initializing,
    /// The interview is running.
    Active,
    /// The interview was ended deliberately.
    Ended,
    /// A subsystem failed fatally; the stage tag says which.
    Errored { stage: Stage },
}

/// High-level events published to the UI layer.
///
/// Subsystems never read each other's state; the orchestrator correlates
/// across them and emits these one-way notifications.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// The composed lifecycle changed.
    LifecycleChanged { lifecycle: Lifecycle },
    /// The inbound avatar media stream is available for playback.
    AvatarStreamReady { stream: RemoteStreamHandle },
    /// Turn history restored from a persisted snapshot.
    HistoryRestored { turns: Vec<Turn> },
    /// A turn was appended to the history.
    TurnAppended { turn: Turn },
    /// The composed voice transcript changed.
    TranscriptUpdated { transcript: String },
    /// Capture state changed (acquisition or a toggle).
    CaptureChanged { state: CaptureState },
    /// All questions have been asked and the closing line spoken.
    InterviewFinished,
    /// The dialogue service failed; re-submitting is safe.
    DialogueError { error: IntervoxError },
    /// Speech recognition reported an error; listening has stopped.
    SpeechError { error: IntervoxError },
    /// A subsystem failed fatally and the session halted.
    FatalError { stage: Stage, error: IntervoxError },
}
