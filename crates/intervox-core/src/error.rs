//! Error types for the Intervox interview stack.

use serde::Serialize;
use thiserror::Error;

/// Identifies the subsystem that produced a fatal error.
///
/// Stage tags travel with surfaced errors so the UI layer can tell which
/// part of the interview pipeline failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Local camera/microphone capture.
    Capture,
    /// Remote streaming avatar session.
    Avatar,
    /// Dialogue progression and the remote generation service.
    Dialogue,
}

/// A shared error type for the entire interview stack.
///
/// Subsystem-fatal conditions (`PermissionDenied`, `SessionCreateFailed`,
/// `TransportDisconnected`) halt the orchestrator; recoverable conditions
/// are absorbed as no-ops by the owning subsystem and never reach here.
#[derive(Error, Debug, Clone, Serialize)]
pub enum IntervoxError {
    /// The platform denied camera/microphone access.
    #[error("Camera/microphone permission denied")]
    PermissionDenied,

    /// A requested capture device id no longer exists (e.g., unplugged).
    #[error("Capture device unavailable: '{device_id}'")]
    DeviceUnavailable { device_id: String },

    /// The platform offers no speech recognition engine.
    #[error("Speech recognition is not supported on this platform")]
    Unsupported,

    /// Microphone permission was revoked for speech recognition.
    #[error("Microphone unavailable for speech recognition")]
    MicrophoneUnavailable,

    /// The remote avatar session handshake failed.
    #[error("Failed to create avatar session: {0}")]
    SessionCreateFailed(String),

    /// The avatar transport dropped while a session was live.
    #[error("Avatar transport disconnected")]
    TransportDisconnected,

    /// The remote dialogue-generation service failed (non-2xx or malformed body).
    #[error("Dialogue service error: {0}")]
    DialogueService(String),

    /// A concurrent operation was rejected by a single-flight guard.
    #[error("Operation rejected: a {0} is already in flight")]
    Busy(&'static str),

    /// Persistence layer failure (snapshot store).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntervoxError {
    /// Creates a DeviceUnavailable error.
    pub fn device_unavailable(device_id: impl Into<String>) -> Self {
        Self::DeviceUnavailable {
            device_id: device_id.into(),
        }
    }

    /// Creates a SessionCreateFailed error.
    pub fn session_create_failed(message: impl Into<String>) -> Self {
        Self::SessionCreateFailed(message.into())
    }

    /// Creates a DialogueService error.
    pub fn dialogue_service(message: impl Into<String>) -> Self {
        Self::DialogueService(message.into())
    }

    /// Creates a Storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Creates a Config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this is a Busy rejection.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy(_))
    }

    /// Check if this is a dialogue service failure.
    ///
    /// Dialogue failures are retry-safe: the question cursor is never
    /// advanced on a failed remote call, so re-submitting resumes exactly
    /// where the call failed.
    pub fn is_dialogue_service(&self) -> bool {
        matches!(self, Self::DialogueService(_))
    }

    /// Check if this error is fatal to the subsystem that produced it.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::PermissionDenied
                | Self::DeviceUnavailable { .. }
                | Self::SessionCreateFailed(_)
                | Self::TransportDisconnected
        )
    }
}

impl From<std::io::Error> for IntervoxError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(format!("{} (kind: {:?})", err, err.kind()))
    }
}

impl From<serde_json::Error> for IntervoxError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for IntervoxError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, IntervoxError>`.
pub type Result<T> = std::result::Result<T, IntervoxError>;
