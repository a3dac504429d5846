//! Device capture domain types.

use serde::{Deserialize, Serialize};

/// The camera/microphone pair chosen by the candidate at interview start.
///
/// Immutable for the lifetime of the session; switching devices requires
/// ending the interview and starting over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSelection {
    /// Platform identifier of the selected camera.
    pub camera_id: String,
    /// Platform identifier of the selected microphone.
    pub microphone_id: String,
    /// Whether the candidate consented to facial-expression reading.
    pub allow_expression_reading: bool,
}

/// A read-only projection of the capture manager's state for the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CaptureState {
    /// Whether a local stream is currently acquired.
    pub acquired: bool,
    /// Whether the microphone track is enabled.
    pub mic_enabled: bool,
    /// Whether the camera track is enabled.
    pub camera_enabled: bool,
}

impl CaptureState {
    /// State before any acquisition (or after release).
    pub fn released() -> Self {
        Self {
            acquired: false,
            mic_enabled: false,
            camera_enabled: false,
        }
    }
}
