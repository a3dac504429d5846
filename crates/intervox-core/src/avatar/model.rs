//! Avatar session domain types.

use serde::{Deserialize, Serialize};

/// Configuration sent to the streaming provider on session creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvatarConfig {
    /// Provider-side avatar identity.
    pub avatar_name: String,
    /// Stream quality hint ("low", "medium", "high").
    pub quality: String,
    /// BCP-47 language tag for the avatar voice.
    pub language: String,
    /// Speaking rate multiplier.
    pub voice_rate: f32,
    /// Keeps the remote session alive through silent stretches.
    pub disable_idle_timeout: bool,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            avatar_name: "josh_lite3_20230714".to_string(),
            quality: "low".to_string(),
            language: "en".to_string(),
            voice_rate: 1.0,
            disable_idle_timeout: true,
        }
    }
}

/// Opaque handle to the inbound avatar media stream.
///
/// The core never inspects it; it is forwarded to the UI layer for
/// playback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteStreamHandle {
    /// Provider-issued locator for the inbound stream.
    pub url: String,
}

/// Result of a successful remote session handshake.
///
/// The session id is the correlation key for every subsequent speak/stop
/// call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedSession {
    pub session_id: String,
    pub stream: RemoteStreamHandle,
}
