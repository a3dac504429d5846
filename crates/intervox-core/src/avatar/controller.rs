//! Avatar session controller state machine.

use super::model::{AvatarConfig, RemoteStreamHandle};
use super::transport::AvatarTransport;
use crate::error::{IntervoxError, Result};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Internal controller state.
///
/// The session id lives inside the ready-ish variants, so no speak/stop
/// command can be issued without one.
#[derive(Debug, Clone)]
enum AvatarState {
    Idle,
    Creating,
    Ready {
        session_id: String,
        stream: RemoteStreamHandle,
    },
    Speaking {
        session_id: String,
        stream: RemoteStreamHandle,
    },
    Stopped,
    Errored {
        error: IntervoxError,
    },
}

/// Coarse phase of the controller, exposed to the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AvatarPhase {
    Idle,
    Creating,
    Ready,
    Speaking,
    Stopped,
    Errored,
}

/// Owns the lifecycle of one remote streaming-avatar session.
///
/// State machine: `idle -> creating -> ready <-> speaking -> stopped`,
/// with a terminal `errored` reachable on transport loss.
///
/// A `speak` issued while one is in progress is rejected with `Busy`
/// rather than queued; the caller (the dialogue flow) already serializes
/// utterances, so an overlap indicates a logic error worth surfacing.
pub struct AvatarController {
    transport: Arc<dyn AvatarTransport>,
    config: AvatarConfig,
    state: Mutex<AvatarState>,
}

impl AvatarController {
    /// Creates a controller in the `idle` state.
    pub fn new(transport: Arc<dyn AvatarTransport>, config: AvatarConfig) -> Self {
        Self {
            transport,
            config,
            state: Mutex::new(AvatarState::Idle),
        }
    }

    /// Requests a new remote session.
    ///
    /// Guarded against concurrent duplicate sessions: a second call while
    /// one is creating (or a session is live) is rejected with `Busy`.
    ///
    /// # Errors
    ///
    /// Returns `SessionCreateFailed` and transitions to `errored` when the
    /// remote handshake fails.
    pub async fn initialize(&self, token: &str) -> Result<RemoteStreamHandle> {
        {
            let mut state = self.state.lock().await;
            match &*state {
                AvatarState::Idle | AvatarState::Stopped => {}
                AvatarState::Errored { error } => return Err(error.clone()),
                _ => return Err(IntervoxError::Busy("avatar session")),
            }
            *state = AvatarState::Creating;
        }

        match self.transport.create_session(token, &self.config).await {
            Ok(created) => {
                let mut state = self.state.lock().await;
                // A disconnect may have raced the handshake.
                if let AvatarState::Errored { error } = &*state {
                    return Err(error.clone());
                }
                tracing::info!(session_id = %created.session_id, "avatar session ready");
                let stream = created.stream.clone();
                *state = AvatarState::Ready {
                    session_id: created.session_id,
                    stream: created.stream,
                };
                Ok(stream)
            }
            Err(err) => {
                let error = match err {
                    IntervoxError::SessionCreateFailed(_) => err,
                    other => IntervoxError::session_create_failed(other.to_string()),
                };
                tracing::error!(%error, "avatar session creation failed");
                let mut state = self.state.lock().await;
                *state = AvatarState::Errored {
                    error: error.clone(),
                };
                Err(error)
            }
        }
    }

    /// Issues a remote utterance command.
    ///
    /// Valid only from `ready`. A call while `speaking` is rejected with
    /// `Busy`; after a disconnect the stored transport error is returned
    /// without contacting the transport.
    pub async fn speak(&self, text: &str) -> Result<()> {
        let session_id = {
            let mut state = self.state.lock().await;
            match &*state {
                AvatarState::Ready { session_id, stream } => {
                    let session_id = session_id.clone();
                    let stream = stream.clone();
                    *state = AvatarState::Speaking {
                        session_id: session_id.clone(),
                        stream,
                    };
                    session_id
                }
                AvatarState::Speaking { .. } => return Err(IntervoxError::Busy("speak command")),
                AvatarState::Errored { error } => return Err(error.clone()),
                _ => {
                    return Err(IntervoxError::internal(
                        "speak issued outside a ready avatar session",
                    ));
                }
            }
        };

        let result = self.transport.speak(&session_id, text).await;

        let mut state = self.state.lock().await;
        // Only fall back to ready if nothing forced a transition meanwhile
        // (disconnect notification, stop).
        if let AvatarState::Speaking {
            session_id,
            stream,
        } = &*state
        {
            *state = AvatarState::Ready {
                session_id: session_id.clone(),
                stream: stream.clone(),
            };
        }

        if let Err(err) = &result {
            tracing::warn!(%err, "avatar speak command failed");
        }
        result
    }

    /// Tears down the session.
    ///
    /// Best-effort on the remote side: local state is reset to `stopped`
    /// even when the remote teardown call fails, so no dangling session
    /// state survives a transport error. A stop on a terminal state is a
    /// no-op.
    pub async fn stop(&self) -> Result<()> {
        let session_id = {
            let mut state = self.state.lock().await;
            match &*state {
                AvatarState::Stopped | AvatarState::Errored { .. } => return Ok(()),
                AvatarState::Ready { session_id, .. }
                | AvatarState::Speaking { session_id, .. } => {
                    let id = session_id.clone();
                    *state = AvatarState::Stopped;
                    Some(id)
                }
                AvatarState::Idle | AvatarState::Creating => {
                    *state = AvatarState::Stopped;
                    None
                }
            }
        };

        if let Some(session_id) = session_id {
            if let Err(err) = self.transport.stop_session(&session_id).await {
                tracing::warn!(%err, %session_id, "remote avatar teardown failed");
            } else {
                tracing::info!(%session_id, "avatar session stopped");
            }
        }
        Ok(())
    }

    /// Handles an out-of-band disconnect notification from the transport.
    ///
    /// Forces an immediate transition to `errored`; never treated as a
    /// normal stop. Ignored once the controller is already terminal.
    pub async fn notify_disconnected(&self) {
        let mut state = self.state.lock().await;
        match &*state {
            AvatarState::Stopped | AvatarState::Errored { .. } | AvatarState::Idle => {}
            _ => {
                tracing::error!("avatar transport disconnected");
                *state = AvatarState::Errored {
                    error: IntervoxError::TransportDisconnected,
                };
            }
        }
    }

    /// Current coarse phase for the UI layer.
    pub async fn phase(&self) -> AvatarPhase {
        match &*self.state.lock().await {
            AvatarState::Idle => AvatarPhase::Idle,
            AvatarState::Creating => AvatarPhase::Creating,
            AvatarState::Ready { .. } => AvatarPhase::Ready,
            AvatarState::Speaking { .. } => AvatarPhase::Speaking,
            AvatarState::Stopped => AvatarPhase::Stopped,
            AvatarState::Errored { .. } => AvatarPhase::Errored,
        }
    }

    /// The inbound stream handle while a session is live.
    pub async fn stream(&self) -> Option<RemoteStreamHandle> {
        match &*self.state.lock().await {
            AvatarState::Ready { stream, .. } | AvatarState::Speaking { stream, .. } => {
                Some(stream.clone())
            }
            _ => None,
        }
    }
}
