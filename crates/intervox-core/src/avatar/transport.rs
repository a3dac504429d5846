//! Port trait for the remote streaming-avatar provider.

use super::model::{AvatarConfig, CreatedSession};
use crate::error::Result;
use async_trait::async_trait;

/// An abstract interface over the streaming provider's session protocol.
///
/// The provider is treated as an opaque capability: create a session,
/// speak, stop. Out-of-band disconnect notifications are delivered by the
/// hosting layer straight to the controller, not through this trait.
#[async_trait]
pub trait AvatarTransport: Send + Sync {
    /// Requests a new remote session.
    ///
    /// # Errors
    ///
    /// Returns `SessionCreateFailed` when the handshake fails.
    async fn create_session(&self, token: &str, config: &AvatarConfig) -> Result<CreatedSession>;

    /// Issues a remote utterance command for the given session.
    async fn speak(&self, session_id: &str, text: &str) -> Result<()>;

    /// Tears down the remote session.
    async fn stop_session(&self, session_id: &str) -> Result<()>;
}
