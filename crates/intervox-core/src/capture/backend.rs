//! Port traits for the platform capture subsystem.
//!
//! The core never talks to device APIs directly; the hosting layer supplies
//! an implementation of these traits (and tests supply mocks).

use crate::error::Result;
use async_trait::async_trait;

/// An abstract interface over the platform's media capture subsystem.
///
/// Implementations wrap whatever the host platform offers for permission
/// queries and stream acquisition by device id.
#[async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Whether capture permission has already been granted.
    async fn permission_granted(&self) -> bool;

    /// Performs a one-shot acquisition that is immediately released.
    ///
    /// Used solely to trigger the platform permission prompt before the
    /// real, device-bound acquisition. Fails with `PermissionDenied` when
    /// the user declines.
    async fn probe(&self) -> Result<()>;

    /// Acquires a stream bound to the given camera and microphone ids.
    ///
    /// # Errors
    ///
    /// - `PermissionDenied` when the platform denies access
    /// - `DeviceUnavailable` when a device id no longer exists
    async fn acquire(
        &self,
        camera_id: &str,
        microphone_id: &str,
    ) -> Result<Box<dyn MediaStream>>;
}

/// An owned handle to an acquired local media stream.
///
/// Enabling a track lights the hardware indicator on the underlying
/// device; that side effect is unavoidable and not an error condition.
pub trait MediaStream: Send + Sync {
    /// Enables or disables the audio track without reacquiring.
    fn set_audio_enabled(&self, enabled: bool);

    /// Enables or disables the video track without reacquiring.
    fn set_video_enabled(&self, enabled: bool);

    /// Current enabled flag of the audio track.
    fn audio_enabled(&self) -> bool;

    /// Current enabled flag of the video track.
    fn video_enabled(&self) -> bool;

    /// Stops all tracks, turning off hardware indicators.
    fn stop(&self);
}
