//! Capture manager: lifecycle of the candidate's local media stream.

use super::backend::{CaptureBackend, MediaStream};
use super::model::{CaptureState, DeviceSelection};
use crate::error::Result;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Exclusive owner of the local camera/microphone stream for one session.
///
/// `CaptureManager` is responsible for:
/// - Acquiring the stream for the selected device pair
/// - Toggling mic/camera tracks on the already-acquired stream
/// - Releasing all tracks on teardown
///
/// Errors from `acquire` are reported, never retried automatically; the
/// caller decides whether to invoke `acquire` again.
pub struct CaptureManager {
    backend: Arc<dyn CaptureBackend>,
    selection: DeviceSelection,
    stream: RwLock<Option<Box<dyn MediaStream>>>,
}

impl CaptureManager {
    /// Creates a new manager for the given device selection.
    pub fn new(backend: Arc<dyn CaptureBackend>, selection: DeviceSelection) -> Self {
        Self {
            backend,
            selection,
            stream: RwLock::new(None),
        }
    }

    /// The device pair this manager was constructed with.
    pub fn selection(&self) -> &DeviceSelection {
        &self.selection
    }

    /// Acquires the local stream for the selected devices.
    ///
    /// When permission is not yet granted, a one-shot probe acquisition
    /// (immediately released) runs first to trigger the permission prompt,
    /// then the real acquisition binds to the requested device ids.
    ///
    /// Calling `acquire` while a stream is already held replaces it after
    /// stopping the old tracks.
    ///
    /// # Errors
    ///
    /// - `PermissionDenied` when the platform denies access
    /// - `DeviceUnavailable` when a selected device id no longer exists
    pub async fn acquire(&self) -> Result<CaptureState> {
        if !self.backend.permission_granted().await {
            tracing::debug!("capture permission not yet granted, probing");
            self.backend.probe().await?;
        }

        let stream = self
            .backend
            .acquire(&self.selection.camera_id, &self.selection.microphone_id)
            .await?;

        tracing::info!(
            camera_id = %self.selection.camera_id,
            microphone_id = %self.selection.microphone_id,
            "local media stream acquired"
        );

        let mut guard = self.stream.write().await;
        if let Some(old) = guard.take() {
            old.stop();
        }
        *guard = Some(stream);
        drop(guard);

        Ok(self.state().await)
    }

    /// Flips the enabled flag on the audio track.
    ///
    /// A missing stream or track is absorbed as a no-op.
    pub async fn toggle_mic(&self) -> CaptureState {
        let guard = self.stream.read().await;
        if let Some(stream) = guard.as_ref() {
            stream.set_audio_enabled(!stream.audio_enabled());
        }
        drop(guard);
        self.state().await
    }

    /// Flips the enabled flag on the video track.
    ///
    /// A missing stream or track is absorbed as a no-op.
    pub async fn toggle_camera(&self) -> CaptureState {
        let guard = self.stream.read().await;
        if let Some(stream) = guard.as_ref() {
            stream.set_video_enabled(!stream.video_enabled());
        }
        drop(guard);
        self.state().await
    }

    /// Stops all tracks and drops the stream reference.
    ///
    /// Idempotent: releasing twice, or releasing an unacquired manager,
    /// is a no-op.
    pub async fn release(&self) {
        let mut guard = self.stream.write().await;
        if let Some(stream) = guard.take() {
            stream.stop();
            tracing::info!("local media stream released");
        }
    }

    /// Current state snapshot for the UI layer.
    pub async fn state(&self) -> CaptureState {
        let guard = self.stream.read().await;
        match guard.as_ref() {
            Some(stream) => CaptureState {
                acquired: true,
                mic_enabled: stream.audio_enabled(),
                camera_enabled: stream.video_enabled(),
            },
            None => CaptureState::released(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IntervoxError;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct MockStream {
        audio: AtomicBool,
        video: AtomicBool,
        stopped: AtomicBool,
    }

    impl MockStream {
        fn new() -> Self {
            Self {
                audio: AtomicBool::new(true),
                video: AtomicBool::new(true),
                stopped: AtomicBool::new(false),
            }
        }
    }

    impl MediaStream for MockStream {
        fn set_audio_enabled(&self, enabled: bool) {
            self.audio.store(enabled, Ordering::SeqCst);
        }

        fn set_video_enabled(&self, enabled: bool) {
            self.video.store(enabled, Ordering::SeqCst);
        }

        fn audio_enabled(&self) -> bool {
            self.audio.load(Ordering::SeqCst)
        }

        fn video_enabled(&self) -> bool {
            self.video.load(Ordering::SeqCst)
        }

        fn stop(&self) {
            self.stopped.store(true, Ordering::SeqCst);
        }
    }

    struct MockBackend {
        permission: AtomicBool,
        probes: AtomicUsize,
        missing_device: Mutex<Option<String>>,
    }

    impl MockBackend {
        fn new(permission: bool) -> Self {
            Self {
                permission: AtomicBool::new(permission),
                probes: AtomicUsize::new(0),
                missing_device: Mutex::new(None),
            }
        }

        fn unplug(&self, device_id: &str) {
            *self.missing_device.lock().unwrap() = Some(device_id.to_string());
        }
    }

    #[async_trait]
    impl CaptureBackend for MockBackend {
        async fn permission_granted(&self) -> bool {
            self.permission.load(Ordering::SeqCst)
        }

        async fn probe(&self) -> crate::error::Result<()> {
            self.probes.fetch_add(1, Ordering::SeqCst);
            self.permission.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn acquire(
            &self,
            camera_id: &str,
            microphone_id: &str,
        ) -> crate::error::Result<Box<dyn MediaStream>> {
            let missing = self.missing_device.lock().unwrap().clone();
            if let Some(missing) = missing {
                if missing == camera_id || missing == microphone_id {
                    return Err(IntervoxError::device_unavailable(missing));
                }
            }
            Ok(Box::new(MockStream::new()))
        }
    }

    fn selection() -> DeviceSelection {
        DeviceSelection {
            camera_id: "cam-1".to_string(),
            microphone_id: "mic-1".to_string(),
            allow_expression_reading: false,
        }
    }

    #[tokio::test]
    async fn test_acquire_probes_when_permission_missing() {
        let backend = Arc::new(MockBackend::new(false));
        let manager = CaptureManager::new(backend.clone(), selection());

        let state = manager.acquire().await.unwrap();

        assert!(state.acquired);
        assert_eq!(backend.probes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_acquire_skips_probe_when_permission_granted() {
        let backend = Arc::new(MockBackend::new(true));
        let manager = CaptureManager::new(backend.clone(), selection());

        manager.acquire().await.unwrap();

        assert_eq!(backend.probes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_acquire_reports_unplugged_device() {
        let backend = Arc::new(MockBackend::new(true));
        backend.unplug("cam-1");
        let manager = CaptureManager::new(backend, selection());

        let err = manager.acquire().await.unwrap_err();

        assert!(matches!(err, IntervoxError::DeviceUnavailable { .. }));
        assert!(!manager.state().await.acquired);
    }

    #[tokio::test]
    async fn test_toggle_mic_xor_parity() {
        let backend = Arc::new(MockBackend::new(true));
        let manager = CaptureManager::new(backend, selection());
        manager.acquire().await.unwrap();

        let initial = manager.state().await.mic_enabled;
        for n in 1..=5 {
            let state = manager.toggle_mic().await;
            assert_eq!(state.mic_enabled, initial ^ (n % 2 == 1));
        }
    }

    #[tokio::test]
    async fn test_toggle_without_stream_is_noop() {
        let backend = Arc::new(MockBackend::new(true));
        let manager = CaptureManager::new(backend, selection());

        let state = manager.toggle_mic().await;

        assert_eq!(state, CaptureState::released());
    }

    #[tokio::test]
    async fn test_release_is_idempotent() {
        let backend = Arc::new(MockBackend::new(true));
        let manager = CaptureManager::new(backend, selection());
        manager.acquire().await.unwrap();

        manager.release().await;
        manager.release().await;

        assert!(!manager.state().await.acquired);
    }
}
