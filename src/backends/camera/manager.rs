// SPDX-License-Identifier: GPL-3.0-only

//! Per-surface camera acquisition
//!
//! The acquisition component provides:
//! - Exclusive ownership of at most one [`MediaHandle`] per capture surface
//! - Implicit close of the active handle before a replacement is requested
//! - Cancellation of in-flight opens when the surface closes

use super::MediaSource;
use super::handle::{HandleInfo, MediaHandle};
use super::types::{CameraFrame, Facing};
use crate::constants::timing;
use crate::errors::{CaptureError, CaptureResult};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{info, warn};

/// Internal acquisition state
#[derive(Default)]
struct AcquisitionState {
    /// The active handle, if any
    handle: Option<MediaHandle>,
    /// Bumped by every open and close; an in-flight open whose generation no
    /// longer matches has been cancelled or superseded
    generation: u64,
    /// An open is awaiting the platform
    pending: bool,
}

/// Camera acquisition for one capture surface
///
/// Cloning yields another reference to the same surface slot, which is how a
/// close issued from the UI reaches an open that is still awaiting the
/// permission prompt.
#[derive(Clone)]
pub struct MediaAcquisition {
    source: Arc<dyn MediaSource>,
    state: Arc<Mutex<AcquisitionState>>,
    surface: Arc<str>,
    timeout: Duration,
}

/// Clears the pending flag if the open future is dropped before it settles
struct PendingGuard<'a> {
    state: &'a Mutex<AcquisitionState>,
    generation: u64,
    armed: bool,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.generation == self.generation {
            state.pending = false;
        }
    }
}

impl MediaAcquisition {
    /// Create the acquisition slot for a surface
    pub fn new(source: Arc<dyn MediaSource>, surface: &str) -> Self {
        info!(surface, backend = %source.backend_type(), "Creating media acquisition");
        Self {
            source,
            state: Arc::new(Mutex::new(AcquisitionState::default())),
            surface: Arc::from(surface),
            timeout: Duration::from_secs(timing::DEFAULT_ACQUISITION_TIMEOUT_SECS),
        }
    }

    /// Bound how long an open may wait for the platform
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn surface(&self) -> &str {
        &self.surface
    }

    pub fn source(&self) -> &Arc<dyn MediaSource> {
        &self.source
    }

    fn lock(&self) -> MutexGuard<'_, AcquisitionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Open a camera stream with the given facing
    ///
    /// Any active handle on this surface is closed first. If the surface is
    /// closed (or another open starts) while this one is waiting, the stream
    /// it eventually receives is stopped on the spot and `Cancelled` is
    /// returned.
    pub async fn open(&self, facing: Facing) -> CaptureResult<HandleInfo> {
        let generation = {
            let mut state = self.lock();
            if let Some(mut previous) = state.handle.take() {
                info!(surface = %self.surface, facing = %previous.facing(), "Closing active stream before reopening");
                previous.close();
            }
            state.generation += 1;
            state.pending = true;
            state.generation
        };

        let mut guard = PendingGuard {
            state: self.state.as_ref(),
            generation,
            armed: true,
        };

        info!(surface = %self.surface, facing = %facing, "Requesting camera");
        let result = tokio::time::timeout(self.timeout, self.source.open(facing)).await;
        guard.armed = false;

        let mut state = self.lock();
        let superseded = state.generation != generation;
        if !superseded {
            state.pending = false;
        }

        match result {
            Ok(Ok((device, mut stream))) => {
                if superseded {
                    stream.stop();
                    info!(surface = %self.surface, device = %device.name, "Acquisition cancelled, released late stream");
                    return Err(CaptureError::Cancelled);
                }
                let handle = MediaHandle::new(facing, device.name, stream);
                let handle_info = handle.info().clone();
                state.handle = Some(handle);
                info!(surface = %self.surface, facing = %facing, device = %handle_info.device, "Camera stream active");
                Ok(handle_info)
            }
            _ if superseded => Err(CaptureError::Cancelled),
            Ok(Err(e)) => {
                warn!(surface = %self.surface, facing = %facing, error = %e, "Camera unavailable");
                Err(e.into())
            }
            Err(_) => {
                warn!(surface = %self.surface, timeout = ?self.timeout, "Camera open timed out");
                Err(CaptureError::DeviceUnavailable(format!(
                    "timed out after {:?} waiting for the camera",
                    self.timeout
                )))
            }
        }
    }

    /// Reopen with the opposite facing of the active (or preferred) handle
    pub async fn switch_facing(&self, preferred: Facing) -> CaptureResult<HandleInfo> {
        let next = self
            .active_facing()
            .map(Facing::opposite)
            .unwrap_or(preferred);
        info!(surface = %self.surface, facing = %next, "Switching camera facing");
        self.open(next).await
    }

    /// Close the active handle and cancel any pending open. Idempotent.
    pub fn close(&self) {
        let mut state = self.lock();
        if state.pending {
            info!(surface = %self.surface, "Cancelling pending camera request");
        }
        state.generation += 1;
        state.pending = false;
        if let Some(mut handle) = state.handle.take() {
            handle.close();
        }
    }

    /// An open is waiting for the platform
    pub fn is_pending(&self) -> bool {
        self.lock().pending
    }

    /// A handle is active on this surface
    pub fn is_active(&self) -> bool {
        self.lock()
            .handle
            .as_ref()
            .map(MediaHandle::is_active)
            .unwrap_or(false)
    }

    pub fn active_facing(&self) -> Option<Facing> {
        self.lock().handle.as_ref().map(MediaHandle::facing)
    }

    pub fn handle_info(&self) -> Option<HandleInfo> {
        self.lock().handle.as_ref().map(|h| h.info().clone())
    }

    /// Latest decoded frame of the active handle
    ///
    /// Always `None` while an open is in flight, so a capture can never race
    /// an acquisition on the same surface.
    pub fn latest_frame(&self) -> Option<CameraFrame> {
        let state = self.lock();
        if state.pending {
            return None;
        }
        state.handle.as_ref().and_then(MediaHandle::latest_frame)
    }
}

impl std::fmt::Debug for MediaAcquisition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("MediaAcquisition")
            .field("surface", &self.surface)
            .field("backend", &self.source.backend_type())
            .field("pending", &state.pending)
            .field("handle", &state.handle)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::virtual_camera::TestPatternSource;

    #[tokio::test]
    async fn test_open_then_close() {
        let source = Arc::new(TestPatternSource::new());
        let acquisition = MediaAcquisition::new(source.clone(), "modal");

        let info = acquisition.open(Facing::Environment).await.unwrap();
        assert_eq!(info.facing, Facing::Environment);
        assert!(acquisition.is_active());
        assert_eq!(source.active_streams(), 1);

        acquisition.close();
        acquisition.close();
        assert!(!acquisition.is_active());
        assert_eq!(source.active_streams(), 0);
    }

    #[tokio::test]
    async fn test_reopen_closes_previous_handle_first() {
        let source = Arc::new(TestPatternSource::new());
        let acquisition = MediaAcquisition::new(source.clone(), "modal");

        let first = acquisition.open(Facing::Environment).await.unwrap();
        let second = acquisition.switch_facing(Facing::Environment).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(second.facing, Facing::User);
        assert_eq!(source.active_streams(), 1);
        assert_eq!(source.peak_streams(), 1);
    }

    #[tokio::test]
    async fn test_denied_open_creates_no_handle() {
        let source = Arc::new(TestPatternSource::denied("NotAllowedError"));
        let acquisition = MediaAcquisition::new(source, "modal");

        let err = acquisition.open(Facing::Environment).await.unwrap_err();
        assert!(err.needs_fallback());
        assert!(!acquisition.is_active());
        assert!(!acquisition.is_pending());
        assert!(acquisition.handle_info().is_none());
    }

    #[tokio::test]
    async fn test_close_while_pending_releases_late_stream() {
        let source = Arc::new(TestPatternSource::new().with_open_delay(Duration::from_millis(50)));
        let acquisition = MediaAcquisition::new(source.clone(), "modal");

        let pending = acquisition.clone();
        let task = tokio::spawn(async move { pending.open(Facing::Environment).await });

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(acquisition.is_pending());
        assert!(acquisition.latest_frame().is_none());

        acquisition.close();
        let result = task.await.unwrap();

        assert_eq!(result, Err(CaptureError::Cancelled));
        assert!(!acquisition.is_active());
        assert_eq!(source.active_streams(), 0);
    }

    #[tokio::test]
    async fn test_open_times_out() {
        let source = Arc::new(TestPatternSource::new().with_open_delay(Duration::from_millis(200)));
        let acquisition =
            MediaAcquisition::new(source.clone(), "modal").with_timeout(Duration::from_millis(20));

        let err = acquisition.open(Facing::User).await.unwrap_err();
        assert!(matches!(err, CaptureError::DeviceUnavailable(_)));
        assert!(!acquisition.is_pending());
        assert_eq!(source.active_streams(), 0);
    }
}
