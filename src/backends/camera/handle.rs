// SPDX-License-Identifier: GPL-3.0-only

//! Ownership wrapper around one active camera stream

use super::MediaStream;
use super::types::{CameraFrame, Facing};
use tracing::{debug, info};
use uuid::Uuid;

/// Public description of a handle, safe to hand to UI code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandleInfo {
    pub id: Uuid,
    pub facing: Facing,
    pub device: String,
}

/// One active camera stream
///
/// Owned by exactly one [`MediaAcquisition`](super::MediaAcquisition). Closing
/// stops the stream's tracks; closing twice is harmless, and dropping an open
/// handle closes it.
pub struct MediaHandle {
    info: HandleInfo,
    stream: Box<dyn MediaStream>,
    active: bool,
}

impl MediaHandle {
    pub(crate) fn new(facing: Facing, device: String, stream: Box<dyn MediaStream>) -> Self {
        let info = HandleInfo {
            id: Uuid::new_v4(),
            facing,
            device,
        };
        debug!(handle = %info.id, facing = %facing, device = %info.device, "Media handle created");
        Self {
            info,
            stream,
            active: true,
        }
    }

    pub fn info(&self) -> &HandleInfo {
        &self.info
    }

    pub fn facing(&self) -> Facing {
        self.info.facing
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Latest decoded frame; always `None` once closed
    pub fn latest_frame(&self) -> Option<CameraFrame> {
        if !self.active {
            return None;
        }
        self.stream.latest_frame()
    }

    /// Stop the stream
    pub fn close(&mut self) {
        if !self.active {
            return;
        }
        self.stream.stop();
        self.active = false;
        info!(handle = %self.info.id, facing = %self.info.facing, "Camera stream closed");
    }
}

impl Drop for MediaHandle {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for MediaHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaHandle")
            .field("id", &self.info.id)
            .field("facing", &self.info.facing)
            .field("device", &self.info.device)
            .field("active", &self.active)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingStream {
        stops: Arc<AtomicUsize>,
    }

    impl MediaStream for CountingStream {
        fn latest_frame(&self) -> Option<CameraFrame> {
            Some(CameraFrame::from_rgba(2, 2, vec![0; 16], 1))
        }

        fn stop(&mut self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_close_is_idempotent() {
        let stops = Arc::new(AtomicUsize::new(0));
        let mut handle = MediaHandle::new(
            Facing::User,
            "test".into(),
            Box::new(CountingStream {
                stops: Arc::clone(&stops),
            }),
        );

        assert!(handle.latest_frame().is_some());
        handle.close();
        handle.close();
        drop(handle);

        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_closed_handle_yields_no_frames() {
        let stops = Arc::new(AtomicUsize::new(0));
        let mut handle = MediaHandle::new(
            Facing::Environment,
            "test".into(),
            Box::new(CountingStream { stops }),
        );
        handle.close();
        assert!(!handle.is_active());
        assert!(handle.latest_frame().is_none());
    }
}
