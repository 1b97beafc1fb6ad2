// SPDX-License-Identifier: MPL-2.0

//! Camera backend abstraction
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │   Capture surface   │
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │  MediaAcquisition   │  ← One handle per surface, cancellation
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │  MediaSource trait  │  ← open(facing) -> MediaStream
//! └──────────┬──────────┘
//!            │
//!      ┌─────┴──────┬──────────────┐
//!      ▼            ▼              ▼
//!  ┌──────┐   ┌──────────┐   ┌────────────┐
//!  │ V4L2 │   │   File   │   │Test pattern│
//!  └──────┘   └──────────┘   └────────────┘
//! ```

pub mod format_converters;
pub mod frame_loop;
pub mod handle;
pub mod manager;
pub mod types;
pub mod v4l2;
pub mod v4l2_utils;

pub use handle::{HandleInfo, MediaHandle};
pub use manager::MediaAcquisition;
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// A live camera stream
///
/// Implementations must stop the underlying device when dropped, so a stream
/// that nobody holds never keeps the camera busy.
pub trait MediaStream: Send {
    /// Most recent decoded frame, `None` until the device delivered one
    fn latest_frame(&self) -> Option<CameraFrame>;

    /// Stop the device and release it. Must be idempotent.
    fn stop(&mut self);
}

/// A platform camera provider
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Enumerate available cameras on this backend
    fn enumerate_cameras(&self) -> Vec<CameraDevice>;

    /// Request a stream from a camera with the given facing
    ///
    /// This is where the platform permission check and device initialisation
    /// happen, so it may take a while and may fail.
    async fn open(&self, facing: Facing) -> BackendResult<(CameraDevice, Box<dyn MediaStream>)>;

    /// Get the backend type identifier
    fn backend_type(&self) -> CameraBackendType;

    /// Called once a side has been accepted; sources that serve a fixed
    /// sequence of inputs move on to the next one
    fn advance(&self) {}
}

/// Get the default platform backend (V4L2)
pub fn get_default_backend() -> Arc<dyn MediaSource> {
    Arc::new(v4l2::V4l2Source::new())
}

/// Pick the device that best matches a facing
///
/// Falls back to the first device when none reports the requested facing,
/// the same way a browser treats `facingMode` as a preference.
pub fn select_device(devices: &[CameraDevice], facing: Facing) -> Option<&CameraDevice> {
    devices
        .iter()
        .find(|d| d.facing == facing)
        .or_else(|| devices.first())
}
