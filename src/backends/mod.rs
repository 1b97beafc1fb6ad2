// SPDX-License-Identifier: MPL-2.0

//! Backend abstraction layer for camera capture
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │         Capture flow (flow::surface)         │
//! └────────────────────┬────────────────────────┘
//!                      │  MediaAcquisition
//! ┌────────────────────┴────────────────────────┐
//! │              Backend Layer                   │
//! │  ┌─────────────┐    ┌──────────────────┐   │
//! │  │    V4L2     │    │  Virtual camera  │   │
//! │  │  (/dev/*)   │    │ (files, pattern) │   │
//! │  └─────────────┘    └──────────────────┘   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`camera`]: media source traits, handle ownership and the V4L2 backend
//! - [`virtual_camera`]: hardware-free sources for files and tests

pub mod camera;
pub mod virtual_camera;

use camera::{CameraBackendType, MediaSource};
use std::path::PathBuf;
use std::sync::Arc;

/// Build the media source for a backend type
///
/// `files` is only used by [`CameraBackendType::File`].
pub fn create_source(backend: CameraBackendType, files: Vec<PathBuf>) -> Arc<dyn MediaSource> {
    match backend {
        CameraBackendType::V4l2 => camera::get_default_backend(),
        CameraBackendType::File => Arc::new(virtual_camera::FileSource::new(files)),
        CameraBackendType::TestPattern => Arc::new(virtual_camera::TestPatternSource::new()),
    }
}
