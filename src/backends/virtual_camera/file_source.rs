// SPDX-License-Identifier: GPL-3.0-only

//! Image files as a camera
//!
//! Every open serves the current file of the list as a still stream. The
//! list moves on when a side is accepted, so a retake sees the same file, and
//! it stays on the last file once the list runs out.

use crate::backends::camera::types::{
    BackendError, BackendResult, CameraBackendType, CameraDevice, CameraFrame, Facing,
};
use crate::backends::camera::{MediaSource, MediaStream};
use crate::constants::file_formats;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info};

/// Load an image file into an RGBA frame
pub fn load_image_as_frame(path: &Path) -> BackendResult<CameraFrame> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    if !file_formats::is_image_extension(&extension) {
        return Err(BackendError::FormatNotSupported(format!(
            "Unsupported file format: {}",
            extension
        )));
    }

    info!(path = %path.display(), "Loading image file");

    let img = image::open(path).map_err(|e| {
        BackendError::Other(format!("Failed to load image '{}': {}", path.display(), e))
    })?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    debug!(width, height, "Image loaded");

    Ok(CameraFrame::from_rgba(width, height, rgba.into_raw(), 1))
}

/// Camera backed by a list of image files
#[derive(Debug)]
pub struct FileSource {
    files: Vec<PathBuf>,
    cursor: AtomicUsize,
}

impl FileSource {
    pub fn new(files: Vec<PathBuf>) -> Self {
        Self {
            files,
            cursor: AtomicUsize::new(0),
        }
    }

    /// File the next open will serve
    pub fn next_file(&self) -> Option<&Path> {
        let last = self.files.len().checked_sub(1)?;
        let index = self.cursor.load(Ordering::SeqCst).min(last);
        self.files.get(index).map(PathBuf::as_path)
    }

    fn device_for(path: &Path, facing: Facing) -> CameraDevice {
        CameraDevice {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string()),
            path: path.display().to_string(),
            facing,
            device_info: None,
        }
    }
}

#[async_trait]
impl MediaSource for FileSource {
    fn enumerate_cameras(&self) -> Vec<CameraDevice> {
        self.files
            .iter()
            .map(|p| Self::device_for(p, Facing::Environment))
            .collect()
    }

    async fn open(&self, facing: Facing) -> BackendResult<(CameraDevice, Box<dyn MediaStream>)> {
        let path = self
            .next_file()
            .map(Path::to_path_buf)
            .ok_or_else(|| BackendError::DeviceNotFound("no image files given".into()))?;

        let load_path = path.clone();
        let frame = tokio::task::spawn_blocking(move || load_image_as_frame(&load_path))
            .await
            .map_err(|e| BackendError::Other(format!("image load task failed: {}", e)))??;

        info!(path = %path.display(), facing = %facing, "File source opened");

        let stream = StillStream { frame: Some(frame) };
        Ok((Self::device_for(&path, facing), Box::new(stream)))
    }

    fn backend_type(&self) -> CameraBackendType {
        CameraBackendType::File
    }

    fn advance(&self) {
        let index = self.cursor.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(index, "File source advanced");
    }
}

/// Stream that keeps returning one decoded image
struct StillStream {
    frame: Option<CameraFrame>,
}

impl MediaStream for StillStream {
    fn latest_frame(&self) -> Option<CameraFrame> {
        self.frame.clone()
    }

    fn stop(&mut self) {
        self.frame = None;
    }
}
