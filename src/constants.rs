// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Discriminator written to the `photoMode` form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoMode {
    /// Only the front of the document was captured
    Single,
    /// Front and back were captured
    Dual,
}

impl PhotoMode {
    /// Value stored in the form
    pub fn as_str(&self) -> &'static str {
        match self {
            PhotoMode::Single => "single",
            PhotoMode::Dual => "dual",
        }
    }
}

impl std::fmt::Display for PhotoMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Form field keys consumed by the submission glue
pub mod fields {
    /// Front side photo
    pub const FRONT_PHOTO: &str = "frontPhotoData";

    /// Back side photo
    pub const BACK_PHOTO: &str = "backPhotoData";

    /// `single` / `dual` discriminator
    pub const PHOTO_MODE: &str = "photoMode";
}

/// Supported file formats for the file source and manual selection
pub mod file_formats {
    /// Supported image file extensions
    pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

    /// Check if a file extension is a supported image format
    pub fn is_image_extension(ext: &str) -> bool {
        IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
    }
}

/// Timing constants
pub mod timing {
    use super::Duration;

    /// Default upper bound for a camera open (permission prompt + device init)
    pub const DEFAULT_ACQUISITION_TIMEOUT_SECS: u64 = 10;

    /// Poll interval while waiting for the first decoded frame
    pub const FIRST_FRAME_POLL_INTERVAL: Duration = Duration::from_millis(16);

    /// How long the CLI waits for the first frame before giving up
    pub const FIRST_FRAME_TIMEOUT: Duration = Duration::from_secs(5);

    /// Warm-up period so auto exposure settles before the CLI freezes a frame
    pub const CAMERA_WARMUP: Duration = Duration::from_millis(500);
}

/// V4L2 capture constants
pub mod v4l2 {
    /// Number of mmap buffers requested from the driver (keep small for low latency)
    pub const BUFFER_COUNT: u32 = 4;

    /// Requested capture resolution; the driver picks the closest supported one
    pub const PREFERRED_WIDTH: u32 = 1280;
    pub const PREFERRED_HEIGHT: u32 = 720;

    /// `V4L2_CAP_VIDEO_CAPTURE`
    pub const CAP_VIDEO_CAPTURE: u32 = 0x0000_0001;

    /// Device name fragments that identify a rear (environment) camera
    pub const ENVIRONMENT_NAME_HINTS: &[&str] = &["back", "rear", "world", "environment"];
}

/// Test pattern defaults
pub mod test_pattern {
    pub const DEFAULT_WIDTH: u32 = 64;
    pub const DEFAULT_HEIGHT: u32 = 48;
}

/// Application information utilities
pub mod app_info {
    /// Get the application version from build-time environment
    pub fn version() -> &'static str {
        env!("GIT_VERSION")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_photo_mode_values() {
        assert_eq!(PhotoMode::Single.as_str(), "single");
        assert_eq!(PhotoMode::Dual.to_string(), "dual");
    }

    #[test]
    fn test_image_extensions_case_insensitive() {
        assert!(file_formats::is_image_extension("JPG"));
        assert!(file_formats::is_image_extension("png"));
        assert!(!file_formats::is_image_extension("mp4"));
    }
}
