// SPDX-License-Identifier: GPL-3.0-only
// Shared types for camera backend abstraction

//! Shared types for camera backends

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// Which way the camera faces
///
/// Mirrors the two `facingMode` values a browser accepts: the selfie camera
/// and the rear camera used for photographing documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    /// Front / selfie camera
    User,
    /// Rear camera
    #[default]
    Environment,
}

impl Facing {
    pub const ALL: [Facing; 2] = [Facing::User, Facing::Environment];

    /// The other facing
    pub fn opposite(self) -> Self {
        match self {
            Facing::User => Facing::Environment,
            Facing::Environment => Facing::User,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Facing::User => "user",
            Facing::Environment => "environment",
        }
    }
}

impl std::fmt::Display for Facing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Facing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "user" | "front" | "selfie" => Ok(Facing::User),
            "environment" | "back" | "rear" => Ok(Facing::Environment),
            other => Err(format!("unknown facing '{}' (expected user or environment)", other)),
        }
    }
}

/// Camera backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CameraBackendType {
    /// Video4Linux2 devices under /dev/video*
    #[default]
    V4l2,
    /// Image files served as a camera
    File,
    /// Synthesised frames
    TestPattern,
}

impl std::fmt::Display for CameraBackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CameraBackendType::V4l2 => write!(f, "V4L2"),
            CameraBackendType::File => write!(f, "file"),
            CameraBackendType::TestPattern => write!(f, "test-pattern"),
        }
    }
}

impl FromStr for CameraBackendType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "v4l2" => Ok(CameraBackendType::V4l2),
            "file" => Ok(CameraBackendType::File),
            "test-pattern" | "test" => Ok(CameraBackendType::TestPattern),
            other => Err(format!("unknown backend '{}'", other)),
        }
    }
}

/// Device information from V4L2 capability
#[derive(Debug, Clone, Default)]
pub struct DeviceInfo {
    /// Name of the device (V4L2 card)
    pub card: String,
    /// Driver name (V4L2 driver)
    pub driver: String,
    /// Device path (e.g., /dev/video0)
    pub path: String,
    /// Real device path (resolved symlinks)
    pub real_path: String,
}

/// Represents a camera device
#[derive(Debug, Clone)]
pub struct CameraDevice {
    pub name: String,
    pub path: String,
    pub facing: Facing,
    pub device_info: Option<DeviceInfo>,
}

/// Pixel format for camera frames
///
/// Backends convert whatever the device delivers into RGBA before a frame
/// leaves the capture thread, so only the negotiated wire formats and the
/// canonical RGBA format appear here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// RGBA - 32-bit with alpha (4 bytes per pixel)
    RGBA,
    /// YUYV - Packed 4:2:2 (Y0 U Y1 V interleaved)
    YUYV,
    /// Motion JPEG - each buffer is a complete JPEG image
    MJPEG,
}

impl PixelFormat {
    /// Parse a V4L2 FourCC code
    pub fn from_fourcc(fourcc: &[u8; 4]) -> Option<Self> {
        match fourcc {
            b"MJPG" | b"JPEG" => Some(Self::MJPEG),
            b"YUYV" | b"YUY2" => Some(Self::YUYV),
            b"AB24" | b"RGBA" => Some(Self::RGBA),
            _ => None,
        }
    }
}

/// A single decoded frame from the camera, always RGBA
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    pub data: Arc<[u8]>,
    pub format: PixelFormat,
    /// Row stride in bytes
    pub stride: u32,
    pub captured_at: Instant,
    /// Monotonic per-stream frame counter
    pub sequence: u64,
}

impl CameraFrame {
    /// Wrap tightly packed RGBA pixels
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>, sequence: u64) -> Self {
        Self {
            width,
            height,
            data: Arc::from(data.into_boxed_slice()),
            format: PixelFormat::RGBA,
            stride: width.saturating_mul(4),
            captured_at: Instant::now(),
            sequence,
        }
    }

    /// Whether the frame has known, non-zero intrinsic dimensions
    pub fn has_dimensions(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Error types for backend operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Backend is not available on this system
    #[error("Backend not available: {0}")]
    NotAvailable(String),
    /// The platform refused camera access
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    /// Camera device not found
    #[error("Device not found: {0}")]
    DeviceNotFound(String),
    /// Format not supported
    #[error("Format not supported: {0}")]
    FormatNotSupported(String),
    /// General I/O error
    #[error("I/O error: {0}")]
    IoError(String),
    /// Other errors
    #[error("Error: {0}")]
    Other(String),
}

impl From<std::io::Error> for BackendError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => BackendError::PermissionDenied(err.to_string()),
            std::io::ErrorKind::NotFound => BackendError::DeviceNotFound(err.to_string()),
            _ => BackendError::IoError(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facing_parse_and_opposite() {
        assert_eq!("rear".parse::<Facing>(), Ok(Facing::Environment));
        assert_eq!("USER".parse::<Facing>(), Ok(Facing::User));
        assert!("sideways".parse::<Facing>().is_err());
        assert_eq!(Facing::User.opposite(), Facing::Environment);
    }

    #[test]
    fn test_fourcc_mapping() {
        assert_eq!(PixelFormat::from_fourcc(b"MJPG"), Some(PixelFormat::MJPEG));
        assert_eq!(PixelFormat::from_fourcc(b"YUYV"), Some(PixelFormat::YUYV));
        assert_eq!(PixelFormat::from_fourcc(b"H264"), None);
    }

    #[test]
    fn test_io_permission_error_maps_to_denied() {
        let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "EACCES");
        assert!(matches!(BackendError::from(err), BackendError::PermissionDenied(_)));
    }

    #[test]
    fn test_zero_sized_frame_has_no_dimensions() {
        let frame = CameraFrame::from_rgba(0, 0, Vec::new(), 0);
        assert!(!frame.has_dimensions());
    }
}
