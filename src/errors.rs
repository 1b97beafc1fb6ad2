// SPDX-License-Identifier: MPL-2.0

//! Error types for the capture flow

use crate::backends::camera::types::BackendError;
use thiserror::Error;

/// Result type alias using CaptureError
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Errors surfaced by the document capture flow
///
/// None of these are fatal to the hosting form. Every variant either resolves
/// locally (the capture control stays disabled) or degrades to manual file
/// selection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    /// Camera missing, denied, or failed to start
    #[error("Camera unavailable: {0}")]
    DeviceUnavailable(String),
    /// Capture attempted before the stream produced a frame
    #[error("Camera is not ready for capture")]
    NotReady,
    /// Destination field or preview is missing from the form
    #[error("Binding target not found: {0}")]
    TargetNotFound(String),
    /// Acquisition was cancelled by closing the surface or by a newer open
    #[error("Camera acquisition was cancelled")]
    Cancelled,
    /// The session already holds every required side
    #[error("Capture session is already complete")]
    SessionComplete,
    /// Accept was requested with no staged image
    #[error("No captured image awaiting review")]
    NothingToAccept,
    /// The surface has no session to work on
    #[error("No capture session in progress")]
    NoSession,
    /// Encoding or decoding the still failed
    #[error(transparent)]
    Photo(#[from] PhotoError),
}

impl CaptureError {
    /// Whether the UI should offer manual file selection instead of the camera
    pub fn needs_fallback(&self) -> bool {
        matches!(self, CaptureError::DeviceUnavailable(_))
    }
}

impl From<BackendError> for CaptureError {
    fn from(err: BackendError) -> Self {
        CaptureError::DeviceUnavailable(err.to_string())
    }
}

/// Photo encoding and file errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhotoError {
    /// Frame data does not describe a usable image
    #[error("Empty image: {0}")]
    EmptyImage(String),
    /// Encoding failed
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),
    /// Decoding a selected file failed
    #[error("Decoding failed: {0}")]
    DecodeFailed(String),
    /// Reading or writing a file failed
    #[error("File error: {0}")]
    Io(String),
}

impl From<std::io::Error> for PhotoError {
    fn from(err: std::io::Error) -> Self {
        PhotoError::Io(err.to_string())
    }
}

/// Top-level error for the command-line tool
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("{0}")]
    Other(String),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<PhotoError> for AppError {
    fn from(err: PhotoError) -> Self {
        AppError::Capture(CaptureError::Photo(err))
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}
