// SPDX-License-Identifier: MPL-2.0

//! doccapture - document photo capture for guide registration
//!
//! This library implements the identity-document photo step of a tourist
//! guide registration form: the user picks a document type, the front (and,
//! for double-sided documents, the back) is photographed with a camera or
//! picked from a file, and the accepted stills are written into the form.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`backends`]: Camera sources (V4L2, image files, test pattern) and
//!   per-surface acquisition with cancellation
//! - [`pipelines`]: Frame capture, post-processing and encoding
//! - [`flow`]: Capture sessions, the form model, the binder and the capture
//!   surface that ties them together
//! - [`config`]: User configuration handling
//! - [`storage`]: Loading selected files and writing stills
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use doccapture::backends::virtual_camera::TestPatternSource;
//! use doccapture::flow::{BindingTarget, CaptureSurface, DocumentType, FormDocument};
//! use doccapture::flow::binder::{DEFAULT_FILE_INPUT, DEFAULT_PREVIEW};
//! use doccapture::pipelines::photo::PhotoPipeline;
//!
//! # async fn run() -> doccapture::errors::CaptureResult<()> {
//! let mut form = FormDocument::new()
//!     .with_file_input(DEFAULT_FILE_INPUT)
//!     .with_preview(DEFAULT_PREVIEW);
//! let mut surface = CaptureSurface::new(
//!     Arc::new(TestPatternSource::new()),
//!     "registration",
//!     PhotoPipeline::new(),
//!     BindingTarget::default(),
//! );
//!
//! surface.start_session(DocumentType::Passport);
//! surface.open_camera().await?;
//! surface.capture().await?;
//! surface.accept(&mut form).await?;
//! # Ok(())
//! # }
//! ```

pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod flow;
pub mod pipelines;
pub mod storage;

// Re-export commonly used types
pub use config::Config;
pub use constants::PhotoMode;
pub use errors::{CaptureError, CaptureResult};
pub use flow::{CaptureSession, CaptureSurface, DocumentType, FormDocument, Side};
