// SPDX-License-Identifier: GPL-3.0-only

//! Document capture flow
//!
//! - [`session`]: which sides of a document are still needed
//! - [`form`]: explicit model of the registration form
//! - [`binder`]: writes accepted stills into the form
//! - [`surface`]: ties camera, session and binder together for one UI

pub mod binder;
pub mod form;
pub mod session;
pub mod surface;

pub use binder::{BindingTarget, TargetBinder};
pub use form::{FieldValue, FileInput, FormDocument, PreviewSurface, SubmittedFile};
pub use session::{CaptureSession, DocumentKind, DocumentType, SessionState, SessionStatus, Side};
pub use surface::{CaptureSurface, SurfaceStatus};
