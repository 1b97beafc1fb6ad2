// SPDX-License-Identifier: GPL-3.0-only

//! Commits captured stills into the form
//!
//! The binder is handed its target ids explicitly and resolves them on every
//! commit. Nothing is written unless both the file input and the preview
//! surface exist.

use super::form::{FieldValue, FormDocument, SubmittedFile};
use super::session::{CaptureSession, Side};
use crate::constants::fields;
use crate::errors::{CaptureError, CaptureResult};
use tracing::{debug, info, warn};

/// File input id used by the guide registration form
pub const DEFAULT_FILE_INPUT: &str = "documentPhotos";

/// Preview surface id used by the guide registration form
pub const DEFAULT_PREVIEW: &str = "documentPreview";

/// Ids of the file input and preview surface a capture writes into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingTarget {
    pub field_id: String,
    pub preview_id: String,
}

impl BindingTarget {
    pub fn new(field_id: &str, preview_id: &str) -> Self {
        Self {
            field_id: field_id.to_string(),
            preview_id: preview_id.to_string(),
        }
    }
}

impl Default for BindingTarget {
    fn default() -> Self {
        Self::new(DEFAULT_FILE_INPUT, DEFAULT_PREVIEW)
    }
}

/// Writes session results into a [`FormDocument`]
pub struct TargetBinder;

impl TargetBinder {
    /// Check that both target ids exist in the form
    pub fn resolve(target: &BindingTarget, form: &FormDocument) -> CaptureResult<()> {
        if form.file_input(&target.field_id).is_none() {
            warn!(field = %target.field_id, "Binding target file input not found");
            return Err(CaptureError::TargetNotFound(target.field_id.clone()));
        }
        if form.preview(&target.preview_id).is_none() {
            warn!(preview = %target.preview_id, "Binding target preview not found");
            return Err(CaptureError::TargetNotFound(target.preview_id.clone()));
        }
        Ok(())
    }

    /// Commit every accepted still of the session
    ///
    /// Values are replaced, never appended, so committing the same session
    /// twice leaves the form unchanged. Sides that are not captured yet are
    /// left out, and a photo of such a side left over from an earlier session
    /// (e.g. `backPhotoData` after switching to a passport) is removed.
    pub fn commit(
        session: &CaptureSession,
        target: &BindingTarget,
        form: &mut FormDocument,
    ) -> CaptureResult<()> {
        Self::resolve(target, form)?;

        let mut files = Vec::new();
        let mut previews = Vec::new();
        for (side, image) in session.captured_images() {
            let file = SubmittedFile {
                name: image.file_name(&format!("{}_{}", session.document(), side)),
                mime_type: image.mime_type().to_string(),
                data: image.data.clone(),
            };
            debug!(side = %side, name = %file.name, size = file.size(), "Binding still");

            form.set_value(side.field_key(), FieldValue::File(file.clone()));
            previews.push(image.data_url());
            files.push(file);
        }

        for side in [Side::Front, Side::Back] {
            if session.captured(side).is_none() && form.remove_value(side.field_key()).is_some() {
                debug!(side = %side, "Removed stale photo");
            }
        }
        form.set_text(fields::PHOTO_MODE, session.photo_mode().as_str());

        let file_count = files.len();
        if let Some(input) = form.file_input_mut(&target.field_id) {
            input.files = files;
        }
        if let Some(preview) = form.preview_mut(&target.preview_id) {
            preview.visible = !previews.is_empty();
            preview.images = previews;
        }

        info!(
            session = %session.id(),
            document = %session.document(),
            files = file_count,
            photo_mode = %session.photo_mode(),
            "Committed captured stills to form"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::Facing;
    use crate::flow::session::DocumentType;
    use crate::pipelines::photo::{EncodingFormat, ImageOrigin, StillImage};
    use std::sync::Arc;

    fn still(byte: u8) -> StillImage {
        StillImage {
            data: Arc::from(vec![byte; 16].into_boxed_slice()),
            format: EncodingFormat::Jpeg,
            width: 4,
            height: 4,
            origin: ImageOrigin::Camera {
                facing: Facing::Environment,
            },
        }
    }

    fn form() -> FormDocument {
        FormDocument::new()
            .with_file_input(DEFAULT_FILE_INPUT)
            .with_preview(DEFAULT_PREVIEW)
    }

    fn completed(document: DocumentType) -> CaptureSession {
        let mut session = CaptureSession::new(document);
        let mut byte = 1;
        while !session.is_complete() {
            session.stage(still(byte)).unwrap();
            session.accept().unwrap();
            byte += 1;
        }
        session
    }

    #[test]
    fn test_dual_commit() {
        let session = completed(DocumentType::DriversLicense);
        let mut form = form();
        TargetBinder::commit(&session, &BindingTarget::default(), &mut form).unwrap();

        let front = form.file(fields::FRONT_PHOTO).unwrap();
        let back = form.file(fields::BACK_PHOTO).unwrap();
        assert_ne!(front.data, back.data);
        assert_eq!(front.name, "drivers-license_front.jpg");
        assert_eq!(form.text(fields::PHOTO_MODE), Some("dual"));

        let input = form.file_input(DEFAULT_FILE_INPUT).unwrap();
        assert_eq!(input.files.len(), 2);
        let preview = form.preview(DEFAULT_PREVIEW).unwrap();
        assert!(preview.visible);
        assert!(preview.images[0].starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_commit_is_idempotent() {
        let session = completed(DocumentType::NationalId);
        let mut form = form();
        let target = BindingTarget::default();

        TargetBinder::commit(&session, &target, &mut form).unwrap();
        let first = form.submission_summary();
        TargetBinder::commit(&session, &target, &mut form).unwrap();

        assert_eq!(form.submission_summary(), first);
        assert_eq!(form.file_input(DEFAULT_FILE_INPUT).unwrap().files.len(), 2);
        assert_eq!(form.preview(DEFAULT_PREVIEW).unwrap().images.len(), 2);
    }

    #[test]
    fn test_single_sided_removes_stale_back() {
        let mut form = form();
        let target = BindingTarget::default();
        TargetBinder::commit(&completed(DocumentType::DriversLicense), &target, &mut form)
            .unwrap();
        TargetBinder::commit(&completed(DocumentType::Passport), &target, &mut form).unwrap();

        assert!(form.value(fields::BACK_PHOTO).is_none());
        assert_eq!(form.text(fields::PHOTO_MODE), Some("single"));
        assert_eq!(form.file_input(DEFAULT_FILE_INPUT).unwrap().files.len(), 1);
    }

    #[test]
    fn test_missing_target_leaves_form_untouched() {
        let session = completed(DocumentType::Passport);
        let mut form = FormDocument::new().with_file_input(DEFAULT_FILE_INPUT);

        let err = TargetBinder::commit(&session, &BindingTarget::default(), &mut form).unwrap_err();
        assert_eq!(err, CaptureError::TargetNotFound(DEFAULT_PREVIEW.into()));
        assert_eq!(form.values().count(), 0);
        assert!(form.file_input(DEFAULT_FILE_INPUT).unwrap().files.is_empty());
        assert!(session.captured(Side::Front).is_some());
    }

    #[test]
    fn test_partial_session_commits_front_only() {
        let mut session = CaptureSession::new(DocumentType::DriversLicense);
        session.stage(still(5)).unwrap();
        session.accept().unwrap();

        let mut form = form();
        TargetBinder::commit(&session, &BindingTarget::default(), &mut form).unwrap();
        assert!(form.file(fields::FRONT_PHOTO).is_some());
        assert!(form.value(fields::BACK_PHOTO).is_none());
        assert_eq!(form.text(fields::PHOTO_MODE), Some("dual"));
    }

    #[test]
    fn test_resolve_names_the_missing_id() {
        let target = BindingTarget::new("idPhotos", "idPreview");
        let mut form = FormDocument::new();
        assert_eq!(
            TargetBinder::resolve(&target, &form),
            Err(CaptureError::TargetNotFound("idPhotos".into()))
        );

        form.add_file_input("idPhotos");
        assert_eq!(
            TargetBinder::resolve(&target, &form),
            Err(CaptureError::TargetNotFound("idPreview".into()))
        );

        form.add_preview("idPreview");
        assert!(TargetBinder::resolve(&target, &form).is_ok());
    }
}
