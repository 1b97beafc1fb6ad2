// SPDX-License-Identifier: GPL-3.0-only

//! Capture surface
//!
//! One capture UI (a modal or an inline panel) and everything it owns: the
//! camera acquisition, the current session, the photo pipeline and the ids of
//! the form elements it writes into. The flow is
//!
//! ```text
//! start_session → open_camera → capture → accept ─┬─▶ open_camera (back side)
//!                      │             │            └─▶ Complete
//!                      │             └─▶ retake → open_camera (same side)
//!                      └─ denied ─▶ FallbackRequired → select_file → accept
//! ```

use super::binder::{BindingTarget, TargetBinder};
use super::form::FormDocument;
use super::session::{CaptureSession, DocumentType, SessionState, Side};
use crate::backends::camera::{Facing, HandleInfo, MediaAcquisition, MediaSource};
use crate::config::Config;
use crate::errors::{CaptureError, CaptureResult};
use crate::pipelines::photo::{FrameCapture, PhotoPipeline, StillImage};
use crate::storage;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// What the surface is currently showing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceStatus {
    /// No camera and nothing to review
    Idle,
    /// Waiting for the platform to grant a camera
    Acquiring,
    /// Live preview, capture enabled
    Live,
    /// A still is waiting for accept or retake
    Reviewing,
    /// The camera cannot be used; offer manual file selection
    FallbackRequired { reason: String },
    /// Every required side is captured
    Complete,
}

impl fmt::Display for SurfaceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceStatus::Idle => f.write_str("idle"),
            SurfaceStatus::Acquiring => f.write_str("acquiring"),
            SurfaceStatus::Live => f.write_str("live"),
            SurfaceStatus::Reviewing => f.write_str("reviewing"),
            SurfaceStatus::FallbackRequired { reason } => write!(f, "fallback required ({})", reason),
            SurfaceStatus::Complete => f.write_str("complete"),
        }
    }
}

/// Owner of one capture UI
pub struct CaptureSurface {
    acquisition: MediaAcquisition,
    pipeline: PhotoPipeline,
    target: BindingTarget,
    facing: Facing,
    session: Option<CaptureSession>,
    status: SurfaceStatus,
    /// Set once the camera failed for this session
    fallback_reason: Option<String>,
}

impl CaptureSurface {
    pub fn new(
        source: Arc<dyn MediaSource>,
        name: &str,
        pipeline: PhotoPipeline,
        target: BindingTarget,
    ) -> Self {
        Self::with_acquisition(MediaAcquisition::new(source, name), pipeline, target)
    }

    /// Surface with pipeline, facing and timeout taken from the configuration
    pub fn from_config(
        source: Arc<dyn MediaSource>,
        name: &str,
        config: &Config,
        target: BindingTarget,
    ) -> Self {
        let acquisition =
            MediaAcquisition::new(source, name).with_timeout(config.acquisition_timeout());
        Self::with_acquisition(acquisition, PhotoPipeline::from_config(config), target)
            .with_facing(config.preferred_facing)
    }

    fn with_acquisition(
        acquisition: MediaAcquisition,
        pipeline: PhotoPipeline,
        target: BindingTarget,
    ) -> Self {
        Self {
            acquisition,
            pipeline,
            target,
            facing: Facing::Environment,
            session: None,
            status: SurfaceStatus::Idle,
            fallback_reason: None,
        }
    }

    pub fn with_facing(mut self, facing: Facing) -> Self {
        self.facing = facing;
        self
    }

    /// Acquisition of this surface; clones can close it from another task
    pub fn acquisition(&self) -> &MediaAcquisition {
        &self.acquisition
    }

    pub fn status(&self) -> &SurfaceStatus {
        &self.status
    }

    pub fn session(&self) -> Option<&CaptureSession> {
        self.session.as_ref()
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn target(&self) -> &BindingTarget {
        &self.target
    }

    /// Side the next still is for
    pub fn current_side(&self) -> Option<Side> {
        self.session.as_ref().and_then(CaptureSession::current_side)
    }

    fn session_mut(&mut self) -> CaptureResult<&mut CaptureSession> {
        self.session.as_mut().ok_or(CaptureError::NoSession)
    }

    /// Begin capturing a document, abandoning any previous session
    pub fn start_session(&mut self, document: DocumentType) -> &CaptureSession {
        if let Some(previous) = self.session.take() {
            info!(session = %previous.id(), "Abandoning previous session");
        }
        self.acquisition.close();
        self.fallback_reason = None;
        self.status = SurfaceStatus::Idle;
        self.session.insert(CaptureSession::new(document))
    }

    /// Request the camera for the current side
    ///
    /// A refused or failed open moves the surface to `FallbackRequired` and
    /// creates no handle.
    pub async fn open_camera(&mut self) -> CaptureResult<HandleInfo> {
        self.open_facing(self.facing).await
    }

    /// Reopen with the other camera
    ///
    /// The preferred facing only changes once the other camera is live.
    pub async fn switch_facing(&mut self) -> CaptureResult<HandleInfo> {
        let facing = self.facing.opposite();
        let info = self.open_facing(facing).await?;
        self.facing = facing;
        info!(surface = self.acquisition.surface(), facing = %facing, "Facing switched");
        Ok(info)
    }

    async fn open_facing(&mut self, facing: Facing) -> CaptureResult<HandleInfo> {
        let session = self.session.as_ref().ok_or(CaptureError::NoSession)?;
        if session.is_complete() {
            return Err(CaptureError::SessionComplete);
        }

        self.status = SurfaceStatus::Acquiring;
        match self.acquisition.open(facing).await {
            Ok(info) => {
                self.fallback_reason = None;
                self.status = SurfaceStatus::Live;
                Ok(info)
            }
            Err(e) => {
                self.settle_after_failed_open(&e);
                Err(e)
            }
        }
    }

    fn settle_after_failed_open(&mut self, err: &CaptureError) {
        if err.needs_fallback() {
            warn!(surface = self.acquisition.surface(), error = %err, "Camera unavailable, manual selection required");
            let reason = err.to_string();
            self.fallback_reason = Some(reason.clone());
            self.status = SurfaceStatus::FallbackRequired { reason };
        } else {
            self.status = SurfaceStatus::Idle;
        }
    }

    /// Freeze the live frame for review and release the camera
    pub async fn capture(&mut self) -> CaptureResult<StillImage> {
        let session = self.session.as_ref().ok_or(CaptureError::NoSession)?;
        if session.is_complete() {
            return Err(CaptureError::SessionComplete);
        }

        let still = FrameCapture::capture(&self.acquisition, &self.pipeline).await?;
        self.session_mut()?.stage(still.clone())?;
        self.acquisition.close();
        self.status = SurfaceStatus::Reviewing;
        Ok(still)
    }

    /// Use a file instead of the camera for the current side
    pub async fn select_file(&mut self, path: &Path) -> CaptureResult<StillImage> {
        let session = self.session.as_ref().ok_or(CaptureError::NoSession)?;
        if session.is_complete() {
            return Err(CaptureError::SessionComplete);
        }

        let still = storage::load_still_from_file(&self.pipeline, path).await?;
        self.session_mut()?.stage(still.clone())?;
        self.acquisition.close();
        self.status = SurfaceStatus::Reviewing;
        info!(surface = self.acquisition.surface(), path = %path.display(), "File selected for review");
        Ok(still)
    }

    /// Accept the reviewed still and write the session into the form
    ///
    /// When a side is still missing the camera is reopened for it, unless the
    /// camera already failed during this session.
    ///
    /// A missing binding target fails before anything changes, so the still
    /// stays pending and `accept` can be retried once the target exists.
    pub async fn accept(&mut self, form: &mut FormDocument) -> CaptureResult<SessionState> {
        let session = self.session.as_ref().ok_or(CaptureError::NoSession)?;
        if session.is_complete() {
            return Err(CaptureError::SessionComplete);
        }
        if session.pending().is_none() {
            return Err(CaptureError::NothingToAccept);
        }
        TargetBinder::resolve(&self.target, form)?;

        let state = self.session_mut()?.accept()?;
        self.acquisition.source().advance();
        if let Some(session) = self.session.as_ref() {
            TargetBinder::commit(session, &self.target, form)?;
        }

        match state {
            SessionState::Complete => {
                self.acquisition.close();
                self.status = SurfaceStatus::Complete;
            }
            _ => self.resume_capture().await,
        }
        Ok(state)
    }

    /// Discard the reviewed still and go back to capturing the same side
    pub async fn retake(&mut self) -> CaptureResult<()> {
        self.session_mut()?.retake();
        self.resume_capture().await;
        Ok(())
    }

    /// Return to capturing after a review
    ///
    /// A camera failure here is reflected in the status only.
    async fn resume_capture(&mut self) {
        if let Some(reason) = self.fallback_reason.clone() {
            self.status = SurfaceStatus::FallbackRequired { reason };
            return;
        }
        if let Err(e) = self.open_camera().await {
            warn!(surface = self.acquisition.surface(), error = %e, "Could not reopen camera");
        }
    }

    /// Abandon capturing, keeping the session as it is
    pub fn close(&mut self) -> Option<&CaptureSession> {
        self.acquisition.close();
        if self.status != SurfaceStatus::Complete {
            self.status = SurfaceStatus::Idle;
        }
        info!(surface = self.acquisition.surface(), "Capture surface closed");
        self.session.as_ref()
    }

    /// Commit the session a final time and discard it
    pub fn submit(&mut self, form: &mut FormDocument) -> CaptureResult<CaptureSession> {
        let session = self.session.as_ref().ok_or(CaptureError::NoSession)?;
        TargetBinder::commit(session, &self.target, form)?;
        self.acquisition.close();
        self.status = SurfaceStatus::Idle;
        self.fallback_reason = None;
        self.session.take().ok_or(CaptureError::NoSession)
    }

    /// Discard the session without touching the form
    pub fn cancel(&mut self) -> Option<CaptureSession> {
        self.acquisition.close();
        self.status = SurfaceStatus::Idle;
        self.fallback_reason = None;
        self.session.take()
    }
}

impl Drop for CaptureSurface {
    fn drop(&mut self) {
        self.acquisition.close();
    }
}

impl fmt::Debug for CaptureSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureSurface")
            .field("surface", &self.acquisition.surface())
            .field("status", &self.status)
            .field("facing", &self.facing)
            .field("session", &self.session.as_ref().map(CaptureSession::id))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::virtual_camera::TestPatternSource;
    use crate::flow::binder::{DEFAULT_FILE_INPUT, DEFAULT_PREVIEW};

    fn surface(source: Arc<TestPatternSource>) -> CaptureSurface {
        CaptureSurface::new(
            source,
            "modal",
            PhotoPipeline::new(),
            BindingTarget::default(),
        )
    }

    fn form() -> FormDocument {
        FormDocument::new()
            .with_file_input(DEFAULT_FILE_INPUT)
            .with_preview(DEFAULT_PREVIEW)
    }

    #[tokio::test]
    async fn test_open_without_session_fails() {
        let mut surface = surface(Arc::new(TestPatternSource::new()));
        assert_eq!(surface.open_camera().await.unwrap_err(), CaptureError::NoSession);
    }

    #[tokio::test]
    async fn test_capture_releases_camera_for_review() {
        let source = Arc::new(TestPatternSource::new());
        let mut surface = surface(source.clone());
        surface.start_session(DocumentType::Passport);

        surface.open_camera().await.unwrap();
        assert_eq!(surface.status(), &SurfaceStatus::Live);
        assert_eq!(source.active_streams(), 1);

        surface.capture().await.unwrap();
        assert_eq!(surface.status(), &SurfaceStatus::Reviewing);
        assert_eq!(source.active_streams(), 0);
    }

    #[tokio::test]
    async fn test_retake_reopens_same_side() {
        let source = Arc::new(TestPatternSource::new());
        let mut surface = surface(source.clone());
        surface.start_session(DocumentType::DriversLicense);

        surface.open_camera().await.unwrap();
        surface.capture().await.unwrap();
        surface.retake().await.unwrap();

        assert_eq!(surface.status(), &SurfaceStatus::Live);
        assert_eq!(surface.current_side(), Some(Side::Front));
        assert!(surface.session().unwrap().pending().is_none());
    }

    #[tokio::test]
    async fn test_denied_camera_requires_fallback() {
        let source = Arc::new(TestPatternSource::denied("NotAllowedError"));
        let mut surface = surface(source.clone());
        surface.start_session(DocumentType::Passport);

        let err = surface.open_camera().await.unwrap_err();
        assert!(err.needs_fallback());
        assert!(matches!(
            surface.status(),
            SurfaceStatus::FallbackRequired { .. }
        ));
        assert!(surface.acquisition().handle_info().is_none());
        assert_eq!(source.active_streams(), 0);
    }

    #[tokio::test]
    async fn test_close_keeps_session_and_releases_camera() {
        let source = Arc::new(TestPatternSource::new());
        let mut surface = surface(source.clone());
        surface.start_session(DocumentType::NationalId);
        surface.open_camera().await.unwrap();

        let session = surface.close().unwrap();
        assert_eq!(session.state(), SessionState::AwaitingFront);
        assert_eq!(source.active_streams(), 0);
        assert_eq!(surface.status(), &SurfaceStatus::Idle);
    }

    #[tokio::test]
    async fn test_dropping_surface_releases_camera() {
        let source = Arc::new(TestPatternSource::new());
        let mut capture = surface(source.clone());
        capture.start_session(DocumentType::Passport);
        capture.open_camera().await.unwrap();

        drop(capture);
        assert_eq!(source.active_streams(), 0);
    }

    #[tokio::test]
    async fn test_cancel_discards_session() {
        let mut surface = surface(Arc::new(TestPatternSource::new()));
        surface.start_session(DocumentType::Passport);
        assert!(surface.cancel().is_some());
        assert!(surface.session().is_none());

        let mut form = form();
        assert_eq!(surface.submit(&mut form).unwrap_err(), CaptureError::NoSession);
    }

    #[tokio::test]
    async fn test_failed_switch_keeps_facing() {
        let mut surface = surface(Arc::new(TestPatternSource::denied("NotAllowedError")));
        surface.start_session(DocumentType::Passport);

        assert!(surface.switch_facing().await.is_err());
        assert_eq!(surface.facing(), Facing::Environment);
    }

    #[tokio::test]
    async fn test_switch_changes_facing_once_live() {
        let mut surface = surface(Arc::new(TestPatternSource::new()));
        surface.start_session(DocumentType::Passport);

        let info = surface.switch_facing().await.unwrap();
        assert_eq!(info.facing, Facing::User);
        assert_eq!(surface.facing(), Facing::User);
    }

    #[tokio::test]
    async fn test_accept_without_pending_still() {
        let mut surface = surface(Arc::new(TestPatternSource::new()));
        surface.start_session(DocumentType::Passport);
        let mut form = form();

        let err = surface.accept(&mut form).await.unwrap_err();
        assert_eq!(err, CaptureError::NothingToAccept);
        assert_eq!(surface.status(), &SurfaceStatus::Idle);
    }
}
