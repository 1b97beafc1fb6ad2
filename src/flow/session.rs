// SPDX-License-Identifier: GPL-3.0-only

//! Two-sided capture session
//!
//! A session sequences the sides a document needs: only the front for
//! single-sided documents, front then back for double-sided ones. The current
//! state is derived from the accepted images on every call, so a session is
//! `Complete` exactly when every required side holds a non-empty still.

use crate::constants::{PhotoMode, fields};
use crate::errors::{CaptureError, CaptureResult, PhotoError};
use crate::pipelines::photo::StillImage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};
use uuid::Uuid;

/// Whether a document has one or two sides to photograph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentKind {
    SingleSided,
    DoubleSided,
}

impl DocumentKind {
    /// Sides to capture, in capture order
    pub fn required_sides(&self) -> &'static [Side] {
        match self {
            DocumentKind::SingleSided => &[Side::Front],
            DocumentKind::DoubleSided => &[Side::Front, Side::Back],
        }
    }

    pub fn photo_mode(&self) -> PhotoMode {
        match self {
            DocumentKind::SingleSided => PhotoMode::Single,
            DocumentKind::DoubleSided => PhotoMode::Dual,
        }
    }
}

/// Identity documents the registration form accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentType {
    Passport,
    DriversLicense,
    NationalId,
    GuideLicense,
}

impl DocumentType {
    pub const ALL: [DocumentType; 4] = [
        DocumentType::Passport,
        DocumentType::DriversLicense,
        DocumentType::NationalId,
        DocumentType::GuideLicense,
    ];

    pub fn kind(&self) -> DocumentKind {
        match self {
            DocumentType::Passport | DocumentType::GuideLicense => DocumentKind::SingleSided,
            DocumentType::DriversLicense | DocumentType::NationalId => DocumentKind::DoubleSided,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Passport => "passport",
            DocumentType::DriversLicense => "drivers-license",
            DocumentType::NationalId => "national-id",
            DocumentType::GuideLicense => "guide-license",
        }
    }

    /// Human-readable name
    pub fn label(&self) -> &'static str {
        match self {
            DocumentType::Passport => "Passport",
            DocumentType::DriversLicense => "Driver's license",
            DocumentType::NationalId => "National ID card",
            DocumentType::GuideLicense => "Tourist guide license",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', ' '], "-");
        DocumentType::ALL
            .into_iter()
            .find(|d| d.as_str() == normalized)
            .ok_or_else(|| {
                format!(
                    "unknown document type '{}' (expected one of: {})",
                    s,
                    DocumentType::ALL.map(|d| d.as_str()).join(", ")
                )
            })
    }
}

/// Document side
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Front,
    Back,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Front => "front",
            Side::Back => "back",
        }
    }

    /// Form field the still for this side is stored under
    pub fn field_key(&self) -> &'static str {
        match self {
            Side::Front => fields::FRONT_PHOTO,
            Side::Back => fields::BACK_PHOTO,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side the session is waiting for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingFront,
    AwaitingBack,
    Complete,
}

/// Coarse progress of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionStatus {
    /// Nothing captured yet
    Pending,
    /// At least one still taken, sides missing
    InProgress,
    Complete,
}

/// Capture state for one document
#[derive(Debug, Clone)]
pub struct CaptureSession {
    id: Uuid,
    document: DocumentType,
    captured: BTreeMap<Side, StillImage>,
    pending: Option<StillImage>,
}

impl CaptureSession {
    pub fn new(document: DocumentType) -> Self {
        let session = Self {
            id: Uuid::new_v4(),
            document,
            captured: BTreeMap::new(),
            pending: None,
        };
        info!(
            session = %session.id,
            document = %document,
            sides = document.kind().required_sides().len(),
            "Capture session started"
        );
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn document(&self) -> DocumentType {
        self.document
    }

    pub fn kind(&self) -> DocumentKind {
        self.document.kind()
    }

    pub fn required_sides(&self) -> &'static [Side] {
        self.kind().required_sides()
    }

    pub fn photo_mode(&self) -> PhotoMode {
        self.kind().photo_mode()
    }

    /// First required side without an accepted still
    pub fn current_side(&self) -> Option<Side> {
        self.required_sides()
            .iter()
            .copied()
            .find(|side| self.captured.get(side).is_none_or(StillImage::is_empty))
    }

    pub fn state(&self) -> SessionState {
        match self.current_side() {
            Some(Side::Front) => SessionState::AwaitingFront,
            Some(Side::Back) => SessionState::AwaitingBack,
            None => SessionState::Complete,
        }
    }

    pub fn status(&self) -> SessionStatus {
        if self.is_complete() {
            SessionStatus::Complete
        } else if self.captured.is_empty() && self.pending.is_none() {
            SessionStatus::Pending
        } else {
            SessionStatus::InProgress
        }
    }

    pub fn is_complete(&self) -> bool {
        self.current_side().is_none()
    }

    /// Still awaiting review
    pub fn pending(&self) -> Option<&StillImage> {
        self.pending.as_ref()
    }

    pub fn captured(&self, side: Side) -> Option<&StillImage> {
        self.captured.get(&side)
    }

    /// Accepted stills in side order
    pub fn captured_images(&self) -> impl Iterator<Item = (Side, &StillImage)> {
        self.captured.iter().map(|(side, image)| (*side, image))
    }

    /// Hold a still for review, replacing any previous one
    pub fn stage(&mut self, image: StillImage) -> CaptureResult<()> {
        let side = self.current_side().ok_or(CaptureError::SessionComplete)?;
        if image.is_empty() {
            return Err(PhotoError::EmptyImage("still has no data".into()).into());
        }
        debug!(session = %self.id, side = %side, size = image.len(), "Still staged for review");
        self.pending = Some(image);
        Ok(())
    }

    /// Discard the staged still. Never changes which side is awaited.
    pub fn retake(&mut self) -> Option<StillImage> {
        let discarded = self.pending.take();
        if discarded.is_some() {
            debug!(session = %self.id, side = ?self.current_side(), "Staged still discarded");
        }
        discarded
    }

    /// Record the staged still for the current side and advance
    pub fn accept(&mut self) -> CaptureResult<SessionState> {
        let side = self.current_side().ok_or(CaptureError::SessionComplete)?;
        let image = self.pending.take().ok_or(CaptureError::NothingToAccept)?;

        info!(
            session = %self.id,
            document = %self.document,
            side = %side,
            size = image.len(),
            origin = %image.origin,
            "Side accepted"
        );
        self.captured.insert(side, image);
        Ok(self.state())
    }
}
