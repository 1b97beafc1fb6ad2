// SPDX-License-Identifier: MPL-2.0

//! Photo capture from a camera acquisition
//!
//! Takes the most recent decoded frame of the surface's active handle without
//! interrupting the stream, then hands it to the photo pipeline.

use super::{PhotoPipeline, StillImage};
use crate::backends::camera::MediaAcquisition;
use crate::backends::camera::types::CameraFrame;
use crate::errors::{CaptureError, CaptureResult};
use tracing::{debug, info};

/// Photo capture handler
pub struct FrameCapture;

impl FrameCapture {
    /// Grab the frame a capture would use right now
    ///
    /// `NotReady` while an open is in flight, when no handle is active, before
    /// the first frame has been decoded, or when the frame has a zero
    /// dimension.
    pub fn current_frame(acquisition: &MediaAcquisition) -> CaptureResult<CameraFrame> {
        if acquisition.is_pending() {
            debug!(surface = acquisition.surface(), "Capture refused, acquisition pending");
            return Err(CaptureError::NotReady);
        }

        let frame = acquisition.latest_frame().ok_or(CaptureError::NotReady)?;
        if !frame.has_dimensions() {
            debug!(
                surface = acquisition.surface(),
                width = frame.width,
                height = frame.height,
                "Capture refused, frame has no dimensions yet"
            );
            return Err(CaptureError::NotReady);
        }
        Ok(frame)
    }

    /// Freeze the latest frame into an encoded still
    pub async fn capture(
        acquisition: &MediaAcquisition,
        pipeline: &PhotoPipeline,
    ) -> CaptureResult<StillImage> {
        let facing = acquisition.active_facing().ok_or(CaptureError::NotReady)?;
        let frame = Self::current_frame(acquisition)?;

        info!(
            surface = acquisition.surface(),
            width = frame.width,
            height = frame.height,
            "Capturing still"
        );

        let still = pipeline.process_frame(frame, facing).await?;
        debug!(size = still.len(), "Still captured");
        Ok(still)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::Facing;
    use crate::backends::virtual_camera::TestPatternSource;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_capture_without_handle_is_not_ready() {
        let acquisition = MediaAcquisition::new(Arc::new(TestPatternSource::new()), "modal");
        let err = FrameCapture::capture(&acquisition, &PhotoPipeline::new())
            .await
            .unwrap_err();
        assert_eq!(err, CaptureError::NotReady);
    }

    #[tokio::test]
    async fn test_capture_before_first_frame_is_not_ready() {
        let source = Arc::new(TestPatternSource::new().with_warmup(1));
        let acquisition = MediaAcquisition::new(source, "modal");
        acquisition.open(Facing::Environment).await.unwrap();

        let pipeline = PhotoPipeline::new();
        let first = FrameCapture::capture(&acquisition, &pipeline).await;
        assert_eq!(first.unwrap_err(), CaptureError::NotReady);

        let still = FrameCapture::capture(&acquisition, &pipeline).await.unwrap();
        assert!(!still.is_empty());
    }

    #[tokio::test]
    async fn test_zero_sized_frames_are_not_ready() {
        let source = Arc::new(TestPatternSource::new().with_size(0, 0));
        let acquisition = MediaAcquisition::new(source, "modal");
        acquisition.open(Facing::User).await.unwrap();

        let err = FrameCapture::current_frame(&acquisition).unwrap_err();
        assert_eq!(err, CaptureError::NotReady);
    }
}
