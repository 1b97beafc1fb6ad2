// SPDX-License-Identifier: MPL-2.0

//! Photo capture pipeline
//!
//! ```text
//! MediaAcquisition → Capture → Post-Processing → Encoding → StillImage
//!                                                    ↑
//!                       selected file → Decode ──────┘
//! ```
//!
//! # Pipeline Stages
//!
//! 1. **Capture**: take the latest decoded frame of the active handle
//! 2. **Post-Processing**: drop alpha, optional mirror and downscale
//! 3. **Encoding**: JPEG or PNG, run on the blocking pool
//!
//! The resulting [`StillImage`] is what sessions store and what the binder
//! commits into the form.

pub mod capture;
pub mod encoding;
pub mod processing;

pub use capture::FrameCapture;
pub use encoding::{EncodedImage, EncodingFormat, EncodingQuality, PhotoEncoder};
pub use processing::{PostProcessingConfig, PostProcessor, ProcessedImage};

use crate::backends::camera::types::{CameraFrame, Facing};
use crate::config::Config;
use crate::errors::PhotoError;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Where a still came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOrigin {
    /// Frozen from a live camera stream
    Camera { facing: Facing },
    /// Picked manually through the file fallback
    File { name: String },
}

impl fmt::Display for ImageOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageOrigin::Camera { facing } => write!(f, "camera ({})", facing),
            ImageOrigin::File { name } => write!(f, "file ({})", name),
        }
    }
}

/// An encoded still image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StillImage {
    pub data: Arc<[u8]>,
    pub format: EncodingFormat,
    pub width: u32,
    pub height: u32,
    pub origin: ImageOrigin,
}

impl StillImage {
    pub fn from_encoded(encoded: EncodedImage, origin: ImageOrigin) -> Self {
        Self {
            data: Arc::from(encoded.data.into_boxed_slice()),
            format: encoded.format,
            width: encoded.width,
            height: encoded.height,
            origin,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// `data:` URL for showing the still on a preview surface
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type(), STANDARD.encode(&self.data))
    }

    /// File name with the encoder's extension, e.g. `front.jpg`
    pub fn file_name(&self, stem: &str) -> String {
        format!("{}.{}", stem, self.format.extension())
    }
}

/// Complete still pipeline: process then encode
#[derive(Debug, Clone, Default)]
pub struct PhotoPipeline {
    post_processor: PostProcessor,
    encoder: PhotoEncoder,
}

impl PhotoPipeline {
    /// JPEG at high quality, no mirroring, no size limit
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(
        processing_config: PostProcessingConfig,
        encoding_format: EncodingFormat,
        encoding_quality: EncodingQuality,
    ) -> Self {
        let mut encoder = PhotoEncoder::new();
        encoder.set_format(encoding_format);
        encoder.set_quality(encoding_quality);

        Self {
            post_processor: PostProcessor::new(processing_config),
            encoder,
        }
    }

    /// Build the pipeline described by the user configuration
    pub fn from_config(config: &Config) -> Self {
        Self::with_config(
            PostProcessingConfig {
                mirror_user_facing: config.mirror_user_facing,
                max_dimension: config.max_dimension,
            },
            config.photo_output_format.into(),
            config.jpeg_quality,
        )
    }

    pub fn encoder(&self) -> &PhotoEncoder {
        &self.encoder
    }

    pub fn post_processor(&self) -> &PostProcessor {
        &self.post_processor
    }

    /// Convert and encode one camera frame
    pub async fn process_frame(
        &self,
        frame: CameraFrame,
        facing: Facing,
    ) -> Result<StillImage, PhotoError> {
        info!(
            width = frame.width,
            height = frame.height,
            sequence = frame.sequence,
            facing = %facing,
            "Encoding captured frame"
        );

        let pipeline = self.clone();
        tokio::task::spawn_blocking(move || {
            let processed = pipeline.post_processor.process_frame(&frame, facing)?;
            let encoded = pipeline.encoder.encode(&processed)?;
            Ok(StillImage::from_encoded(encoded, ImageOrigin::Camera { facing }))
        })
        .await
        .map_err(|e| PhotoError::EncodingFailed(format!("Encoding task error: {}", e)))?
    }

    /// Decode a selected file and re-encode it like a camera still
    pub async fn reencode_file(&self, bytes: Vec<u8>, name: String) -> Result<StillImage, PhotoError> {
        debug!(name = %name, size = bytes.len(), "Re-encoding selected file");

        let pipeline = self.clone();
        tokio::task::spawn_blocking(move || {
            let decoded = image::load_from_memory(&bytes)
                .map_err(|e| PhotoError::DecodeFailed(format!("{}: {}", name, e)))?;
            let processed = pipeline.post_processor.process_image(decoded)?;
            let encoded = pipeline.encoder.encode(&processed)?;
            Ok(StillImage::from_encoded(encoded, ImageOrigin::File { name }))
        })
        .await
        .map_err(|e| PhotoError::EncodingFailed(format!("Encoding task error: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([10, 200, 30]));
        let mut buffer = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut buffer), image::ImageFormat::Png)
            .unwrap();
        buffer
    }

    #[tokio::test]
    async fn test_frame_becomes_jpeg_still() {
        let frame = CameraFrame::from_rgba(6, 4, vec![200; 6 * 4 * 4], 3);
        let still = PhotoPipeline::new()
            .process_frame(frame, Facing::Environment)
            .await
            .unwrap();

        assert_eq!((still.width, still.height), (6, 4));
        assert_eq!(still.mime_type(), "image/jpeg");
        assert_eq!(
            still.origin,
            ImageOrigin::Camera {
                facing: Facing::Environment
            }
        );
        assert!(!still.is_empty());
    }

    #[tokio::test]
    async fn test_selected_file_is_reencoded() {
        let still = PhotoPipeline::new()
            .reencode_file(png_bytes(12, 9), "licence.png".into())
            .await
            .unwrap();

        assert_eq!(still.format, EncodingFormat::Jpeg);
        assert_eq!((still.width, still.height), (12, 9));
        assert_eq!(
            still.origin,
            ImageOrigin::File {
                name: "licence.png".into()
            }
        );
    }

    #[tokio::test]
    async fn test_garbage_file_fails_to_decode() {
        let err = PhotoPipeline::new()
            .reencode_file(b"not an image".to_vec(), "notes.txt".into())
            .await
            .unwrap_err();
        assert!(matches!(err, PhotoError::DecodeFailed(_)));
    }

    #[test]
    fn test_data_url_prefix() {
        let still = StillImage {
            data: Arc::from(vec![1u8, 2, 3].into_boxed_slice()),
            format: EncodingFormat::Png,
            width: 1,
            height: 1,
            origin: ImageOrigin::File { name: "x.png".into() },
        };
        assert_eq!(still.data_url(), "data:image/png;base64,AQID");
        assert_eq!(still.file_name("back"), "back.png");
    }
}
