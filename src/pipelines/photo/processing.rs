// SPDX-License-Identifier: MPL-2.0

//! Post-processing for captured stills
//!
//! Turns a decoded RGBA frame (or a decoded file) into the RGB image that gets
//! encoded: alpha is dropped, user-facing captures may be mirrored back to the
//! way the document actually reads, and oversized images are scaled down.

use crate::backends::camera::types::{CameraFrame, Facing};
use crate::errors::PhotoError;
use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};
use tracing::debug;

/// Post-processing configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostProcessingConfig {
    /// Flip user-facing captures horizontally
    pub mirror_user_facing: bool,
    /// Longest edge in pixels; larger images are downscaled
    pub max_dimension: Option<u32>,
}

/// Processed image data
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    pub image: RgbImage,
    pub width: u32,
    pub height: u32,
}

impl ProcessedImage {
    fn new(image: RgbImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            image,
            width,
            height,
        }
    }
}

/// Post-processor for captured frames
#[derive(Debug, Clone, Default)]
pub struct PostProcessor {
    config: PostProcessingConfig,
}

impl PostProcessor {
    pub fn new(config: PostProcessingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PostProcessingConfig {
        &self.config
    }

    /// Process a camera frame taken with the given facing
    pub fn process_frame(
        &self,
        frame: &CameraFrame,
        facing: Facing,
    ) -> Result<ProcessedImage, PhotoError> {
        if !frame.has_dimensions() {
            return Err(PhotoError::EmptyImage(format!(
                "frame is {}x{}",
                frame.width, frame.height
            )));
        }

        let mut image = Self::convert_rgba_to_rgb(&frame.data, frame.width, frame.height)?;
        if self.config.mirror_user_facing && facing == Facing::User {
            image::imageops::flip_horizontal_in_place(&mut image);
        }
        Ok(self.fit(image))
    }

    /// Process an already decoded image (manual file selection)
    pub fn process_image(&self, image: DynamicImage) -> Result<ProcessedImage, PhotoError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(PhotoError::EmptyImage("decoded image has no pixels".into()));
        }
        Ok(self.fit(image.to_rgb8()))
    }

    /// Apply the size limit, preserving aspect ratio
    fn fit(&self, image: RgbImage) -> ProcessedImage {
        let Some(limit) = self.config.max_dimension.filter(|&m| m > 0) else {
            return ProcessedImage::new(image);
        };

        let (width, height) = image.dimensions();
        let longest = width.max(height);
        if longest <= limit {
            return ProcessedImage::new(image);
        }

        let scale = limit as f64 / longest as f64;
        let new_width = ((width as f64 * scale).round() as u32).max(1);
        let new_height = ((height as f64 * scale).round() as u32).max(1);
        debug!(width, height, new_width, new_height, "Downscaling still");

        ProcessedImage::new(image::imageops::resize(
            &image,
            new_width,
            new_height,
            FilterType::Triangle,
        ))
    }

    /// Convert RGBA data to RGB image (drop alpha channel)
    fn convert_rgba_to_rgb(
        rgba_data: &[u8],
        width: u32,
        height: u32,
    ) -> Result<RgbImage, PhotoError> {
        let expected_size = width as usize * height as usize * 4;
        if rgba_data.len() < expected_size {
            return Err(PhotoError::EncodingFailed(format!(
                "RGBA data too small: expected {}, got {}",
                expected_size,
                rgba_data.len()
            )));
        }

        let rgb_data: Vec<u8> = rgba_data
            .chunks(4)
            .take(width as usize * height as usize)
            .flat_map(|rgba| [rgba[0], rgba[1], rgba[2]])
            .collect();

        RgbImage::from_raw(width, height, rgb_data).ok_or_else(|| {
            PhotoError::EncodingFailed("Failed to create RGB image from converted data".into())
        })
    }
}
