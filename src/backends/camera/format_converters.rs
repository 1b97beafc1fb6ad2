// SPDX-License-Identifier: GPL-3.0-only
//! Pixel format conversion for frames leaving the V4L2 capture thread

use super::types::{BackendError, BackendResult, PixelFormat};

/// Convert YUYV (YUV 4:2:2) to RGBA
///
/// YUYV format: Y0 U Y1 V - each 4-byte group encodes 2 pixels.
/// Uses BT.601 coefficients for YUV to RGB conversion.
pub fn yuyv_to_rgba(data: &[u8], width: u32, height: u32) -> Vec<u8> {
    let pixel_count = width as usize * height as usize;
    let mut rgba = Vec::with_capacity(pixel_count * 4);

    for chunk in data.chunks_exact(4) {
        let y0 = chunk[0] as f32;
        let u = chunk[1] as f32 - 128.0;
        let y1 = chunk[2] as f32;
        let v = chunk[3] as f32 - 128.0;

        for y in [y0, y1] {
            if rgba.len() >= pixel_count * 4 {
                break;
            }

            let r = (y + 1.402 * v).clamp(0.0, 255.0) as u8;
            let g = (y - 0.344 * u - 0.714 * v).clamp(0.0, 255.0) as u8;
            let b = (y + 1.772 * u).clamp(0.0, 255.0) as u8;

            rgba.extend_from_slice(&[r, g, b, 255]);
        }
    }

    rgba
}

/// Decode one raw device buffer into tightly packed RGBA
///
/// Returns the pixels together with the decoded dimensions, which for MJPEG
/// come from the JPEG header rather than the negotiated format.
pub fn decode_to_rgba(
    data: &[u8],
    format: PixelFormat,
    width: u32,
    height: u32,
) -> BackendResult<(Vec<u8>, u32, u32)> {
    match format {
        PixelFormat::RGBA => {
            let expected = width as usize * height as usize * 4;
            if data.len() < expected {
                return Err(BackendError::Other(format!(
                    "RGBA buffer too small: expected {}, got {}",
                    expected,
                    data.len()
                )));
            }
            Ok((data[..expected].to_vec(), width, height))
        }
        PixelFormat::YUYV => {
            let expected = width as usize * height as usize * 2;
            if data.len() < expected {
                return Err(BackendError::Other(format!(
                    "YUYV buffer too small: expected {}, got {}",
                    expected,
                    data.len()
                )));
            }
            Ok((yuyv_to_rgba(data, width, height), width, height))
        }
        PixelFormat::MJPEG => {
            // Corrupt or truncated buffers are common right after stream start
            if !data.starts_with(&[0xFF, 0xD8]) {
                return Err(BackendError::Other("missing JPEG SOI marker".into()));
            }
            let img = image::load_from_memory_with_format(data, image::ImageFormat::Jpeg)
                .map_err(|e| BackendError::Other(format!("MJPEG decode failed: {}", e)))?;
            let rgba = img.to_rgba8();
            let (w, h) = rgba.dimensions();
            Ok((rgba.into_raw(), w, h))
        }
    }
}
