// SPDX-License-Identifier: GPL-3.0-only

//! V4L2 camera backend
//!
//! Opens `/dev/video*` nodes directly, negotiates MJPEG (falling back to
//! YUYV) and keeps the most recent decoded frame in a shared slot that the
//! capture surface samples when the user presses the shutter.

use super::format_converters::decode_to_rgba;
use super::frame_loop::{CaptureLoopController, LoopAction};
use super::types::{
    BackendError, BackendResult, CameraBackendType, CameraDevice, CameraFrame, Facing, PixelFormat,
};
use super::v4l2_utils::enumerate_video_devices;
use super::{MediaSource, MediaStream, select_device};
use crate::constants::v4l2 as v4l2_consts;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};
use v4l::buffer::Type;
use v4l::io::traits::CaptureStream;
use v4l::prelude::*;
use v4l::video::Capture;
use v4l::{Format, FourCC};

/// Shared slot holding the latest decoded frame
type LatestFrame = Arc<Mutex<Option<CameraFrame>>>;

/// V4L2 backend
#[derive(Debug, Default)]
pub struct V4l2Source;

impl V4l2Source {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MediaSource for V4l2Source {
    fn enumerate_cameras(&self) -> Vec<CameraDevice> {
        enumerate_video_devices()
    }

    async fn open(&self, facing: Facing) -> BackendResult<(CameraDevice, Box<dyn MediaStream>)> {
        tokio::task::spawn_blocking(move || {
            let devices = enumerate_video_devices();
            let device = select_device(&devices, facing)
                .cloned()
                .ok_or_else(|| BackendError::DeviceNotFound("no V4L2 capture device found".into()))?;

            if device.facing != facing {
                warn!(requested = %facing, device = %device.name, "No camera with requested facing, using first device");
            }

            let stream = V4l2Stream::start(&device)?;
            Ok((device, Box::new(stream) as Box<dyn MediaStream>))
        })
        .await
        .map_err(|e| BackendError::Other(format!("camera open task failed: {}", e)))?
    }

    fn backend_type(&self) -> CameraBackendType {
        CameraBackendType::V4l2
    }
}

/// Negotiate a decodable format, preferring MJPEG
fn negotiate_format(dev: &Device) -> BackendResult<(Format, PixelFormat)> {
    let current = dev.format()?;

    for fourcc in [b"MJPG", b"YUYV"] {
        let mut requested = current.clone();
        requested.width = v4l2_consts::PREFERRED_WIDTH;
        requested.height = v4l2_consts::PREFERRED_HEIGHT;
        requested.fourcc = FourCC::new(fourcc);

        let applied = dev.set_format(&requested)?;
        if let Some(pixel_format) = PixelFormat::from_fourcc(&applied.fourcc.repr) {
            return Ok((applied, pixel_format));
        }
        debug!(requested = ?fourcc, applied = %applied.fourcc, "Driver rejected format");
    }

    Err(BackendError::FormatNotSupported(format!(
        "device offers neither MJPEG nor YUYV (current: {})",
        current.fourcc
    )))
}

/// A running V4L2 stream
pub struct V4l2Stream {
    latest: LatestFrame,
    controller: Option<CaptureLoopController>,
}

impl V4l2Stream {
    /// Open the device, negotiate a format and start the capture thread
    pub fn start(device: &CameraDevice) -> BackendResult<Self> {
        info!(device = %device.name, path = %device.path, "Opening V4L2 device");

        let dev = Device::with_path(&device.path)?;
        let (format, pixel_format) = negotiate_format(&dev)?;
        let mut stream: MmapStream<'static> =
            MmapStream::with_buffers(&dev, Type::VideoCapture, v4l2_consts::BUFFER_COUNT)?;

        info!(
            width = format.width,
            height = format.height,
            fourcc = %format.fourcc,
            "V4L2 stream negotiated"
        );

        let latest: LatestFrame = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&latest);
        let (width, height) = (format.width, format.height);
        let mut sequence = 0u64;

        let controller = CaptureLoopController::start("v4l2-capture", move || {
            // Keep the device node open for as long as the stream runs
            let _device = &dev;

            let buffer = match stream.next() {
                Ok((buffer, _meta)) => buffer,
                Err(e) => {
                    warn!(error = %e, "V4L2 dequeue failed, stopping capture");
                    return LoopAction::Stop;
                }
            };

            match decode_to_rgba(buffer, pixel_format, width, height) {
                Ok((rgba, w, h)) => {
                    sequence += 1;
                    let frame = CameraFrame::from_rgba(w, h, rgba, sequence);
                    *slot.lock().unwrap_or_else(|e| e.into_inner()) = Some(frame);
                }
                Err(e) => debug!(error = %e, "Dropping undecodable frame"),
            }
            LoopAction::Continue
        });

        Ok(Self {
            latest,
            controller: Some(controller),
        })
    }
}

impl MediaStream for V4l2Stream {
    fn latest_frame(&self) -> Option<CameraFrame> {
        self.latest
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn stop(&mut self) {
        if let Some(mut controller) = self.controller.take() {
            controller.stop();
        }
        self.latest.lock().unwrap_or_else(|e| e.into_inner()).take();
    }
}

impl Drop for V4l2Stream {
    fn drop(&mut self) {
        self.stop();
    }
}
