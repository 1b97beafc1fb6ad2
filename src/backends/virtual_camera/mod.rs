// SPDX-License-Identifier: GPL-3.0-only

//! Virtual camera sources
//!
//! Two [`MediaSource`] implementations that need no hardware:
//!
//! - [`FileSource`]: serves image files as if they were a camera, advancing to
//!   the next file on every successful open so the front and back of a
//!   document can come from different files.
//! - [`TestPatternSource`]: synthesises frames. Every open gets its own seed,
//!   so consecutive captures always differ. It can delay opens, hold back the
//!   first frames, or deny access outright, and it counts live streams.

mod file_source;

pub use file_source::{FileSource, load_image_as_frame};

use crate::backends::camera::types::{
    BackendError, BackendResult, CameraBackendType, CameraDevice, CameraFrame, Facing,
};
use crate::backends::camera::{MediaSource, MediaStream};
use crate::constants::test_pattern;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, info};

/// Synthetic camera
#[derive(Debug)]
pub struct TestPatternSource {
    width: u32,
    height: u32,
    open_delay: Option<Duration>,
    warmup_polls: u32,
    denied: Option<String>,
    opens: AtomicU64,
    live: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl Default for TestPatternSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TestPatternSource {
    pub fn new() -> Self {
        Self {
            width: test_pattern::DEFAULT_WIDTH,
            height: test_pattern::DEFAULT_HEIGHT,
            open_delay: None,
            warmup_polls: 0,
            denied: None,
            opens: AtomicU64::new(0),
            live: Arc::new(AtomicUsize::new(0)),
            peak: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A source whose every open is refused, like a dismissed permission prompt
    pub fn denied(reason: &str) -> Self {
        Self {
            denied: Some(reason.to_string()),
            ..Self::new()
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Simulate a slow permission prompt / device start
    pub fn with_open_delay(mut self, delay: Duration) -> Self {
        self.open_delay = Some(delay);
        self
    }

    /// Number of frame polls answered with "no frame yet" after each open
    pub fn with_warmup(mut self, polls: u32) -> Self {
        self.warmup_polls = polls;
        self
    }

    /// Streams currently running
    pub fn active_streams(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Highest number of streams that were ever running at once
    pub fn peak_streams(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// Successful opens so far
    pub fn open_count(&self) -> u64 {
        self.opens.load(Ordering::SeqCst)
    }

    fn device(facing: Facing) -> CameraDevice {
        CameraDevice {
            name: format!("Test pattern ({})", facing),
            path: format!("test-pattern:{}", facing),
            facing,
            device_info: None,
        }
    }
}

#[async_trait]
impl MediaSource for TestPatternSource {
    fn enumerate_cameras(&self) -> Vec<CameraDevice> {
        if self.denied.is_some() {
            return Vec::new();
        }
        Facing::ALL.into_iter().map(Self::device).collect()
    }

    async fn open(&self, facing: Facing) -> BackendResult<(CameraDevice, Box<dyn MediaStream>)> {
        if let Some(delay) = self.open_delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(reason) = &self.denied {
            return Err(BackendError::PermissionDenied(reason.clone()));
        }

        let seed = self.opens.fetch_add(1, Ordering::SeqCst) + 1;
        let live = self.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(live, Ordering::SeqCst);
        info!(seed, facing = %facing, "Test pattern stream opened");

        let stream = TestPatternStream {
            width: self.width,
            height: self.height,
            seed,
            facing,
            warmup_remaining: AtomicU32::new(self.warmup_polls),
            sequence: AtomicU64::new(0),
            live: Arc::clone(&self.live),
            stopped: false,
        };
        Ok((Self::device(facing), Box::new(stream)))
    }

    fn backend_type(&self) -> CameraBackendType {
        CameraBackendType::TestPattern
    }
}

struct TestPatternStream {
    width: u32,
    height: u32,
    seed: u64,
    facing: Facing,
    warmup_remaining: AtomicU32,
    sequence: AtomicU64,
    live: Arc<AtomicUsize>,
    stopped: bool,
}

impl TestPatternStream {
    /// Gradient keyed by seed and facing
    fn render(&self) -> Vec<u8> {
        let (w, h) = (self.width.max(1), self.height.max(1));
        let tint = (self.seed.wrapping_mul(37) % 256) as u8;
        let facing_bias = match self.facing {
            Facing::User => 0u8,
            Facing::Environment => 96u8,
        };

        let mut data = Vec::with_capacity(w as usize * h as usize * 4);
        for y in 0..h {
            for x in 0..w {
                let r = ((x * 255) / w) as u8 ^ tint;
                let g = ((y * 255) / h) as u8;
                let b = tint.wrapping_add(facing_bias);
                data.extend_from_slice(&[r, g, b, 255]);
            }
        }
        data
    }
}

impl MediaStream for TestPatternStream {
    fn latest_frame(&self) -> Option<CameraFrame> {
        if self.stopped {
            return None;
        }

        let warming = self
            .warmup_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if warming {
            debug!(seed = self.seed, "Test pattern warming up");
            return None;
        }

        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        Some(CameraFrame::from_rgba(
            self.width,
            self.height,
            self.render(),
            sequence,
        ))
    }

    fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        self.live.fetch_sub(1, Ordering::SeqCst);
        debug!(seed = self.seed, "Test pattern stream stopped");
    }
}

impl Drop for TestPatternStream {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_warmup_holds_back_frames() {
        let source = TestPatternSource::new().with_warmup(2);
        let (_, stream) = source.open(Facing::User).await.unwrap();

        assert!(stream.latest_frame().is_none());
        assert!(stream.latest_frame().is_none());
        let frame = stream.latest_frame().unwrap();
        assert_eq!(frame.width, test_pattern::DEFAULT_WIDTH);
        assert_eq!(frame.data.len(), (frame.width * frame.height * 4) as usize);
    }

    #[tokio::test]
    async fn test_each_open_renders_a_different_pattern() {
        let source = TestPatternSource::new();
        let (_, first) = source.open(Facing::Environment).await.unwrap();
        let (_, second) = source.open(Facing::Environment).await.unwrap();

        let a = first.latest_frame().unwrap();
        let b = second.latest_frame().unwrap();
        assert_ne!(a.data, b.data);
        assert_eq!(source.open_count(), 2);
    }

    #[tokio::test]
    async fn test_dropping_stream_releases_it() {
        let source = TestPatternSource::new();
        let (_, stream) = source.open(Facing::User).await.unwrap();
        assert_eq!(source.active_streams(), 1);
        drop(stream);
        assert_eq!(source.active_streams(), 0);
    }

    #[tokio::test]
    async fn test_denied_source_has_no_cameras() {
        let source = TestPatternSource::denied("blocked");
        assert!(source.enumerate_cameras().is_empty());
        let err = source.open(Facing::User).await.err().unwrap();
        assert_eq!(err, BackendError::PermissionDenied("blocked".into()));
    }
}
