// SPDX-License-Identifier: GPL-3.0-only
//! Dedicated read thread for a V4L2 stream
//!
//! Dequeuing a buffer blocks until the device delivers one, so the read loop
//! of each open stream lives on its own thread and is joined when the stream
//! stops.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

/// What the read loop does after one iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopAction {
    Continue,
    Stop,
}

/// Owns the read thread of one stream
pub struct CaptureLoopController {
    thread: Option<JoinHandle<()>>,
    stopping: Arc<AtomicBool>,
    name: String,
}

impl CaptureLoopController {
    /// Spawn a thread that calls `step` until it returns `Stop` or the
    /// controller is stopped
    pub fn start<F>(name: &str, mut step: F) -> Self
    where
        F: FnMut() -> LoopAction + Send + 'static,
    {
        let stopping = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stopping);
        let thread_name = name.to_string();

        let thread = thread::spawn(move || {
            debug!(name = %thread_name, "Read loop running");
            while !flag.load(Ordering::SeqCst) && step() == LoopAction::Continue {}
            debug!(name = %thread_name, "Read loop finished");
        });

        Self {
            thread: Some(thread),
            stopping,
            name: name.to_string(),
        }
    }

    /// Stop the loop and join its thread
    ///
    /// Waits for the iteration in progress, i.e. at most one blocking read.
    pub fn stop(&mut self) {
        self.stopping.store(true, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!(name = %self.name, "Read loop thread panicked");
            }
        }
    }
}

impl Drop for CaptureLoopController {
    fn drop(&mut self) {
        self.stop();
    }
}
