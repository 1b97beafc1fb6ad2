// SPDX-License-Identifier: GPL-3.0-only

//! V4L2 device discovery
//!
//! Scans `/dev/video*` and keeps the nodes that can capture video, using the
//! `VIDIOC_QUERYCAP` ioctl for the card and driver names.

use super::types::{CameraDevice, DeviceInfo, Facing};
use crate::constants::v4l2 as v4l2_consts;
use std::os::unix::io::{AsRawFd, RawFd};
use std::path::Path;
use tracing::debug;

/// VIDIOC_QUERYCAP ioctl number
const VIDIOC_QUERYCAP: libc::c_ulong = 0x80685600;

/// Set in `capabilities` when `device_caps` is filled in
const V4L2_CAP_DEVICE_CAPS: u32 = 0x8000_0000;

/// V4L2 capability structure for VIDIOC_QUERYCAP ioctl
#[repr(C)]
struct V4l2Capability {
    driver: [u8; 16],
    card: [u8; 32],
    bus_info: [u8; 32],
    version: u32,
    capabilities: u32,
    device_caps: u32,
    reserved: [u32; 3],
}

impl V4l2Capability {
    /// Capabilities of this node (not the whole physical device)
    fn node_caps(&self) -> u32 {
        if self.capabilities & V4L2_CAP_DEVICE_CAPS != 0 {
            self.device_caps
        } else {
            self.capabilities
        }
    }
}

/// Query V4L2 capabilities for an open file descriptor.
fn query_v4l2_cap(fd: RawFd) -> Option<V4l2Capability> {
    // SAFETY: the struct is plain old data and matches the kernel layout
    let mut cap: V4l2Capability = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(fd, VIDIOC_QUERYCAP as _, &mut cap as *mut V4l2Capability) };
    if result < 0 { None } else { Some(cap) }
}

fn c_string(bytes: &[u8]) -> String {
    let len = bytes.iter().position(|&c| c == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..len]).to_string()
}

/// Infer facing from the card name
///
/// V4L2 has no facing property; phone sensors and some laptops name the rear
/// camera explicitly, everything else is treated as a user-facing webcam.
pub fn facing_from_name(name: &str) -> Facing {
    let lower = name.to_lowercase();
    if v4l2_consts::ENVIRONMENT_NAME_HINTS
        .iter()
        .any(|hint| lower.contains(hint))
    {
        Facing::Environment
    } else {
        Facing::User
    }
}

/// Probe one device node, returning it if it can capture video
pub fn probe_device(path: &Path) -> Option<CameraDevice> {
    let file = std::fs::File::open(path).ok()?;
    let cap = query_v4l2_cap(file.as_raw_fd())?;

    if cap.node_caps() & v4l2_consts::CAP_VIDEO_CAPTURE == 0 {
        debug!(path = %path.display(), "Skipping non-capture node");
        return None;
    }

    let path_str = path.to_string_lossy().to_string();
    let real_path = std::fs::canonicalize(path)
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| path_str.clone());

    let card = c_string(&cap.card);
    let driver = c_string(&cap.driver);
    debug!(path = %path_str, card = %card, driver = %driver, "Found capture device");

    Some(CameraDevice {
        name: if card.is_empty() { path_str.clone() } else { card.clone() },
        path: path_str.clone(),
        facing: facing_from_name(&card),
        device_info: Some(DeviceInfo {
            card,
            driver,
            path: path_str,
            real_path,
        }),
    })
}

/// Enumerate capture-capable V4L2 devices, sorted by node name
pub fn enumerate_video_devices() -> Vec<CameraDevice> {
    let Ok(entries) = std::fs::read_dir("/dev") else {
        return Vec::new();
    };

    let mut nodes: Vec<_> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with("video"))
        .map(|e| e.path())
        .collect();
    nodes.sort();

    nodes.iter().filter_map(|p| probe_device(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facing_from_name() {
        assert_eq!(facing_from_name("Rear Camera (imx363)"), Facing::Environment);
        assert_eq!(facing_from_name("HD Webcam C920"), Facing::User);
    }

    #[test]
    fn test_c_string_stops_at_nul() {
        assert_eq!(c_string(b"uvcvideo\0\0\0"), "uvcvideo");
        assert_eq!(c_string(b"full"), "full");
    }

    #[test]
    fn test_missing_node_is_skipped() {
        assert!(probe_device(Path::new("/nonexistent/video99")).is_none());
    }
}
