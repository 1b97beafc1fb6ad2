// SPDX-License-Identifier: GPL-3.0-only

use crate::backends::camera::{CameraBackendType, Facing};
use crate::constants::timing;
use crate::errors::{AppError, AppResult};
use crate::pipelines::photo::EncodingQuality;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Directory name under the platform config and pictures directories
const APP_DIR: &str = "doccapture";

const CONFIG_FILE: &str = "config.json";

/// Output format for captured stills
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoOutputFormat {
    #[default]
    Jpeg,
    Png,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Camera backend to use
    pub backend: CameraBackendType,
    /// Facing requested when a capture surface opens the camera
    pub preferred_facing: Facing,
    /// Encoding of captured stills
    pub photo_output_format: PhotoOutputFormat,
    /// JPEG quality preset
    pub jpeg_quality: EncodingQuality,
    /// Upper bound for a camera open, in seconds
    pub acquisition_timeout_secs: u64,
    /// Flip user-facing captures so text reads the right way round
    pub mirror_user_facing: bool,
    /// Longest edge of a still in pixels
    pub max_dimension: Option<u32>,
    /// Where the CLI writes stills; defaults to the pictures directory
    pub output_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: CameraBackendType::default(),
            preferred_facing: Facing::Environment, // Documents are shot with the rear camera
            photo_output_format: PhotoOutputFormat::default(),
            jpeg_quality: EncodingQuality::default(),
            acquisition_timeout_secs: timing::DEFAULT_ACQUISITION_TIMEOUT_SECS,
            mirror_user_facing: true,
            max_dimension: None,
            output_dir: None,
        }
    }
}

impl Config {
    /// `<config_dir>/doccapture/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load the user configuration, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            warn!("No config directory available, using defaults");
            return Self::default();
        };

        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Invalid config file, using defaults");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&text)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Write to the default location
    pub fn save(&self) -> AppResult<PathBuf> {
        let path = Self::default_path()
            .ok_or_else(|| AppError::Config("no config directory available".into()))?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(path, text)?;
        debug!(path = %path.display(), "Config saved");
        Ok(())
    }

    pub fn acquisition_timeout(&self) -> Duration {
        Duration::from_secs(self.acquisition_timeout_secs.max(1))
    }

    /// Configured output directory, or `<pictures>/doccapture`
    pub fn resolved_output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| {
            dirs::picture_dir()
                .or_else(dirs::home_dir)
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR)
        })
    }
}
