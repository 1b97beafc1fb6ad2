// SPDX-License-Identifier: MPL-2.0

//! Storage utilities for selected and captured stills

use crate::constants::file_formats;
use crate::errors::PhotoError;
use crate::pipelines::photo::{PhotoPipeline, StillImage};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Read a manually selected image and re-encode it through the pipeline
pub async fn load_still_from_file(
    pipeline: &PhotoPipeline,
    path: &Path,
) -> Result<StillImage, PhotoError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    if !file_formats::is_image_extension(extension) {
        return Err(PhotoError::DecodeFailed(format!(
            "{} is not a supported image file",
            path.display()
        )));
    }

    let bytes = tokio::fs::read(path).await?;
    debug!(path = %path.display(), size = bytes.len(), "Read selected file");

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    pipeline.reencode_file(bytes, name).await
}

/// Write a still to `output_dir` as `<stem>_<timestamp>.<ext>`
pub async fn save_still(
    still: &StillImage,
    output_dir: &Path,
    stem: &str,
) -> Result<PathBuf, PhotoError> {
    tokio::fs::create_dir_all(output_dir).await?;

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let filename = still.file_name(&format!("{}_{}", stem, timestamp));
    let filepath = output_dir.join(filename);

    tokio::fs::write(&filepath, &still.data).await?;
    info!(path = %filepath.display(), size = still.len(), "Still saved");
    Ok(filepath)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_text_file_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();

        let err = load_still_from_file(&PhotoPipeline::new(), &path)
            .await
            .unwrap_err();
        assert!(matches!(err, PhotoError::DecodeFailed(_)));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let err = load_still_from_file(&PhotoPipeline::new(), Path::new("/nonexistent/id.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, PhotoError::Io(_)));
    }

    #[tokio::test]
    async fn test_selected_file_round_trips_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("id.png");
        image::RgbImage::from_pixel(5, 5, image::Rgb([1, 2, 3]))
            .save(&source)
            .unwrap();

        let still = load_still_from_file(&PhotoPipeline::new(), &source)
            .await
            .unwrap();
        let out = save_still(&still, &dir.path().join("out"), "passport_front")
            .await
            .unwrap();

        assert_eq!(out.extension().and_then(|e| e.to_str()), Some("jpg"));
        assert_eq!(std::fs::read(&out).unwrap(), still.data.to_vec());
    }
}
