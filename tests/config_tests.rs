// SPDX-License-Identifier: MPL-2.0

//! Integration tests for configuration module

use doccapture::Config;
use doccapture::backends::camera::{CameraBackendType, Facing};
use doccapture::config::PhotoOutputFormat;
use doccapture::pipelines::photo::{EncodingFormat, EncodingQuality, PhotoPipeline};

#[test]
fn test_config_default() {
    let config = Config::default();

    assert_eq!(
        config.preferred_facing,
        Facing::Environment,
        "Documents should be captured with the rear camera by default"
    );
    assert_eq!(config.backend, CameraBackendType::V4l2);
    assert_eq!(config.photo_output_format, PhotoOutputFormat::Jpeg);
    assert_eq!(config.jpeg_quality.jpeg_quality(), 92);
    assert!(config.max_dimension.is_none());
}

#[test]
fn test_config_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");

    let config = Config {
        backend: CameraBackendType::TestPattern,
        preferred_facing: Facing::User,
        photo_output_format: PhotoOutputFormat::Png,
        jpeg_quality: EncodingQuality::Low,
        max_dimension: Some(1600),
        ..Config::default()
    };
    config.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_invalid_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(Config::load_from(&path).is_err());
}

#[test]
fn test_pipeline_follows_config() {
    let config = Config {
        photo_output_format: PhotoOutputFormat::Png,
        max_dimension: Some(800),
        mirror_user_facing: false,
        ..Config::default()
    };
    let pipeline = PhotoPipeline::from_config(&config);

    assert_eq!(pipeline.encoder().format(), EncodingFormat::Png);
    assert_eq!(pipeline.post_processor().config().max_dimension, Some(800));
    assert!(!pipeline.post_processor().config().mirror_user_facing);
}
