// SPDX-License-Identifier: MPL-2.0

//! Integration tests for constants module

use doccapture::PhotoMode;
use doccapture::constants::{fields, file_formats, timing};
use doccapture::flow::{DocumentKind, DocumentType, Side};

#[test]
fn test_form_field_keys() {
    // The submission glue reads exactly these keys
    assert_eq!(fields::FRONT_PHOTO, "frontPhotoData");
    assert_eq!(fields::BACK_PHOTO, "backPhotoData");
    assert_eq!(fields::PHOTO_MODE, "photoMode");
    assert_eq!(Side::Front.field_key(), fields::FRONT_PHOTO);
    assert_eq!(Side::Back.field_key(), fields::BACK_PHOTO);
}

#[test]
fn test_photo_mode_values() {
    assert_eq!(PhotoMode::Single.as_str(), "single");
    assert_eq!(PhotoMode::Dual.to_string(), "dual");
    assert_eq!(DocumentKind::SingleSided.photo_mode(), PhotoMode::Single);
    assert_eq!(DocumentKind::DoubleSided.photo_mode(), PhotoMode::Dual);
}

#[test]
fn test_catalog_round_trips_through_strings() {
    for document in DocumentType::ALL {
        assert_eq!(document.as_str().parse::<DocumentType>(), Ok(document));
        assert!(!document.label().is_empty());
    }
}

#[test]
fn test_image_extensions() {
    assert!(file_formats::is_image_extension("jpeg"));
    assert!(file_formats::is_image_extension("PNG"));
    assert!(!file_formats::is_image_extension("pdf"));
}

#[test]
fn test_first_frame_wait_is_bounded() {
    assert!(timing::FIRST_FRAME_POLL_INTERVAL < timing::FIRST_FRAME_TIMEOUT);
    assert!(timing::DEFAULT_ACQUISITION_TIMEOUT_SECS > 0);
}
