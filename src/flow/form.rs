// SPDX-License-Identifier: GPL-3.0-only

//! Explicit model of the hosting registration form
//!
//! The capture flow writes into this model instead of reaching into a page:
//! file inputs and preview surfaces are registered by id, and the submission
//! data is a plain map of field keys to values.

use serde_json::{Map, Value, json};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// A file attached to the submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedFile {
    pub name: String,
    pub mime_type: String,
    pub data: Arc<[u8]>,
}

impl SubmittedFile {
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Value of one submission field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    File(SubmittedFile),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            FieldValue::File(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&SubmittedFile> {
        match self {
            FieldValue::File(file) => Some(file),
            FieldValue::Text(_) => None,
        }
    }
}

/// A file input element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileInput {
    pub files: Vec<SubmittedFile>,
}

/// An element that shows captured images
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewSurface {
    /// `data:` URLs in display order
    pub images: Vec<String>,
    pub visible: bool,
}

/// The registration form
#[derive(Debug, Clone, Default)]
pub struct FormDocument {
    file_inputs: HashMap<String, FileInput>,
    previews: HashMap<String, PreviewSurface>,
    data: BTreeMap<String, FieldValue>,
}

impl FormDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file_input(mut self, id: &str) -> Self {
        self.add_file_input(id);
        self
    }

    pub fn with_preview(mut self, id: &str) -> Self {
        self.add_preview(id);
        self
    }

    pub fn add_file_input(&mut self, id: &str) {
        self.file_inputs.entry(id.to_string()).or_default();
    }

    pub fn add_preview(&mut self, id: &str) {
        self.previews.entry(id.to_string()).or_default();
    }

    pub fn file_input(&self, id: &str) -> Option<&FileInput> {
        self.file_inputs.get(id)
    }

    pub fn file_input_mut(&mut self, id: &str) -> Option<&mut FileInput> {
        self.file_inputs.get_mut(id)
    }

    pub fn preview(&self, id: &str) -> Option<&PreviewSurface> {
        self.previews.get(id)
    }

    pub fn preview_mut(&mut self, id: &str) -> Option<&mut PreviewSurface> {
        self.previews.get_mut(id)
    }

    pub fn value(&self, key: &str) -> Option<&FieldValue> {
        self.data.get(key)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.value(key).and_then(FieldValue::as_text)
    }

    pub fn file(&self, key: &str) -> Option<&SubmittedFile> {
        self.value(key).and_then(FieldValue::as_file)
    }

    /// Set a field, replacing any previous value
    pub fn set_value(&mut self, key: &str, value: FieldValue) {
        self.data.insert(key.to_string(), value);
    }

    pub fn set_text(&mut self, key: &str, text: &str) {
        self.set_value(key, FieldValue::Text(text.to_string()));
    }

    pub fn remove_value(&mut self, key: &str) -> Option<FieldValue> {
        self.data.remove(key)
    }

    /// Submission fields in key order
    pub fn values(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.data.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// JSON view of the submission data
    ///
    /// Text fields map to strings, files to `{ name, type, size }`.
    pub fn submission_summary(&self) -> Value {
        let fields: Map<String, Value> = self
            .data
            .iter()
            .map(|(key, value)| {
                let rendered = match value {
                    FieldValue::Text(text) => Value::String(text.clone()),
                    FieldValue::File(file) => json!({
                        "name": file.name,
                        "type": file.mime_type,
                        "size": file.size(),
                    }),
                };
                (key.clone(), rendered)
            })
            .collect();
        Value::Object(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, len: usize) -> SubmittedFile {
        SubmittedFile {
            name: name.to_string(),
            mime_type: "image/jpeg".to_string(),
            data: Arc::from(vec![7u8; len].into_boxed_slice()),
        }
    }

    #[test]
    fn test_registered_elements_resolve() {
        let form = FormDocument::new()
            .with_file_input("documentPhotos")
            .with_preview("documentPreview");
        assert!(form.file_input("documentPhotos").is_some());
        assert!(form.preview("documentPreview").is_some());
        assert!(form.file_input("documentPreview").is_none());
    }

    #[test]
    fn test_set_value_replaces() {
        let mut form = FormDocument::new();
        form.set_text("photoMode", "single");
        form.set_text("photoMode", "dual");
        assert_eq!(form.text("photoMode"), Some("dual"));
        assert_eq!(form.values().count(), 1);
    }

    #[test]
    fn test_submission_summary() {
        let mut form = FormDocument::new();
        form.set_text("photoMode", "single");
        form.set_value("frontPhotoData", FieldValue::File(file("front.jpg", 42)));

        let summary = form.submission_summary();
        assert_eq!(summary["photoMode"], "single");
        assert_eq!(summary["frontPhotoData"]["name"], "front.jpg");
        assert_eq!(summary["frontPhotoData"]["type"], "image/jpeg");
        assert_eq!(summary["frontPhotoData"]["size"], 42);
    }
}
