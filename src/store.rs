//! Read-only access to annotation records owned by other modules
//!
//! Pins live in a store keyed by drawing id; text annotations and vector ink
//! are plain JSON arrays handed over by the caller.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::de::DeserializeOwned;

use crate::domain::{InkStroke, Pin, TextAnnotation};

/// Errors reading the pin store
#[derive(Debug, thiserror::Error)]
pub enum PinStoreError {
    #[error("pin store unreadable: {0}")]
    Io(#[from] std::io::Error),
    #[error("pin store is corrupt: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("pin store task failed: {0}")]
    Task(String),
}

/// Source of pins for a drawing
pub trait PinStore {
    fn pins_for(
        &self,
        drawing_id: &str,
    ) -> impl Future<Output = Result<Vec<Pin>, PinStoreError>> + Send;
}

/// A store with no pins at all
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPins;

impl PinStore for NoPins {
    async fn pins_for(&self, _drawing_id: &str) -> Result<Vec<Pin>, PinStoreError> {
        Ok(Vec::new())
    }
}

/// Pins kept in a JSON file mapping drawing id to an array of pins
#[derive(Debug, Clone)]
pub struct JsonPinStore {
    path: PathBuf,
}

impl JsonPinStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Decode the pins of one drawing, dropping records that do not parse
fn decode_pins(bytes: &[u8], drawing_id: &str) -> Result<Vec<Pin>, PinStoreError> {
    // Entries of other drawings are not inspected
    let mut by_drawing: HashMap<String, serde_json::Value> = serde_json::from_slice(bytes)?;
    let Some(entry) = by_drawing.remove(drawing_id) else {
        return Ok(Vec::new());
    };
    let records: Vec<serde_json::Value> = serde_json::from_value(entry)?;

    let mut pins = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<Pin>(record) {
            Ok(pin) => pins.push(pin),
            Err(err) => log::warn!("Skipping pin #{} of {}: {}", index, drawing_id, err),
        }
    }
    Ok(pins)
}

impl PinStore for JsonPinStore {
    async fn pins_for(&self, drawing_id: &str) -> Result<Vec<Pin>, PinStoreError> {
        let path = self.path.clone();
        let id = drawing_id.to_string();

        tokio::task::spawn_blocking(move || {
            let bytes = match std::fs::read(&path) {
                Ok(bytes) => bytes,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                    log::debug!("No pin store at {}", path.display());
                    return Ok(Vec::new());
                }
                Err(err) => return Err(err.into()),
            };
            let pins = decode_pins(&bytes, &id)?;
            log::debug!("Loaded {} pins for drawing {}", pins.len(), id);
            Ok(pins)
        })
        .await
        .map_err(|err| PinStoreError::Task(err.to_string()))?
    }
}

fn load_json_array<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Load text annotations from a JSON array
pub fn load_text_annotations(path: &Path) -> anyhow::Result<Vec<TextAnnotation>> {
    load_json_array(path)
}

/// Load vector ink strokes from a JSON array
pub fn load_ink_strokes(path: &Path) -> anyhow::Result<Vec<InkStroke>> {
    load_json_array(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PinColor, PinStatus};
    use std::io::Write;

    fn store_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_pins_are_looked_up_by_drawing_id() {
        let file = store_file(
            r#"{
                "plan-1": [{"x": 0.2, "y": 0.4, "color": "green", "status": "done"}],
                "plan-2": [{"x": 0.9, "y": 0.9}]
            }"#,
        );
        let store = JsonPinStore::new(file.path());

        let pins = store.pins_for("plan-1").await.unwrap();
        assert_eq!(pins.len(), 1);
        assert_eq!(pins[0].color, PinColor::Green);
        assert_eq!(pins[0].status, PinStatus::Done);

        assert!(store.pins_for("plan-3").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_store_means_no_pins() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonPinStore::new(dir.path().join("pins.json"));
        assert!(store.pins_for("anything").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_store_is_an_error() {
        let file = store_file("{ not json");
        let store = JsonPinStore::new(file.path());
        let err = store.pins_for("plan-1").await.unwrap_err();
        assert!(matches!(err, PinStoreError::Parse(_)));
    }

    #[tokio::test]
    async fn test_bad_records_are_skipped() {
        let file = store_file(r#"{"p": [{"x": "left"}, {"x": 0.5, "y": 0.5}]}"#);
        let store = JsonPinStore::new(file.path());
        let pins = store.pins_for("p").await.unwrap();
        assert_eq!(pins.len(), 1);
    }

    #[tokio::test]
    async fn test_broken_entry_of_other_drawing_is_ignored() {
        let file = store_file(r#"{"other": "oops", "b": [{"x": 0.5, "y": 0.5}]}"#);
        let store = JsonPinStore::new(file.path());
        let pins = store.pins_for("b").await.unwrap();
        assert_eq!(pins.len(), 1);
        assert_eq!((pins[0].x, pins[0].y), (0.5, 0.5));
    }

    #[tokio::test]
    async fn test_non_array_entry_of_requested_drawing_is_an_error() {
        let file = store_file(r#"{"b": "oops"}"#);
        let store = JsonPinStore::new(file.path());
        let err = store.pins_for("b").await.unwrap_err();
        assert!(matches!(err, PinStoreError::Parse(_)));
    }

    #[test]
    fn test_load_text_annotations() {
        let file = store_file(r#"[{"x": 0.1, "y": 0.1, "font_size": 14, "text": "Beam"}]"#);
        let texts = load_text_annotations(file.path()).unwrap();
        assert_eq!(texts.len(), 1);
        assert_eq!(texts[0].text, "Beam");
        assert_eq!(texts[0].font_size, 14.0);
    }

    #[test]
    fn test_load_ink_strokes() {
        let file = store_file(r##"[{"points": [[0.1, 0.2], [0.3, 0.4]], "color": "#112233"}]"##);
        let strokes = load_ink_strokes(file.path()).unwrap();
        assert_eq!(strokes[0].points, vec![(0.1, 0.2), (0.3, 0.4)]);
        assert_eq!(strokes[0].width, 3.0);
    }
}
