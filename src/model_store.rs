use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::warn;

use crate::error::BatchError;

/// The persisted image-path → embedding-vector mapping.
///
/// Backed by `serde_json::Map`, which keeps keys sorted, so repeated runs
/// over identical inputs serialize byte-identically. Values are kept as raw
/// JSON for entries not touched by the current run; no vector-shape
/// validation is performed on load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    entries: serde_json::Map<String, Value>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the model from disk, falling back to an empty model when the file
    /// is missing, unparseable, or not a JSON object. In the fallback cases
    /// the previous on-disk content is discarded when the model is next saved.
    pub fn load(path: &Path) -> Self {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::new(),
            Err(e) => {
                warn!(
                    "Failed to read model file {}, starting fresh: {}",
                    path.display(),
                    e
                );
                return Self::new();
            }
        };

        let value: Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to parse model JSON, starting fresh: {}", e);
                return Self::new();
            }
        };

        match value {
            Value::Object(entries) => Self { entries },
            other => {
                warn!(
                    "Model file is not a JSON object (found {}), reinitializing",
                    json_type_name(&other)
                );
                Self::new()
            }
        }
    }

    /// Overlay the results of the current run. New vectors win over old ones
    /// for the same key; keys not present in `results` are left untouched.
    pub fn merge(&mut self, results: BTreeMap<String, Vec<f32>>) {
        for (path, vector) in results {
            let value = Value::Array(vector.into_iter().map(Value::from).collect());
            self.entries.insert(path, value);
        }
    }

    /// Persist the model as compact JSON, overwriting the file in full.
    pub fn save(&self, path: &Path) -> Result<(), BatchError> {
        let body = serde_json::to_string(&self.entries)?;
        fs::write(path, body).map_err(|source| BatchError::ModelWrite {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let model = Model::load(&dir.path().join("model.json"));
        assert!(model.is_empty());
    }

    #[test]
    fn test_load_corrupt_json_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.json");
        fs::write(&path, "{not valid json").unwrap();

        let model = Model::load(&path);
        assert!(model.is_empty());
    }

    #[test]
    fn test_load_non_object_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        let model = Model::load(&path);
        assert!(model.is_empty());
    }

    #[test]
    fn test_merge_overwrites_and_preserves() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.json");
        fs::write(&path, r#"{"a.png": [1, 2], "b.png": [3, 4]}"#).unwrap();

        let mut model = Model::load(&path);
        let mut results = BTreeMap::new();
        results.insert("b.png".to_string(), vec![9.0, 9.0]);
        model.merge(results);

        assert_eq!(model.len(), 2);
        assert_eq!(model.get("a.png"), Some(&json!([1, 2])));
        assert_eq!(model.get("b.png"), Some(&json!([9.0, 9.0])));
        model.save(&path).unwrap();

        let saved: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved, json!({"a.png": [1, 2], "b.png": [9.0, 9.0]}));
    }

    #[test]
    fn test_merge_empty_results_is_noop() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.json");
        fs::write(&path, r#"{"x.png": [1]}"#).unwrap();

        let mut model = Model::load(&path);
        model.merge(BTreeMap::new());
        model.save(&path).unwrap();

        let saved: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved, json!({"x.png": [1]}));
    }

    #[test]
    fn test_save_is_compact() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.json");

        let mut model = Model::new();
        let mut results = BTreeMap::new();
        results.insert("a.png".to_string(), vec![0.5]);
        model.merge(results);
        model.save(&path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(!contents.contains('\n'));
        assert!(!contents.contains(": "));
    }
}
