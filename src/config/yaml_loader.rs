//! YAML/JSON resource file reading shared by the resource loaders.
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::ConfigError;

/// Read a resource file to a string.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read.
pub fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse YAML (a superset of JSON) into a generic value.
///
/// An empty document parses to [`Value::Null`].
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] when the content is not valid YAML.
pub fn parse_yaml(path: &Path, content: &str) -> Result<Value, ConfigError> {
    if content.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Parse strict JSON into a generic value.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] when the content is not valid JSON.
pub fn parse_json(path: &Path, content: &str) -> Result<Value, ConfigError> {
    serde_json::from_str(content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load a file that must hold an array of objects.
///
/// `kind` names the resource in error messages (`"Label"`, `"Category"`, ...).
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, is not an array,
/// or holds a non-object entry.
pub fn load_records(kind: &'static str, path: &Path) -> Result<Vec<Map<String, Value>>, ConfigError> {
    let content = read_file(path)?;
    let Value::Array(items) = parse_yaml(path, &content)? else {
        return Err(ConfigError::Shape {
            kind,
            path: path.to_path_buf(),
            expected: "an array",
        });
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(map) => Ok(map),
            _ => Err(ConfigError::InvalidEntry {
                kind,
                index,
                message: "must be an object".to_string(),
            }),
        })
        .collect()
}

/// Read `key` from a record as trimmed text.
///
/// Strings are trimmed, numbers and booleans are rendered, anything else
/// (including a missing key) yields an empty string.
#[must_use]
pub fn text_field(record: &Map<String, Value>, key: &str) -> String {
    match record.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn load_records_reads_array_of_objects() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "labels.yml", "- name: bug\n- name: docs\n");
        let records = load_records("Label", &path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(text_field(&records[1], "name"), "docs");
    }

    #[test]
    fn load_records_accepts_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "rulesets.json", r#"[{"name": "main"}]"#);
        assert_eq!(load_records("Ruleset", &path).unwrap().len(), 1);
    }

    #[test]
    fn load_records_rejects_non_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "labels.yml", "name: bug\n");
        let err = load_records("Label", &path).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Label file {} must contain an array.", path.display())
        );
    }

    #[test]
    fn load_records_rejects_scalar_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "labels.yml", "- name: bug\n- plain\n");
        let err = load_records("Label", &path).unwrap_err();
        assert_eq!(err.to_string(), "Label entry at index 1 must be an object.");
    }

    #[test]
    fn load_records_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "labels.yml", "- name: [unclosed\n");
        assert!(matches!(
            load_records("Label", &path).unwrap_err(),
            ConfigError::Parse { .. }
        ));
    }

    #[test]
    fn load_records_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_records("Label", &dir.path().join("nope.yml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn text_field_renders_scalars() {
        let record: Map<String, Value> =
            serde_json::from_str(r#"{"a": "  x ", "b": 7, "c": true, "d": null}"#).unwrap();
        assert_eq!(text_field(&record, "a"), "x");
        assert_eq!(text_field(&record, "b"), "7");
        assert_eq!(text_field(&record, "c"), "true");
        assert_eq!(text_field(&record, "d"), "");
        assert_eq!(text_field(&record, "missing"), "");
    }
}
