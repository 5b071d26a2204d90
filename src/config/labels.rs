//! Label resource loading.
use std::path::Path;

use super::yaml_loader::{load_records, text_field};
use crate::error::ConfigError;

/// A desired issue label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    /// Unique, case-sensitive label name.
    pub name: String,
    /// Colour as written in the file; may carry a leading `#` or be empty.
    pub color: String,
    /// Optional description.
    pub description: Option<String>,
}

/// Load labels from a YAML/JSON array of `{name, color, description}` records.
///
/// All fields are trimmed. An empty description is treated as absent. Colour
/// and description constraints are checked at sync time so that a single bad
/// label only skips itself.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, is not an array,
/// or an entry lacks a non-empty `name`.
pub fn load(path: &Path) -> Result<Vec<Label>, ConfigError> {
    load_records("Label", path)?
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            let name = text_field(&record, "name");
            if name.is_empty() {
                return Err(ConfigError::InvalidEntry {
                    kind: "Label",
                    index,
                    message: "must define a non-empty 'name'".to_string(),
                });
            }
            let description = text_field(&record, "description");
            Ok(Label {
                name,
                color: text_field(&record, "color"),
                description: (!description.is_empty()).then_some(description),
            })
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn load_trims_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.yml");
        std::fs::write(
            &path,
            "- name: ' bug '\n  color: '#FF0000'\n  description: ' Something broke '\n- name: chore\n  color: ededed\n",
        )
        .unwrap();

        let labels = load(&path).unwrap();
        assert_eq!(
            labels,
            vec![
                Label {
                    name: "bug".to_string(),
                    color: "#FF0000".to_string(),
                    description: Some("Something broke".to_string()),
                },
                Label {
                    name: "chore".to_string(),
                    color: "ededed".to_string(),
                    description: None,
                },
            ]
        );
    }

    #[test]
    fn load_keeps_colourless_labels_for_sync_to_skip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.yml");
        std::fs::write(&path, "- name: bug\n").unwrap();
        assert_eq!(load(&path).unwrap()[0].color, "");
    }

    #[test]
    fn load_rejects_blank_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.yml");
        std::fs::write(&path, "- name: bug\n  color: red\n- name: '  '\n").unwrap();
        assert_eq!(
            load(&path).unwrap_err().to_string(),
            "Label entry at index 1 must define a non-empty 'name'."
        );
    }
}
