//! Branch ruleset resource loading.
use std::path::Path;

use serde_json::{Map, Value};

use super::yaml_loader::load_records;
use crate::error::ConfigError;

/// A desired repository ruleset: a name plus an open attribute bag that is
/// sent to the API as-is after normalisation.
#[derive(Debug, Clone, PartialEq)]
pub struct Ruleset {
    /// Unique, case-sensitive ruleset name.
    pub name: String,
    /// Every attribute from the file, `name` included (trimmed).
    pub attributes: Map<String, Value>,
}

/// Load rulesets from a YAML/JSON array of objects.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, is not an array,
/// or an entry lacks a non-empty string `name`.
pub fn load(path: &Path) -> Result<Vec<Ruleset>, ConfigError> {
    load_records("Ruleset", path)?
        .into_iter()
        .enumerate()
        .map(|(index, mut attributes)| {
            let name = attributes
                .get("name")
                .and_then(Value::as_str)
                .map(str::trim)
                .unwrap_or_default()
                .to_string();
            if name.is_empty() {
                return Err(ConfigError::InvalidEntry {
                    kind: "Ruleset",
                    index,
                    message: "must define a non-empty 'name'".to_string(),
                });
            }
            attributes.insert("name".to_string(), Value::String(name.clone()));
            Ok(Ruleset { name, attributes })
        })
        .collect()
}
