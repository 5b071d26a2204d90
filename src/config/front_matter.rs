//! Markdown documents with a leading `---` YAML front-matter block.
use std::path::Path;

use serde_json::{Map, Value};

use super::yaml_loader::{parse_yaml, read_file};
use crate::error::ConfigError;

/// A parsed Markdown document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Front-matter keys; empty when the document has no front matter.
    pub data: Map<String, Value>,
    /// Markdown after the closing delimiter.
    pub body: String,
}

impl Document {
    /// Trimmed string value of `key`, or `None` when absent, blank, or not a
    /// string.
    #[must_use]
    pub fn string(&self, key: &str) -> Option<String> {
        self.data
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
    }

    /// Boolean value of `key`; anything but a YAML boolean is `false`.
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        self.data.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Entries of the `key` list rendered as trimmed strings, blanks dropped.
    #[must_use]
    pub fn string_list(&self, key: &str) -> Vec<String> {
        let Some(Value::Array(items)) = self.data.get(key) else {
            return Vec::new();
        };
        items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.trim().to_string(),
                other => other.to_string(),
            })
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Split `content` into its front-matter source and body.
///
/// The document must open with a `---` line; the block ends at the next line
/// consisting of `---`. Without an opening delimiter, or without a closing
/// one, the whole content is the body.
fn split(content: &str) -> (Option<&str>, &str) {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let Some(rest) = content
        .strip_prefix("---\r\n")
        .or_else(|| content.strip_prefix("---\n"))
    else {
        return (None, content);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let (front, tail) = rest.split_at(offset);
            let body = tail.get(line.len()..).unwrap_or_default();
            return (Some(front), body);
        }
        offset += line.len();
    }
    (None, content)
}

/// Parse a Markdown document held in memory.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] if the front matter is not valid YAML, or
/// [`ConfigError::Shape`] if it is not a mapping.
pub fn parse(path: &Path, content: &str) -> Result<Document, ConfigError> {
    let (front, body) = split(content);
    let data = match front.map(|src| parse_yaml(path, src)).transpose()? {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map,
        Some(_) => {
            return Err(ConfigError::Shape {
                kind: "Front matter of",
                path: path.to_path_buf(),
                expected: "a mapping",
            });
        }
    };
    Ok(Document {
        data,
        body: body.to_string(),
    })
}

/// Read and parse a Markdown document.
///
/// # Errors
///
/// Returns an error if the file cannot be read or its front matter is invalid.
pub fn load(path: &Path) -> Result<Document, ConfigError> {
    parse(path, &read_file(path)?)
}
