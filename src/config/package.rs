//! Discovery and parsing of the `repo-starter-kit` configuration file.
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::yaml_loader::{parse_json, parse_yaml, read_file};
use crate::error::ConfigError;

/// How a configuration file's content is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Yaml,
    Json,
    /// JSON first, YAML if that fails.
    Sniff,
}

/// Configuration file names searched in a directory, in order.
const CONFIG_FILES: &[(&str, Format)] = &[
    ("repo-starter-kit.yml", Format::Yaml),
    ("repo-starter-kit.yaml", Format::Yaml),
    ("repo-starter-kit.json", Format::Json),
    ("repo-starter-kit", Format::Sniff),
];

/// Seed content kinds whose creation order can be configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// The seed issue.
    Issue,
    /// The seed discussion.
    Discussion,
}

impl ContentKind {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "issue" => Some(Self::Issue),
            "discussion" => Some(Self::Discussion),
            _ => None,
        }
    }
}

/// Default seed content order: issue, then discussion.
pub const DEFAULT_ORDER: [ContentKind; 2] = [ContentKind::Issue, ContentKind::Discussion];

/// Resource references read from a configuration file, still unresolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageConfig {
    /// Directory the references are resolved against.
    pub root: PathBuf,
    /// `labels` reference.
    pub labels: Option<String>,
    /// `categories` reference.
    pub categories: Option<String>,
    /// `rulesets` references (a single string becomes a one-element list).
    pub rulesets: Vec<String>,
    /// `issue` reference.
    pub issue: Option<String>,
    /// `discussion` reference.
    pub discussion: Option<String>,
    /// `newRepository` reference.
    pub new_repository: Option<String>,
    /// Seed content order.
    pub order: Vec<ContentKind>,
}

/// Names of all accepted configuration files, comma separated.
#[must_use]
pub fn candidate_names() -> String {
    CONFIG_FILES
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Read the configuration at `path`.
///
/// A file is read directly (its format sniffed from the extension). A
/// directory is searched for the [`CONFIG_FILES`] in order. `location`
/// describes the source in the not-found message (e.g. `"Package demo"`).
///
/// # Errors
///
/// Returns [`ConfigError::NotFound`] when a directory holds none of the
/// accepted files, or a read/parse/shape error for the file found.
pub fn read(path: &Path, location: &str) -> Result<PackageConfig, ConfigError> {
    if path.is_file() {
        let format = match path.extension().and_then(|e| e.to_str()) {
            Some("yml" | "yaml") => Format::Yaml,
            Some("json") => Format::Json,
            _ => Format::Sniff,
        };
        let root = path.parent().unwrap_or_else(|| Path::new("."));
        return parse_file(path, root, format);
    }

    if !path.is_dir() {
        return Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file or directory"),
        });
    }

    for (name, format) in CONFIG_FILES {
        let candidate = path.join(name);
        if candidate.is_file() {
            return parse_file(&candidate, path, *format);
        }
    }

    Err(ConfigError::NotFound {
        location: location.to_string(),
        candidates: candidate_names(),
    })
}

fn parse_file(path: &Path, root: &Path, format: Format) -> Result<PackageConfig, ConfigError> {
    let content = read_file(path)?;
    let value = match format {
        Format::Yaml => parse_yaml(path, &content)?,
        Format::Json => parse_json(path, &content)?,
        Format::Sniff => parse_json(path, &content).or_else(|_| parse_yaml(path, &content))?,
    };
    normalize(&value, root, path)
}

/// Pick the known keys out of a parsed configuration document.
///
/// Non-string path values are ignored, as are `rulesets` lists containing
/// anything but strings and unknown `order` entries.
fn normalize(value: &Value, root: &Path, source: &Path) -> Result<PackageConfig, ConfigError> {
    let Value::Object(data) = value else {
        return Err(ConfigError::Shape {
            kind: "Config",
            path: source.to_path_buf(),
            expected: "an object",
        });
    };

    let string = |key: &str| data.get(key).and_then(Value::as_str).map(String::from);

    let rulesets = match data.get("rulesets") {
        Some(Value::String(single)) => vec![single.clone()],
        Some(Value::Array(items)) if items.iter().all(Value::is_string) => items
            .iter()
            .filter_map(Value::as_str)
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    };

    let mut order: Vec<ContentKind> = Vec::new();
    if let Some(Value::Array(items)) = data.get("order") {
        for kind in items.iter().filter_map(Value::as_str).filter_map(ContentKind::from_name) {
            if !order.contains(&kind) {
                order.push(kind);
            }
        }
    }
    for kind in DEFAULT_ORDER {
        if !order.contains(&kind) {
            order.push(kind);
        }
    }

    Ok(PackageConfig {
        root: root.to_path_buf(),
        labels: string("labels"),
        categories: string("categories"),
        rulesets,
        issue: string("issue"),
        discussion: string("discussion"),
        new_repository: string("newRepository"),
        order,
    })
}
