//! Options applied when the target repository has to be created.
use std::path::Path;

use serde_json::Value;

use super::yaml_loader::{parse_yaml, read_file};
use crate::error::ConfigError;

/// Repository feature toggles sent on creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Features {
    /// Enable discussions.
    pub discussions: bool,
    /// Enable issues.
    pub issues: bool,
    /// Enable projects.
    pub projects: bool,
    /// Enable the wiki.
    pub wiki: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            discussions: false,
            issues: true,
            projects: true,
            wiki: true,
        }
    }
}

/// Settings for a repository created with `--create`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NewRepository {
    /// Feature toggles.
    pub features: Features,
}

/// Load `{features: {discussions, issues, projects, wiki}}`.
///
/// Non-boolean feature values keep their defaults.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or is not a mapping.
pub fn load(path: &Path) -> Result<NewRepository, ConfigError> {
    let Value::Object(data) = parse_yaml(path, &read_file(path)?)? else {
        return Err(ConfigError::Shape {
            kind: "newRepository",
            path: path.to_path_buf(),
            expected: "a record",
        });
    };

    let mut features = Features::default();
    if let Some(Value::Object(values)) = data.get("features") {
        let flag = |name: &str, current: bool| values.get(name).and_then(Value::as_bool).unwrap_or(current);
        features = Features {
            discussions: flag("discussions", features.discussions),
            issues: flag("issues", features.issues),
            projects: flag("projects", features.projects),
            wiki: flag("wiki", features.wiki),
        };
    }

    Ok(NewRepository { features })
}
