//! Discussion category resource loading.
use std::fmt;
use std::path::Path;

use super::yaml_loader::{load_records, text_field};
use crate::error::ConfigError;

/// How discussions in a category behave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFormat {
    /// Open-ended discussion.
    #[default]
    Open,
    /// Question and answer, with answers that can be marked.
    Answer,
    /// Only maintainers may post.
    Announcement,
    /// Polls.
    Poll,
}

impl CategoryFormat {
    /// Parse a format name; unknown or missing values fall back to
    /// [`CategoryFormat::Open`].
    #[must_use]
    pub fn from_name(value: &str) -> Self {
        match value {
            "answer" => Self::Answer,
            "announcement" => Self::Announcement,
            "poll" => Self::Poll,
            _ => Self::Open,
        }
    }

    /// Lower-case name as used in configuration files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Answer => "answer",
            Self::Announcement => "announcement",
            Self::Poll => "poll",
        }
    }
}

impl fmt::Display for CategoryFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A desired discussion category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// Unique, case-sensitive category name.
    pub name: String,
    /// Description shown on the categories page.
    pub description: String,
    /// Emoji shortcode (e.g. `:speech_balloon:`).
    pub emoji: String,
    /// Discussion format.
    pub format: CategoryFormat,
}

/// Load categories from a YAML/JSON array of
/// `{name, description, emoji, format}` records.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, is not an array,
/// or an entry lacks a non-empty `name`.
pub fn load(path: &Path) -> Result<Vec<Category>, ConfigError> {
    load_records("Category", path)?
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            let name = text_field(&record, "name");
            if name.is_empty() {
                return Err(ConfigError::InvalidEntry {
                    kind: "Category",
                    index,
                    message: "must define a non-empty 'name'".to_string(),
                });
            }
            Ok(Category {
                name,
                description: text_field(&record, "description"),
                emoji: text_field(&record, "emoji"),
                format: CategoryFormat::from_name(&text_field(&record, "format")),
            })
        })
        .collect()
}
