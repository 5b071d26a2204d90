//! Seed issue loading.
use std::path::Path;

use super::front_matter;
use crate::error::ConfigError;

/// How a seed issue is closed right after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueClose {
    /// Closed as completed.
    Completed,
    /// Closed as not planned.
    NotPlanned,
}

impl IssueClose {
    /// GraphQL `IssueClosedStateReason` value.
    #[must_use]
    pub const fn state_reason(self) -> &'static str {
        match self {
            Self::Completed => "COMPLETED",
            Self::NotPlanned => "NOT_PLANNED",
        }
    }
}

/// A seed issue created once on the target repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    /// Issue title.
    pub title: String,
    /// Markdown body.
    pub body: String,
    /// Label names applied on creation.
    pub labels: Vec<String>,
    /// Close the issue after creating it.
    pub close: Option<IssueClose>,
    /// Pin the issue.
    pub pin: bool,
    /// Lock the conversation.
    pub lock: bool,
}

/// Load an issue from a Markdown file with front matter
/// (`title`, `labels`, `close`, `pin`, `lock`).
///
/// # Errors
///
/// Returns an error if the file cannot be read, the front matter is invalid,
/// or `title` is missing.
pub fn load(path: &Path) -> Result<Issue, ConfigError> {
    let doc = front_matter::load(path)?;
    let title = doc.string("title").ok_or_else(|| ConfigError::MissingField {
        field: "title",
        path: path.to_path_buf(),
    })?;
    let close = match doc.string("close").as_deref() {
        Some("completed") => Some(IssueClose::Completed),
        Some("not_planned") => Some(IssueClose::NotPlanned),
        _ => None,
    };

    Ok(Issue {
        title,
        labels: doc.string_list("labels"),
        close,
        pin: doc.flag("pin"),
        lock: doc.flag("lock"),
        body: doc.body,
    })
}
