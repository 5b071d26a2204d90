//! Seed discussion loading.
use std::path::Path;

use super::front_matter;
use crate::error::ConfigError;

/// How a seed discussion is closed right after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscussionClose {
    /// Closed as resolved.
    Resolved,
    /// Closed as outdated.
    Outdated,
}

impl DiscussionClose {
    /// GraphQL `DiscussionCloseReason` value.
    #[must_use]
    pub const fn reason(self) -> &'static str {
        match self {
            Self::Resolved => "RESOLVED",
            Self::Outdated => "OUTDATED",
        }
    }
}

/// A seed discussion created once on the target repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discussion {
    /// Discussion title.
    pub title: String,
    /// Name of the category to post in.
    pub category: String,
    /// Markdown body.
    pub body: String,
    /// Label names added after creation.
    pub labels: Vec<String>,
    /// Close the discussion after creating it.
    pub close: Option<DiscussionClose>,
    /// Pin the discussion (browser only).
    pub pin: bool,
    /// Lock the conversation.
    pub lock: bool,
}

/// Load a discussion from a Markdown file with front matter
/// (`title`, `category`, `labels`, `close`, `pin`, `lock`).
///
/// # Errors
///
/// Returns an error if the file cannot be read, the front matter is invalid,
/// or `title` or `category` is missing.
pub fn load(path: &Path) -> Result<Discussion, ConfigError> {
    let doc = front_matter::load(path)?;
    let missing = |field| ConfigError::MissingField {
        field,
        path: path.to_path_buf(),
    };
    let title = doc.string("title").ok_or_else(|| missing("title"))?;
    let category = doc.string("category").ok_or_else(|| missing("category"))?;
    let close = match doc.string("close").as_deref() {
        Some("resolved") => Some(DiscussionClose::Resolved),
        Some("outdated") => Some(DiscussionClose::Outdated),
        _ => None,
    };

    Ok(Discussion {
        title,
        category,
        labels: doc.string_list("labels"),
        close,
        pin: doc.flag("pin"),
        lock: doc.flag("lock"),
        body: doc.body,
    })
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn write(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("discussion.md");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn load_reads_all_fields() {
        let (_dir, path) = write(
            "---\ntitle: Welcome\ncategory: Announcements\nlabels: [intro]\nclose: outdated\npin: true\nlock: true\n---\nHi all\n",
        );
        let discussion = load(&path).unwrap();
        assert_eq!(discussion.title, "Welcome");
        assert_eq!(discussion.category, "Announcements");
        assert_eq!(discussion.labels, vec!["intro"]);
        assert_eq!(discussion.close, Some(DiscussionClose::Outdated));
        assert!(discussion.pin && discussion.lock);
        assert_eq!(discussion.body, "Hi all\n");
    }

    #[test]
    fn load_requires_category() {
        let (_dir, path) = write("---\ntitle: Welcome\ncategory: '  '\n---\n");
        assert_eq!(
            load(&path).unwrap_err().to_string(),
            format!("Missing category in {}", path.display())
        );
    }

    #[test]
    fn load_requires_title() {
        let (_dir, path) = write("---\ncategory: General\n---\n");
        assert!(matches!(
            load(&path).unwrap_err(),
            ConfigError::MissingField { field: "title", .. }
        ));
    }
}
