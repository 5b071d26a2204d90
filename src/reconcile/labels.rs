//! Issue label reconciliation.
use anyhow::Result;

use super::{EntityKind, Gateway, SyncOpts, SyncStats, sync};
use crate::config::labels::Label;
use crate::logging::Log;

/// Longest description GitHub accepts for a label.
pub const MAX_DESCRIPTION_LEN: usize = 100;

/// A label as listed by the API.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct ExistingLabel {
    /// Label name.
    pub name: String,
    /// Six hex digits, no `#`.
    pub color: String,
    /// Description; `None` and `""` are equivalent.
    #[serde(default)]
    pub description: Option<String>,
}

/// Strip a leading `#` and lower-case a colour.
///
/// ```
/// assert_eq!(repo_starter_kit::reconcile::labels::normalize_color("#FF00aa"), "ff00aa");
/// ```
#[must_use]
pub fn normalize_color(color: &str) -> String {
    color.strip_prefix('#').unwrap_or(color).to_lowercase()
}

/// [`EntityKind`] for issue labels.
#[derive(Debug)]
pub struct LabelKind;

impl EntityKind for LabelKind {
    type Desired = Label;
    type Existing = ExistingLabel;
    const NOUN: &'static str = "label";
    const PLURAL: &'static str = "labels";

    fn desired_name(desired: &Label) -> &str {
        &desired.name
    }

    fn existing_name(existing: &ExistingLabel) -> &str {
        &existing.name
    }

    fn validate(desired: &Label) -> Result<(), String> {
        if normalize_color(&desired.color).is_empty() {
            return Err(format!(
                "Skipping label '{}' because it lacks a color.",
                desired.name
            ));
        }
        if desired
            .description
            .as_deref()
            .is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_LEN)
        {
            return Err(format!(
                "Skipping label '{}' because its description is too long ({MAX_DESCRIPTION_LEN} max).",
                desired.name
            ));
        }
        Ok(())
    }

    // GitHub resolves label names case-insensitively, so deleting `bug`
    // would remove a label just renamed to `Bug`.
    fn covers(desired: &str, existing: &str) -> bool {
        desired.eq_ignore_ascii_case(existing)
    }

    fn differs(desired: &Label, existing: &ExistingLabel) -> bool {
        normalize_color(&desired.color) != normalize_color(&existing.color)
            || desired.description.as_deref().unwrap_or_default()
                != existing.description.as_deref().unwrap_or_default()
    }
}

/// Sync labels: create conflicts are retried as updates and failed
/// deletions only warn.
///
/// # Errors
///
/// Returns an error on a failed listing, create, or update.
pub fn sync_labels<G>(
    desired: &[Label],
    gateway: &mut G,
    keep_existing: bool,
    dry_run: bool,
    log: &dyn Log,
) -> Result<Option<SyncStats>>
where
    G: Gateway<LabelKind> + ?Sized,
{
    let opts = SyncOpts::new(keep_existing, dry_run)
        .retry_conflict_as_update()
        .best_effort_delete();
    sync::<LabelKind, G>(desired, gateway, opts, log)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::reconcile::test_helpers::{Call, MemoryLog, RecordingGateway};

    fn label(name: &str, color: &str, description: Option<&str>) -> Label {
        Label {
            name: name.to_string(),
            color: color.to_string(),
            description: description.map(String::from),
        }
    }

    fn existing(name: &str, color: &str, description: Option<&str>) -> ExistingLabel {
        ExistingLabel {
            name: name.to_string(),
            color: color.to_string(),
            description: description.map(String::from),
        }
    }

    #[test]
    fn creates_missing_label() {
        let mut gateway = RecordingGateway::<LabelKind>::new(Vec::new());
        let log = MemoryLog::default();
        sync_labels(&[label("bug", "#ff0000", None)], &mut gateway, false, false, &log).unwrap();
        assert_eq!(gateway.mutations(), vec![Call::Create("bug".to_string())]);
        assert_eq!(log.at("info")[0], "Created label: bug");
    }

    #[test]
    fn updates_label_with_different_color() {
        let mut gateway = RecordingGateway::<LabelKind>::new(vec![existing("bug", "00ff00", None)]);
        sync_labels(
            &[label("bug", "#ff0000", None)],
            &mut gateway,
            false,
            false,
            &MemoryLog::default(),
        )
        .unwrap();
        assert_eq!(gateway.mutations(), vec![Call::Update("bug".to_string(), true)]);
    }

    #[test]
    fn color_comparison_ignores_case_and_hash() {
        let desired = label("bug", "#FF0000", Some(""));
        assert!(!LabelKind::differs(&desired, &existing("bug", "ff0000", None)));
        assert!(LabelKind::differs(&desired, &existing("bug", "ff0000", Some("x"))));
    }

    #[test]
    fn colourless_label_is_skipped_without_calls() {
        let mut gateway = RecordingGateway::<LabelKind>::new(Vec::new());
        let log = MemoryLog::default();
        let stats = sync_labels(&[label("bug", "#", None)], &mut gateway, false, false, &log)
            .unwrap()
            .unwrap();
        assert!(gateway.mutations().is_empty());
        assert_eq!(stats.skipped, 1);
        assert_eq!(log.at("warn"), vec!["Skipping label 'bug' because it lacks a color."]);
    }

    #[test]
    fn long_description_is_skipped_without_calls() {
        let long = "x".repeat(101);
        let mut gateway = RecordingGateway::<LabelKind>::new(Vec::new());
        let log = MemoryLog::default();
        sync_labels(
            &[label("bug", "ff0000", Some(&long))],
            &mut gateway,
            false,
            false,
            &log,
        )
        .unwrap();
        assert!(gateway.mutations().is_empty());
        assert_eq!(
            log.at("warn"),
            vec!["Skipping label 'bug' because its description is too long (100 max)."]
        );
    }

    #[test]
    fn description_at_limit_is_accepted() {
        assert!(LabelKind::validate(&label("bug", "ff0000", Some(&"x".repeat(100)))).is_ok());
    }

    #[test]
    fn skipped_label_is_not_deleted() {
        let mut gateway = RecordingGateway::<LabelKind>::new(vec![existing("bug", "ff0000", None)]);
        sync_labels(&[label("bug", "", None)], &mut gateway, false, false, &MemoryLog::default())
            .unwrap();
        assert!(gateway.mutations().is_empty());
    }

    #[test]
    fn case_rename_keeps_the_renamed_label() {
        let mut gateway = RecordingGateway::<LabelKind>::new(vec![existing("bug", "ff0000", None)]);
        gateway.create_errors.push_back(
            crate::github::ApiError::Status {
                method: "POST".to_string(),
                path: "/repos/octo/hello/labels".to_string(),
                status: 422,
                message: "already_exists".to_string(),
            }
            .into(),
        );
        let stats = sync_labels(
            &[label("Bug", "ff0000", None)],
            &mut gateway,
            false,
            false,
            &MemoryLog::default(),
        )
        .unwrap()
        .unwrap();
        assert_eq!(
            gateway.mutations(),
            vec![Call::Create("Bug".to_string()), Call::Update("Bug".to_string(), false)]
        );
        assert_eq!(stats.deleted, 0);
    }

    #[test]
    fn delete_failure_only_warns() {
        let mut gateway = RecordingGateway::<LabelKind>::new(vec![
            existing("old", "cccccc", None),
            existing("older", "cccccc", None),
        ]);
        gateway.delete_errors.push_back(anyhow::anyhow!("HTTP 403"));
        let stats = sync_labels(
            &[label("bug", "ff0000", None)],
            &mut gateway,
            false,
            false,
            &MemoryLog::default(),
        )
        .unwrap()
        .unwrap();
        assert_eq!(stats.deleted, 1);
        assert!(gateway.calls.contains(&Call::Delete("older".to_string())));
    }
}
