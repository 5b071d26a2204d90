//! Discussion category reconciliation.
//!
//! The API lists categories without their format or the numeric id the web
//! UI needs, so the listing is merged with a scrape of the categories page
//! before planning.
use anyhow::Result;

use super::{EntityKind, Gateway, SyncOpts, SyncStats, sync};
use crate::config::categories::{Category, CategoryFormat};
use crate::logging::Log;

/// A category as returned by the GraphQL API.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct ApiCategory {
    /// GraphQL node id.
    pub id: String,
    /// Category name.
    pub name: String,
    /// Description.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    /// Emoji shortcode.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub emoji: String,
}

fn null_as_empty<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    use serde::Deserialize as _;
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// One item scraped from the categories page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapedCategory {
    /// Header text, trimmed.
    pub name: String,
    /// Format inferred from the item's markers.
    pub format: CategoryFormat,
    /// Numeric id from the edit link, when present.
    pub ui_id: Option<String>,
}

/// An existing category: API fields plus scraped format and UI id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingCategory {
    /// GraphQL node id.
    pub node_id: String,
    /// Category name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Emoji shortcode.
    pub emoji: String,
    /// Format, if the category was found on the page.
    pub format: Option<CategoryFormat>,
    /// Numeric id used by the web UI, if found on the page.
    pub ui_id: Option<String>,
}

/// Attach scraped format and id to each API category by exact name.
///
/// Scraped items with no API counterpart are ignored; API categories with no
/// scraped counterpart keep `format` and `ui_id` unset.
#[must_use]
pub fn merge_scraped(api: Vec<ApiCategory>, scraped: &[ScrapedCategory]) -> Vec<ExistingCategory> {
    api.into_iter()
        .map(|category| {
            let found = scraped.iter().find(|item| item.name == category.name);
            ExistingCategory {
                node_id: category.id,
                name: category.name,
                description: category.description,
                emoji: category.emoji,
                format: found.map(|item| item.format),
                ui_id: found.and_then(|item| item.ui_id.clone()),
            }
        })
        .collect()
}

/// [`EntityKind`] for discussion categories.
#[derive(Debug)]
pub struct CategoryKind;

impl EntityKind for CategoryKind {
    type Desired = Category;
    type Existing = ExistingCategory;
    const NOUN: &'static str = "category";
    const PLURAL: &'static str = "categories";

    fn desired_name(desired: &Category) -> &str {
        &desired.name
    }

    fn existing_name(existing: &ExistingCategory) -> &str {
        &existing.name
    }

    fn differs(desired: &Category, existing: &ExistingCategory) -> bool {
        desired.description != existing.description
            || desired.emoji != existing.emoji
            || Some(desired.format) != existing.format
    }

    fn unaddressable(existing: &ExistingCategory) -> Option<String> {
        existing.ui_id.is_none().then(|| {
            format!(
                "Skipping category '{}' because it was not found on the categories page.",
                existing.name
            )
        })
    }
}

/// Sync categories; every failure aborts.
///
/// # Errors
///
/// Returns the first failed listing, scrape, create, update, or delete.
pub fn sync_categories<G>(
    desired: &[Category],
    gateway: &mut G,
    keep_existing: bool,
    dry_run: bool,
    log: &dyn Log,
) -> Result<Option<SyncStats>>
where
    G: Gateway<CategoryKind> + ?Sized,
{
    sync::<CategoryKind, G>(desired, gateway, SyncOpts::new(keep_existing, dry_run), log)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::reconcile::test_helpers::{Call, MemoryLog, RecordingGateway};

    fn api(name: &str, description: &str, emoji: &str) -> ApiCategory {
        ApiCategory {
            id: format!("DIC_{name}"),
            name: name.to_string(),
            description: description.to_string(),
            emoji: emoji.to_string(),
        }
    }

    fn scraped(name: &str, format: CategoryFormat, id: Option<&str>) -> ScrapedCategory {
        ScrapedCategory {
            name: name.to_string(),
            format,
            ui_id: id.map(String::from),
        }
    }

    fn desired(name: &str, format: CategoryFormat) -> Category {
        Category {
            name: name.to_string(),
            description: "d".to_string(),
            emoji: ":e:".to_string(),
            format,
        }
    }

    #[test]
    fn merge_matches_by_exact_name() {
        let merged = merge_scraped(
            vec![api("Q&A", "Ask", ":pray:"), api("Ideas", "", "")],
            &[
                scraped("Q&A", CategoryFormat::Answer, Some("7")),
                scraped("ideas", CategoryFormat::Open, Some("8")),
                scraped("Ghost", CategoryFormat::Poll, Some("9")),
            ],
        );
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].format, Some(CategoryFormat::Answer));
        assert_eq!(merged[0].ui_id.as_deref(), Some("7"));
        assert_eq!(merged[0].node_id, "DIC_Q&A");
        assert_eq!(merged[1].format, None);
        assert_eq!(merged[1].ui_id, None);
    }

    #[test]
    fn format_change_triggers_update() {
        let existing = merge_scraped(
            vec![api("General", "d", ":e:")],
            &[scraped("General", CategoryFormat::Open, Some("1"))],
        );
        let mut gateway = RecordingGateway::<CategoryKind>::new(existing);
        sync_categories(
            &[desired("General", CategoryFormat::Answer)],
            &mut gateway,
            false,
            false,
            &MemoryLog::default(),
        )
        .unwrap();
        assert_eq!(gateway.mutations(), vec![Call::Update("General".to_string(), true)]);
    }

    #[test]
    fn matching_category_is_unchanged() {
        let existing = merge_scraped(
            vec![api("General", "d", ":e:")],
            &[scraped("General", CategoryFormat::Open, Some("1"))],
        );
        let mut gateway = RecordingGateway::<CategoryKind>::new(existing);
        let stats = sync_categories(
            &[desired("General", CategoryFormat::Open)],
            &mut gateway,
            false,
            false,
            &MemoryLog::default(),
        )
        .unwrap()
        .unwrap();
        assert!(gateway.mutations().is_empty());
        assert_eq!(stats.unchanged, 1);
    }

    #[test]
    fn unscraped_category_is_left_alone() {
        let existing = merge_scraped(vec![api("Hidden", "", ""), api("Old", "", "")], &[]);
        let mut gateway = RecordingGateway::<CategoryKind>::new(existing);
        let log = MemoryLog::default();
        let stats = sync_categories(
            &[desired("Hidden", CategoryFormat::Open)],
            &mut gateway,
            false,
            false,
            &log,
        )
        .unwrap()
        .unwrap();
        assert!(gateway.mutations().is_empty());
        assert_eq!(stats.skipped, 2);
        assert_eq!(
            log.at("warn")[0],
            "Skipping category 'Hidden' because it was not found on the categories page."
        );
    }

    #[test]
    fn delete_failure_aborts() {
        let existing = merge_scraped(
            vec![api("Old", "", ""), api("Older", "", "")],
            &[
                scraped("Old", CategoryFormat::Open, Some("1")),
                scraped("Older", CategoryFormat::Open, Some("2")),
            ],
        );
        let mut gateway = RecordingGateway::<CategoryKind>::new(existing);
        gateway.delete_errors.push_back(anyhow::anyhow!("button not found"));
        let err = sync_categories(
            &[desired("New", CategoryFormat::Open)],
            &mut gateway,
            false,
            false,
            &MemoryLog::default(),
        )
        .unwrap_err();
        assert_eq!(format!("{err:#}"), "Failed to delete category 'Old': button not found");
        assert!(!gateway.calls.contains(&Call::Delete("Older".to_string())));
    }
}
