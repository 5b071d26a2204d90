//! Discussion category editing through the web UI.
use super::{BrowserSession, check_script, click_script, fill_script};
use crate::config::categories::{Category, CategoryFormat};
use crate::error::BrowserError;
use crate::reconcile::categories::{ExistingCategory, ScrapedCategory};

const NAME_INPUT: &str = r"#category\[name\]";
const DESCRIPTION_INPUT: &str = r"#category\[description\]";
const EMOJI_INPUT: &str = "input[type=hidden][name*=emoji]";
const SUBMIT: &str = "button.Button--primary[type=submit]";

/// Radio button selecting `format`. The edit form suffixes ids with the
/// category's UI id.
fn format_radio(format: CategoryFormat, ui_id: Option<&str>) -> String {
    let base = match format {
        CategoryFormat::Announcement => "#supports_announcements_true_discussion_category",
        CategoryFormat::Answer => "#supports_mark_as_answer_true_discussion_category",
        CategoryFormat::Poll => "#supports_polls_true_discussion_category",
        CategoryFormat::Open => "#supports_mark_as_answer_false_discussion_category",
    };
    ui_id.map_or_else(|| base.to_string(), |id| format!("{base}_{id}"))
}

fn fill_form(session: &BrowserSession, category: &Category, ui_id: Option<&str>) -> Result<(), BrowserError> {
    session.run("fill category name", &fill_script(NAME_INPUT, &category.name))?;
    session.run(
        "fill category description",
        &fill_script(DESCRIPTION_INPUT, &category.description),
    )?;
    if !category.emoji.is_empty() {
        session.run("set category emoji", &fill_script(EMOJI_INPUT, &category.emoji))?;
    }
    session.run(
        "select category format",
        &check_script(&format_radio(category.format, ui_id)),
    )?;
    session.run("submit category form", &click_script(None, SUBMIT, None))?;
    session.settle();
    Ok(())
}

/// Scrape the categories page.
///
/// # Errors
///
/// Returns [`BrowserError`] if the page cannot be loaded or read.
pub fn scrape(session: &BrowserSession) -> Result<Vec<ScrapedCategory>, BrowserError> {
    session.visit("/discussions/categories")?;
    super::scrape::parse_category_listing(&session.html()?)
}

/// Create `category` through the "new category" form.
///
/// # Errors
///
/// Returns [`BrowserError`] if the form cannot be found or submitted.
pub fn create(session: &BrowserSession, category: &Category) -> Result<(), BrowserError> {
    session.visit("/discussions/categories/new")?;
    fill_form(session, category, None)
}

/// Update the category with UI id `ui_id` to match `category`.
///
/// # Errors
///
/// Returns [`BrowserError`] if the form cannot be found or submitted.
pub fn update(session: &BrowserSession, category: &Category, ui_id: &str) -> Result<(), BrowserError> {
    session.visit(&format!("/discussions/categories/{ui_id}/edit"))?;
    fill_form(session, category, Some(ui_id))
}

/// Delete `existing` from the categories page.
///
/// # Errors
///
/// Returns [`BrowserError`] if the category has no UI id or its delete
/// controls cannot be found.
pub fn delete(session: &BrowserSession, existing: &ExistingCategory) -> Result<(), BrowserError> {
    let Some(ui_id) = existing.ui_id.as_deref() else {
        return Err(BrowserError::Action {
            action: format!("delete category '{}'", existing.name),
            reason: "category id not found on the categories page".to_string(),
        });
    };
    session.visit("/discussions/categories")?;
    let form = format!(
        r#"form[action="/{}/discussions/categories/{ui_id}"]"#,
        session.repo()
    );
    session.run(
        "open category delete dialog",
        &click_script(Some(&form), "button.Button--link", None),
    )?;
    session.run(
        "confirm category deletion",
        &click_script(Some(&form), "button.btn-danger", None),
    )?;
    session.settle();
    Ok(())
}
