//! HTML parsing of GitHub web pages.
use scraper::{ElementRef, Html, Selector};

use crate::config::categories::CategoryFormat;
use crate::error::BrowserError;
use crate::reconcile::categories::ScrapedCategory;

fn selector(css: &str) -> Result<Selector, BrowserError> {
    Selector::parse(css).map_err(|e| BrowserError::Action {
        action: format!("parse selector {css}"),
        reason: e.to_string(),
    })
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Numeric id in an edit link such as `/o/r/discussions/categories/12/edit`.
fn edit_id(href: &str) -> Option<String> {
    let parts: Vec<&str> = href.split('/').collect();
    parts.windows(2).find_map(|pair| match pair {
        [id, rest]
            if rest.starts_with("edit")
                && !id.is_empty()
                && id.bytes().all(|b| b.is_ascii_digit()) =>
        {
            Some((*id).to_string())
        }
        _ => None,
    })
}

/// Read the categories page.
///
/// Each `li[data-view-component=true]` with a non-empty `h2` is one
/// category. A "Restricted" icon in the header marks an announcement
/// category, the text "Answers enabled" a Q&A one, anything else is open.
///
/// # Errors
///
/// Returns [`BrowserError::Action`] if a selector fails to compile.
pub fn parse_category_listing(html: &str) -> Result<Vec<ScrapedCategory>, BrowserError> {
    let document = Html::parse_document(html);
    let items = selector(r#"li[data-view-component="true"]"#)?;
    let header = selector("h2")?;
    let restricted = selector(r#"svg[aria-label="Restricted"]"#)?;
    let link = selector("a")?;

    let mut found = Vec::new();
    for item in document.select(&items) {
        let Some(title) = item.select(&header).next() else {
            continue;
        };
        let name = text_of(title);
        if name.is_empty() {
            continue;
        }

        let format = if title.select(&restricted).next().is_some() {
            CategoryFormat::Announcement
        } else if item.text().any(|chunk| chunk.contains("Answers enabled")) {
            CategoryFormat::Answer
        } else {
            CategoryFormat::Open
        };

        let ui_id = item
            .select(&link)
            .next()
            .and_then(|a| a.value().attr("href"))
            .and_then(edit_id);

        found.push(ScrapedCategory { name, format, ui_id });
    }
    Ok(found)
}

/// `true` when the page shows a "Sign in" button, link, or label.
///
/// # Errors
///
/// Returns [`BrowserError::Action`] if a selector fails to compile.
pub fn has_sign_in(html: &str) -> Result<bool, BrowserError> {
    let document = Html::parse_document(html);
    let candidates = selector("a, button, span, summary")?;
    Ok(document
        .select(&candidates)
        .any(|element| text_of(element) == "Sign in"))
}
