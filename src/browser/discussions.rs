//! Discussion pinning through the web UI.
use super::{BrowserSession, check_script, click_script};
use crate::error::BrowserError;

/// Pin discussion `number` with the green spotlight colour.
///
/// # Errors
///
/// Returns [`BrowserError`] if the pin dialog cannot be found or submitted.
pub fn pin(session: &BrowserSession, number: u64) -> Result<(), BrowserError> {
    session.visit(&format!("/discussions/{number}"))?;
    session.run(
        "open pin dialog",
        &click_script(None, "#dialog-show-discussion-create-spotlight", None),
    )?;
    session.run(
        "choose spotlight colour",
        &check_script("#discussion_spotlight_preconfigured_color_green"),
    )?;
    session.run(
        "pin discussion",
        &click_script(
            None,
            "button.Button--primary[type=submit]",
            Some("Pin discussion"),
        ),
    )?;
    session.settle();
    Ok(())
}
