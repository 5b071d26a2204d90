//! Discussion category step.
use anyhow::{Result, bail};

use super::{Context, Task, TaskResult};
use crate::browser;
use crate::config::categories::Category;
use crate::github;
use crate::reconcile::Gateway;
use crate::reconcile::categories::{CategoryKind, ExistingCategory, merge_scraped, sync_categories};

/// Lists categories through GraphQL plus a page scrape, and edits them
/// through the web UI.
#[derive(Debug)]
pub struct CategoriesGateway<'a> {
    ctx: &'a Context,
}

impl<'a> CategoriesGateway<'a> {
    /// Gateway bound to `ctx`'s repository and browser session.
    #[must_use]
    pub const fn new(ctx: &'a Context) -> Self {
        Self { ctx }
    }
}

impl Gateway<CategoryKind> for CategoriesGateway<'_> {
    fn fetch_existing(&mut self) -> Result<Vec<ExistingCategory>> {
        let api = github::categories::list(&self.ctx.client, &self.ctx.repo)?;
        let scraped = browser::categories::scrape(self.ctx.browser()?)?;
        self.ctx.log.debug(&format!(
            "{} categories from the API, {} on the categories page",
            api.len(),
            scraped.len()
        ));
        Ok(merge_scraped(api, &scraped))
    }

    fn create(&mut self, desired: &Category) -> Result<()> {
        Ok(browser::categories::create(self.ctx.browser()?, desired)?)
    }

    fn update(&mut self, desired: &Category, existing: Option<&ExistingCategory>) -> Result<()> {
        let Some(ui_id) = existing.and_then(|e| e.ui_id.as_deref()) else {
            bail!("category '{}' has no known page id", desired.name);
        };
        Ok(browser::categories::update(self.ctx.browser()?, desired, ui_id)?)
    }

    fn delete(&mut self, existing: &ExistingCategory) -> Result<()> {
        Ok(browser::categories::delete(self.ctx.browser()?, existing)?)
    }
}

/// Reconcile the repository's discussion categories with the configured list.
#[derive(Debug)]
pub struct SyncCategories;

impl Task for SyncCategories {
    fn name(&self) -> &'static str {
        "Sync discussion categories"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.config.categories.is_some()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let desired = ctx.config.categories.as_deref().unwrap_or_default();
        let mut gateway = CategoriesGateway::new(ctx);
        let stats = sync_categories(
            desired,
            &mut gateway,
            ctx.keep.categories,
            ctx.dry_run,
            &*ctx.log,
        )?;
        Ok(TaskResult::from_sync(stats, ctx.dry_run, "categories"))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::categories::CategoryFormat;
    use crate::tasks::test_helpers::{empty_config, make_context};

    #[test]
    fn empty_list_never_opens_the_browser() {
        let mut config = empty_config();
        config.categories = Some(Vec::new());
        let ctx = make_context(config);
        assert!(SyncCategories.should_run(&ctx));
        assert_eq!(
            SyncCategories.run(&ctx).unwrap(),
            TaskResult::Skipped("no categories defined".to_string())
        );
        assert!(format!("{ctx:?}").contains("browser_open: false"));
    }

    #[test]
    fn update_without_page_id_fails_before_browsing() {
        let ctx = make_context(empty_config());
        let mut gateway = CategoriesGateway::new(&ctx);
        let desired = Category {
            name: "Ideas".to_string(),
            description: String::new(),
            emoji: String::new(),
            format: CategoryFormat::Open,
        };
        let err = gateway.update(&desired, None).unwrap_err();
        assert_eq!(err.to_string(), "category 'Ideas' has no known page id");
    }
}
