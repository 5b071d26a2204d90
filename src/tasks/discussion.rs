//! Seed discussion step.
use anyhow::{Context as _, Result, anyhow};

use super::{Context, Task, TaskResult};
use crate::browser;
use crate::config::discussion::Discussion;
use crate::github::categories;
use crate::github::discussions;
use crate::github::labels::LabelsApi;

fn planned_actions(discussion: &Discussion) -> Vec<String> {
    let title = &discussion.title;
    let mut actions = vec![format!(
        "Would create discussion '{title}' in category '{}'",
        discussion.category
    )];
    if !discussion.labels.is_empty() {
        actions.push(format!(
            "Would add labels to discussion '{title}': {}",
            discussion.labels.join(", ")
        ));
    }
    if let Some(close) = discussion.close {
        actions.push(format!(
            "Would close discussion '{title}' as {}",
            close.reason()
        ));
    }
    if discussion.lock {
        actions.push(format!("Would lock discussion '{title}'"));
    }
    if discussion.pin {
        actions.push(format!("Would pin discussion '{title}'"));
    }
    actions
}

/// Create the seed discussion, then label, close, lock, and pin it as
/// configured. Pinning goes through the browser.
#[derive(Debug)]
pub struct CreateDiscussion;

impl Task for CreateDiscussion {
    fn name(&self) -> &'static str {
        "Create discussion"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.config.discussion.is_some()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let Some(discussion) = ctx.config.discussion.as_ref() else {
            return Ok(TaskResult::Skipped("no discussion configured".to_string()));
        };
        let title = &discussion.title;

        if ctx.dry_run {
            for action in planned_actions(discussion) {
                ctx.log.dry_run(&action);
            }
            return Ok(TaskResult::DryRun(None));
        }

        ctx.log.info(&format!("Creating discussion '{title}'"));
        let category_id = categories::find_id(&ctx.client, &ctx.repo, &discussion.category)
            .context("Failed to list discussion categories")?
            .ok_or_else(|| anyhow!("Cannot find category \"{}\"", discussion.category))?;

        let created = discussions::create(
            &ctx.client,
            &ctx.repository_id,
            &category_id,
            title,
            &discussion.body,
        )
        .with_context(|| format!("Failed to create discussion '{title}'"))?;

        if !discussion.labels.is_empty() {
            ctx.log.info(&format!("Adding labels to discussion '{title}'"));
            let available = LabelsApi::new(&ctx.client, &ctx.repo).nodes()?;
            let ids = discussions::label_ids(&discussion.labels, &available);
            if ids.len() < discussion.labels.len() {
                ctx.log.warn(&format!(
                    "Some labels of discussion '{title}' do not exist and were not added."
                ));
            }
            if !ids.is_empty() {
                discussions::add_labels(&ctx.client, &created.id, &ids)
                    .with_context(|| format!("Failed to label discussion #{}", created.number))?;
            }
        }
        if let Some(close) = discussion.close {
            ctx.log.info(&format!("Closing discussion '{title}'"));
            discussions::close(&ctx.client, &created.id, close)
                .with_context(|| format!("Failed to close discussion #{}", created.number))?;
        }
        if discussion.lock {
            ctx.log.info(&format!("Locking discussion '{title}'"));
            discussions::lock(&ctx.client, &created.id)
                .with_context(|| format!("Failed to lock discussion #{}", created.number))?;
        }
        if discussion.pin {
            ctx.log.info(&format!("Pinning discussion '{title}'"));
            browser::discussions::pin(ctx.browser()?, created.number)
                .with_context(|| format!("Failed to pin discussion #{}", created.number))?;
        }

        ctx.log.info(&format!(
            "Created discussion '{title}' (#{}).",
            created.number
        ));
        Ok(TaskResult::Ok(Some(format!("#{}", created.number))))
    }
}
