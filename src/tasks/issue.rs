//! Seed issue step.
use anyhow::{Context as _, Result};

use super::{Context, Task, TaskResult};
use crate::config::issue::Issue;
use crate::github::issues;

/// Follow-up actions for `issue`, as logged in dry-run mode.
fn planned_actions(issue: &Issue) -> Vec<String> {
    let mut actions = vec![format!("Would create issue '{}'", issue.title)];
    if let Some(close) = issue.close {
        actions.push(format!(
            "Would close issue '{}' as {}",
            issue.title,
            close.state_reason()
        ));
    }
    if issue.pin {
        actions.push(format!("Would pin issue '{}'", issue.title));
    }
    if issue.lock {
        actions.push(format!("Would lock issue '{}'", issue.title));
    }
    actions
}

/// Create the seed issue, then close, pin, and lock it as configured.
#[derive(Debug)]
pub struct CreateIssue;

impl Task for CreateIssue {
    fn name(&self) -> &'static str {
        "Create issue"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.config.issue.is_some()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let Some(issue) = ctx.config.issue.as_ref() else {
            return Ok(TaskResult::Skipped("no issue configured".to_string()));
        };

        if ctx.dry_run {
            for action in planned_actions(issue) {
                ctx.log.dry_run(&action);
            }
            return Ok(TaskResult::DryRun(None));
        }

        let created = issues::create(&ctx.client, &ctx.repo, issue)
            .with_context(|| format!("Failed to create issue '{}'", issue.title))?;
        ctx.log
            .debug(&format!("issue #{} has node id {}", created.number, created.node_id));

        if let Some(close) = issue.close {
            ctx.log.info(&format!("Closing issue '{}'", issue.title));
            issues::close(&ctx.client, &created.node_id, close)
                .with_context(|| format!("Failed to close issue #{}", created.number))?;
        }
        if issue.pin {
            ctx.log.info(&format!("Pinning issue '{}'", issue.title));
            issues::pin(&ctx.client, &created.node_id)
                .with_context(|| format!("Failed to pin issue #{}", created.number))?;
        }
        if issue.lock {
            ctx.log.info(&format!("Locking issue '{}'", issue.title));
            issues::lock(&ctx.client, &created.node_id)
                .with_context(|| format!("Failed to lock issue #{}", created.number))?;
        }

        ctx.log.info(&format!(
            "Created issue '{}' (#{}).",
            issue.title, created.number
        ));
        Ok(TaskResult::Ok(Some(format!("#{}", created.number))))
    }
}
