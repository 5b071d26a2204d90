//! Ruleset sync step.
use anyhow::Result;

use super::{Context, Task, TaskResult};
use crate::github::rulesets::RulesetsApi;
use crate::reconcile::rulesets::sync_rulesets;

/// Reconcile the repository's branch rulesets with the configured list.
#[derive(Debug)]
pub struct SyncRulesets;

impl Task for SyncRulesets {
    fn name(&self) -> &'static str {
        "Sync branch rulesets"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.config.rulesets.is_some()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let desired = ctx.config.rulesets.as_deref().unwrap_or_default();
        let mut gateway = RulesetsApi::new(&ctx.client, &ctx.repo);
        let stats =
            sync_rulesets(desired, &mut gateway, ctx.keep.rulesets, ctx.dry_run, &*ctx.log)?;
        Ok(TaskResult::from_sync(stats, ctx.dry_run, "rulesets"))
    }
}
