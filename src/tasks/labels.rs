//! Label sync step.
use anyhow::Result;

use super::{Context, Task, TaskResult};
use crate::github::labels::LabelsApi;
use crate::reconcile::labels::sync_labels;

/// Reconcile the repository's labels with the configured list.
#[derive(Debug)]
pub struct SyncLabels;

impl Task for SyncLabels {
    fn name(&self) -> &'static str {
        "Sync labels"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.config.labels.is_some()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let desired = ctx.config.labels.as_deref().unwrap_or_default();
        let mut gateway = LabelsApi::new(&ctx.client, &ctx.repo);
        let stats = sync_labels(desired, &mut gateway, ctx.keep.labels, ctx.dry_run, &*ctx.log)?;
        Ok(TaskResult::from_sync(stats, ctx.dry_run, "labels"))
    }
}
