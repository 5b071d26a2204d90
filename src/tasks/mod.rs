//! Named bootstrap steps run in a fixed order against one repository.
pub mod categories;
mod context;
pub mod discussion;
pub mod issue;
pub mod labels;
pub mod rulesets;

pub use context::{Context, KeepExisting};

use anyhow::Result;

use crate::config::ContentKind;
use crate::logging::TaskStatus;
use crate::reconcile::SyncStats;

/// Result of a step's execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskResult {
    /// Step completed, with an optional detail for the summary.
    Ok(Option<String>),
    /// Step had nothing to do.
    Skipped(String),
    /// Step ran in dry-run mode, with an optional detail for the summary.
    DryRun(Option<String>),
}

impl TaskResult {
    /// Map a reconciliation outcome; `None` means nothing was configured.
    ///
    /// ```
    /// use repo_starter_kit::reconcile::SyncStats;
    /// use repo_starter_kit::tasks::TaskResult;
    ///
    /// let stats = SyncStats { created: 1, ..SyncStats::default() };
    /// assert_eq!(
    ///     TaskResult::from_sync(Some(stats), false, "labels"),
    ///     TaskResult::Ok(Some("1 created, 0 updated, 0 deleted, 0 unchanged".to_string()))
    /// );
    /// assert_eq!(
    ///     TaskResult::from_sync(None, false, "labels"),
    ///     TaskResult::Skipped("no labels defined".to_string())
    /// );
    /// ```
    #[must_use]
    pub fn from_sync(stats: Option<SyncStats>, dry_run: bool, plural: &str) -> Self {
        match stats {
            None => Self::Skipped(format!("no {plural} defined")),
            Some(stats) if dry_run => Self::DryRun(Some(stats.summary(true))),
            Some(stats) => Self::Ok(Some(stats.summary(false))),
        }
    }
}

/// A named, executable step.
pub trait Task {
    /// Human-readable step name.
    fn name(&self) -> &str;

    /// Whether the configuration asks for this step.
    fn should_run(&self, ctx: &Context) -> bool;

    /// Execute the step.
    ///
    /// # Errors
    ///
    /// Returns an error if any remote call the step makes fails.
    fn run(&self, ctx: &Context) -> Result<TaskResult>;
}

/// Every step of a bootstrap run, in execution order.
///
/// Entity syncs come first so the seed content can use the labels and
/// categories they create; seed content follows `order`.
#[must_use]
pub fn all_bootstrap_tasks(order: &[ContentKind]) -> Vec<Box<dyn Task>> {
    let mut tasks: Vec<Box<dyn Task>> = vec![
        Box::new(labels::SyncLabels),
        Box::new(categories::SyncCategories),
        Box::new(rulesets::SyncRulesets),
    ];
    for kind in order {
        match kind {
            ContentKind::Issue => tasks.push(Box::new(issue::CreateIssue)),
            ContentKind::Discussion => tasks.push(Box::new(discussion::CreateDiscussion)),
        }
    }
    tasks
}

/// Execute a step, recording the result in the logger.
///
/// # Errors
///
/// Returns the step's error after recording it as failed; the run stops at
/// the first failure.
pub fn execute(task: &dyn Task, ctx: &Context) -> Result<()> {
    if !task.should_run(ctx) {
        ctx.log
            .debug(&format!("skipping step: {} (not configured)", task.name()));
        ctx.log
            .record_task(task.name(), TaskStatus::NotApplicable, None);
        return Ok(());
    }

    ctx.log.stage(task.name());

    match task.run(ctx) {
        Ok(TaskResult::Ok(detail)) => {
            ctx.log
                .record_task(task.name(), TaskStatus::Ok, detail.as_deref());
            Ok(())
        }
        Ok(TaskResult::Skipped(reason)) => {
            ctx.log.info(&format!("skipped: {reason}"));
            ctx.log
                .record_task(task.name(), TaskStatus::Skipped, Some(&reason));
            Ok(())
        }
        Ok(TaskResult::DryRun(detail)) => {
            ctx.log
                .record_task(task.name(), TaskStatus::DryRun, detail.as_deref());
            Ok(())
        }
        Err(e) => {
            ctx.log
                .record_task(task.name(), TaskStatus::Failed, Some(&format!("{e:#}")));
            Err(e)
        }
    }
}

/// Shared helpers for step unit tests.
#[cfg(test)]
pub mod test_helpers {
    use std::sync::Arc;

    use crate::config::{Config, DEFAULT_ORDER};
    use crate::github::{GitHubClient, RepoRef};
    use crate::logging::{Log, Logger};

    use super::Context;

    /// A [`Config`] with nothing configured.
    #[must_use]
    pub fn empty_config() -> Config {
        Config {
            order: DEFAULT_ORDER.to_vec(),
            ..Config::default()
        }
    }

    /// A [`Context`] on `octo/hello` whose client points at an unroutable
    /// address, so any accidental request fails fast.
    #[must_use]
    pub fn make_context(config: Config) -> Context {
        Context::new(
            Arc::new(config),
            Arc::new(Logger::new("test")),
            Arc::new(GitHubClient::with_api_url("test-token", "http://127.0.0.1:9")),
            RepoRef {
                owner: "octo".to_string(),
                name: "hello".to_string(),
            },
            "R_kgDOTest".to_string(),
            "http://127.0.0.1:9".to_string(),
        )
    }

    /// A [`Context`] that also returns its [`Logger`] so tests can inspect
    /// recorded step state.
    #[must_use]
    pub fn make_static_context(config: Config) -> (Context, Arc<Logger>) {
        let log = Arc::new(Logger::new("test"));
        let ctx = make_context(config).with_log(Arc::clone(&log) as Arc<dyn Log>);
        (ctx, log)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use test_helpers::{empty_config, make_static_context};

    /// A mock step for testing `execute()`.
    struct MockTask {
        name: &'static str,
        should_run: bool,
        result: Result<TaskResult, String>,
    }

    impl Task for MockTask {
        fn name(&self) -> &str {
            self.name
        }
        fn should_run(&self, _ctx: &Context) -> bool {
            self.should_run
        }
        fn run(&self, _ctx: &Context) -> Result<TaskResult> {
            self.result.clone().map_err(|s| anyhow::anyhow!("{s}"))
        }
    }

    fn statuses(log: &crate::logging::Logger) -> Vec<(String, TaskStatus, Option<String>)> {
        log.task_entries()
            .into_iter()
            .map(|entry| (entry.name, entry.status, entry.message))
            .collect()
    }

    #[test]
    fn execute_skips_unconfigured_task() {
        let (ctx, log) = make_static_context(empty_config());
        let task = MockTask {
            name: "test-task",
            should_run: false,
            result: Err("must not run".to_string()),
        };

        execute(&task, &ctx).unwrap();
        assert_eq!(
            statuses(&log),
            vec![("test-task".to_string(), TaskStatus::NotApplicable, None)]
        );
    }

    #[test]
    fn execute_records_ok_task_with_detail() {
        let (ctx, log) = make_static_context(empty_config());
        let task = MockTask {
            name: "ok-task",
            should_run: true,
            result: Ok(TaskResult::Ok(Some("1 created".to_string()))),
        };

        execute(&task, &ctx).unwrap();
        assert_eq!(log.failure_count(), 0);
        assert_eq!(statuses(&log)[0].2.as_deref(), Some("1 created"));
    }

    #[test]
    fn execute_records_and_returns_failure() {
        let (ctx, log) = make_static_context(empty_config());
        let task = MockTask {
            name: "fail-task",
            should_run: true,
            result: Err("kaboom".to_string()),
        };

        let err = execute(&task, &ctx).unwrap_err();
        assert_eq!(err.to_string(), "kaboom");
        assert_eq!(log.failure_count(), 1);
    }

    #[test]
    fn execute_records_skipped_task() {
        let (ctx, log) = make_static_context(empty_config());
        let task = MockTask {
            name: "skip-task",
            should_run: true,
            result: Ok(TaskResult::Skipped("not needed".to_string())),
        };

        execute(&task, &ctx).unwrap();
        assert_eq!(statuses(&log)[0].1, TaskStatus::Skipped);
    }

    #[test]
    fn execute_records_dry_run_task() {
        let (ctx, log) = make_static_context(empty_config());
        let task = MockTask {
            name: "dry-task",
            should_run: true,
            result: Ok(TaskResult::DryRun(None)),
        };

        execute(&task, &ctx).unwrap();
        assert_eq!(statuses(&log)[0].1, TaskStatus::DryRun);
    }

    #[test]
    fn from_sync_dry_run_uses_planned_wording() {
        let stats = SyncStats {
            deleted: 2,
            ..SyncStats::default()
        };
        assert_eq!(
            TaskResult::from_sync(Some(stats), true, "rulesets"),
            TaskResult::DryRun(Some("0 to create, 0 to update, 2 to delete, 0 unchanged".to_string()))
        );
    }

    #[test]
    fn seed_content_follows_order() {
        let names = |order: &[ContentKind]| {
            all_bootstrap_tasks(order)
                .iter()
                .map(|task| task.name().to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(
            names(&[ContentKind::Discussion, ContentKind::Issue]),
            vec![
                "Sync labels",
                "Sync discussion categories",
                "Sync branch rulesets",
                "Create discussion",
                "Create issue",
            ]
        );
        assert_eq!(names(&[]).len(), 3);
    }
}
