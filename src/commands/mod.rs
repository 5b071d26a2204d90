//! Top-level orchestration.
pub mod bootstrap;

use anyhow::Result;

use crate::logging::Logger;
use crate::tasks::{self, Context, Task};

/// Execute steps in order until one fails, then print the summary.
///
/// # Errors
///
/// Returns the first step error; later steps are not run.
pub fn run_tasks_to_completion<'a>(
    tasks: impl IntoIterator<Item = &'a dyn Task>,
    ctx: &Context,
    log: &Logger,
) -> Result<()> {
    let mut result = Ok(());
    for task in tasks {
        if let Err(e) = tasks::execute(task, ctx) {
            result = Err(e.context(format!("{} failed", task.name())));
            break;
        }
    }

    log.print_summary();
    result
}
