//! Dispatch of the task named on the command line.

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::publish::{PublishMode, CANCELLED, CONFIRM_UNSAFE_PUBLISH};
use crate::repository::Repository;
use crate::task::Task;

/// Text of the completion box printed after every dispatch.
pub const COMPLETED: &str = "Completed";

/// Runs `task` at top level against `repository`.
///
/// `None` (an unrecognized task name) dispatches nothing. The completion box
/// is printed once the dispatch succeeds, whatever ran.
///
/// # Errors
///
/// Propagates the task's error. Declining the unsafe-publish warning returns
/// [`Error::Cancelled`] before any publish step runs.
pub async fn dispatch(repository: &Repository, task: Option<Task>) -> Result<()> {
    match task {
        Some(task) => {
            info!(task = %task, "dispatching");
            run_task(repository, task).await?;
        }
        None => debug!("no known task requested, nothing to dispatch"),
    }

    repository.display().completion_box(COMPLETED);
    Ok(())
}

async fn run_task(repository: &Repository, task: Task) -> Result<()> {
    match task {
        Task::Install => repository.install(false).await,
        Task::Outdated => repository.outdated(false).await,
        Task::Build => repository.build(false).await,
        Task::Watch => repository.watch(false).await,
        Task::Fix => repository.fix(false).await,
        Task::Documentation => repository.documentation(false).await,
        Task::Prepare => repository.prepare(false).await,
        Task::Rebuild => repository.rebuild(false, None).await,
        Task::Publish => repository.publish(PublishMode::Safe, false).await,
        Task::PublishUnsafe => {
            if !repository.prompter().confirm(CONFIRM_UNSAFE_PUBLISH).await? {
                return Err(Error::Cancelled(CANCELLED.to_string()));
            }
            repository.publish(PublishMode::Unsafe, false).await
        }
    }
}
