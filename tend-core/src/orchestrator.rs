//! Banner and hook sequencing around a task body.

use std::future::Future;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::Result;
use crate::hooks::TaskHooks;
use crate::reporter::Display;
use crate::task::Task;

/// Runs tasks between their banners and hooks.
///
/// The orchestrator knows nothing about what a task does. Short-circuits
/// such as "no distribution configured" belong to the body.
#[derive(Clone)]
pub struct TaskOrchestrator {
    display: Display,
    root: PathBuf,
}

impl TaskOrchestrator {
    pub fn new(display: Display, root: impl AsRef<Path>) -> Self {
        Self {
            display,
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    /// Runs `body` for `task`.
    ///
    /// A top-level run (`grouped == false`) opens with `Manager: <banner>`
    /// and prints no completion line; a grouped run opens with
    /// `<name>: <banner>` and closes with `<name>: ✓ Completed`.
    ///
    /// # Errors
    ///
    /// Any error from the pre-hook, the body or the post-hook is returned
    /// as is. Nothing after the failing step runs.
    pub async fn run<F>(
        &self,
        task: Task,
        hooks: Option<&TaskHooks>,
        grouped: bool,
        body: F,
    ) -> Result<()>
    where
        F: Future<Output = Result<()>>,
    {
        let name = task.name();
        info!(task = %task, grouped, "running task");

        if grouped {
            self.display
                .info_box(&format!("{}: {}", name, task.banner()));
        } else {
            self.display
                .title_box(&format!("Manager: {}", task.banner()));
        }

        match hooks.and_then(|h| h.pre_run.as_ref()) {
            Some(hook) => {
                self.display.info_box(&format!("{}: Custom pre-runner", name));
                hook.invoke(task, &self.display, &self.root).await?;
                self.display.info_box(&format!("{}: Generic runner", name));
            }
            None => self.display.echo(&format!("{}: No custom pre-runner", name)),
        }

        body.await?;

        match hooks.and_then(|h| h.post_run.as_ref()) {
            Some(hook) => {
                self.display.info_box(&format!("{}: Custom post-runner", name));
                hook.invoke(task, &self.display, &self.root).await?;
            }
            None => self.display.echo(&format!("{}: No custom post-runner", name)),
        }

        if grouped {
            self.display.info_box(&format!("{}: ✓ Completed", name));
        }

        debug!(task = %task, "task finished");
        Ok(())
    }
}
