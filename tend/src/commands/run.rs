//! Task dispatch command.

use std::path::PathBuf;
use std::sync::atomic::Ordering;

use anyhow::Result;
use tend_core::{dispatch, Task};
use tracing::debug;

use super::{canonical_root, create_runtime, load_config, open_repository};

/// Runs the task named `task` against the repository at `root`.
///
/// An unknown task name runs nothing; the completion banner is still shown.
pub fn cmd_run(root: PathBuf, config: Option<PathBuf>, task: Option<String>) -> Result<()> {
    let root = canonical_root(&root)?;
    let config = load_config(&root, config)?;
    let task = task.as_deref().and_then(Task::from_str);
    debug!(root = %root.display(), task = ?task, "starting");

    let rt = create_runtime()?;
    rt.block_on(async {
        let (repository, stop) = open_repository(&root, &config).await?;

        if task == Some(Task::Watch) {
            ctrlc::set_handler(move || {
                stop.store(true, Ordering::SeqCst);
            })
            .map_err(|e| anyhow::anyhow!("Failed to set signal handler: {}", e))?;
        }

        dispatch(&repository, task).await?;
        Ok(())
    })
}
