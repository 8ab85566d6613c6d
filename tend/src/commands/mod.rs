//! Command implementations for the CLI.

mod info;
mod run;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tend_core::options::CONFIG_FILE;
use tend_core::{Display, ManagerConfig, OrchestrationContext, Repository};

use crate::reporter::TerminalReporter;

pub use info::cmd_info;
pub use run::cmd_run;

/// Where the configuration lives: `--config`, else `tend.toml` in the root.
fn config_path(root: &Path, config: Option<PathBuf>) -> PathBuf {
    config.unwrap_or_else(|| root.join(CONFIG_FILE))
}

fn load_config(root: &Path, config: Option<PathBuf>) -> Result<ManagerConfig> {
    let path = config_path(root, config);
    if !path.is_file() {
        anyhow::bail!("No configuration found at {}", path.display());
    }
    ManagerConfig::load(&path).with_context(|| format!("Invalid configuration in {}", path.display()))
}

fn create_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to create tokio runtime: {}", e))
}

/// Opens the repository at `root` with the command-backed toolchain.
///
/// Returns the flag that stops watch mode along with it.
async fn open_repository(
    root: &Path,
    config: &ManagerConfig,
) -> Result<(Repository, Arc<std::sync::atomic::AtomicBool>)> {
    let context = OrchestrationContext::from_config(config, root)?;
    let (toolchain, stop) = tend_adapters::toolchain(&config.toolchain, root);
    let display: Display = Arc::new(TerminalReporter);
    let repository = Repository::open(context, toolchain, display).await?;
    Ok((repository, stop))
}

fn canonical_root(root: &Path) -> Result<PathBuf> {
    std::fs::canonicalize(root)
        .with_context(|| format!("Repository root {} is not accessible", root.display()))
}
