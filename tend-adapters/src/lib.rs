//! Command-backed collaborators for `tend-core`.

pub mod bundler;
pub mod documenter;
pub mod fixer;
pub mod lerna;
pub mod npm;
pub mod prompt;

pub use bundler::CommandBundler;
pub use documenter::CommandDocumenter;
pub use fixer::CommandFixer;
pub use lerna::LernaWorkspace;
pub use npm::NpmRegistry;
pub use prompt::TerminalPrompter;

use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tend_core::{Toolchain, ToolchainConfig};

/// The default collaborators configured from `[toolchain]`.
///
/// Returns the toolchain and the flag that stops the bundler's watch mode.
pub fn toolchain(config: &ToolchainConfig, root: &Path) -> (Toolchain, Arc<AtomicBool>) {
    let bundler = CommandBundler::new(config.bundler.clone(), root);
    let stop = bundler.stop_handle();
    let theme = config.theme.as_ref().map(|theme| root.join(theme));

    let toolchain = Toolchain {
        registry: Arc::new(NpmRegistry::new(config.test.clone())),
        bundler: Arc::new(bundler),
        documenter: Arc::new(CommandDocumenter::new(config.documenter.clone(), theme)),
        fixer: Arc::new(CommandFixer::new(config.fixer.clone())),
        workspace: Arc::new(LernaWorkspace::new()),
        prompter: Arc::new(TerminalPrompter::new()),
    };
    (toolchain, stop)
}
