use std::path::Path;

use async_trait::async_trait;

use tend_core::error::Result;
use tend_core::{Display, Fixer, ShellCommand};

/// Runs each configured fixer command in turn, stopping at the first failure.
pub struct CommandFixer {
    commands: Vec<String>,
}

impl CommandFixer {
    pub fn new(commands: Vec<String>) -> Self {
        Self { commands }
    }
}

#[async_trait]
impl Fixer for CommandFixer {
    async fn fix(&self, root: &Path, display: &Display) -> Result<()> {
        for line in &self.commands {
            display.echo(line);
            ShellCommand::shell("fixer", line.as_str())
                .run(root, display)
                .await?;
        }
        Ok(())
    }
}
