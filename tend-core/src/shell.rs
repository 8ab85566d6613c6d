//! Running external commands with their output relayed to the display.

use std::path::Path;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::debug;

use crate::error::{Error, Result};
use crate::reporter::Display;

/// An external command invocation.
///
/// Commands either run through `sh -c` (lines declared in configuration) or
/// as a program with explicit arguments (tools the adapters drive).
#[derive(Debug, Clone)]
pub struct ShellCommand {
    tool: String,
    program: String,
    args: Vec<String>,
    envs: Vec<(String, String)>,
}

/// Captured result of a command run with [`ShellCommand::output`].
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl ShellCommand {
    /// A command line interpreted by `sh -c`.
    pub fn shell(tool: impl Into<String>, line: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            program: "sh".to_string(),
            args: vec!["-c".to_string(), line.into()],
            envs: Vec::new(),
        }
    }

    pub fn program(tool: impl Into<String>, program: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    fn command(&self, cwd: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .current_dir(cwd)
            .envs(self.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        command
    }

    fn failure(&self, message: impl Into<String>) -> Error {
        Error::Command {
            tool: self.tool.clone(),
            message: message.into(),
        }
    }

    /// Runs the command, relaying each output line to the display.
    ///
    /// Returns whether the process exited successfully.
    pub async fn stream(&self, cwd: &Path, display: &Display) -> Result<bool> {
        debug!(tool = %self.tool, program = %self.program, args = ?self.args, "spawning");

        let mut child = self
            .command(cwd)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.failure(format!("Failed to spawn: {}", e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| self.failure("Failed to capture stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| self.failure("Failed to capture stderr"))?;

        let mut stdout_lines = BufReader::new(stdout).lines();
        let mut stderr_lines = BufReader::new(stderr).lines();
        let mut stdout_open = true;
        let mut stderr_open = true;

        while stdout_open || stderr_open {
            tokio::select! {
                line = stdout_lines.next_line(), if stdout_open => match line? {
                    Some(line) => display.echo(line.trim_end()),
                    None => stdout_open = false,
                },
                line = stderr_lines.next_line(), if stderr_open => match line? {
                    Some(line) => display.warning(line.trim_end()),
                    None => stderr_open = false,
                },
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|e| self.failure(format!("Failed to wait for process: {}", e)))?;

        Ok(status.success())
    }

    /// Runs the command and fails unless it exits successfully.
    pub async fn run(&self, cwd: &Path, display: &Display) -> Result<()> {
        if self.stream(cwd, display).await? {
            Ok(())
        } else {
            Err(self.failure("exited with a non-zero status"))
        }
    }

    /// Runs the command and captures its output without relaying it.
    pub async fn output(&self, cwd: &Path) -> Result<CommandOutput> {
        debug!(tool = %self.tool, program = %self.program, args = ?self.args, "capturing");

        let output = self
            .command(cwd)
            .output()
            .await
            .map_err(|e| self.failure(format!("Failed to execute: {}", e)))?;

        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}
