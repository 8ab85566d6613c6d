mod commands;
mod formatting;
mod reporter;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::Level;

use crate::formatting::{print_cancelled, print_error};

#[derive(Parser, Debug)]
#[command(name = "tend")]
#[command(about = "Lifecycle tasks for single and multi-package repositories")]
struct Cli {
    /// Task to run: install, outdated, build, watch, fix, documentation,
    /// prepare, rebuild, publish or publish:unsafe.
    #[arg(long)]
    task: Option<String>,

    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Configuration file; defaults to `tend.toml` in the root.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Describe the repository instead of running a task.
    #[arg(long, action, conflicts_with = "task")]
    info: bool,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[arg(short, long, action)]
    quiet: bool,
}

impl Cli {
    fn log_level(&self) -> Level {
        if self.quiet {
            Level::ERROR
        } else {
            match self.verbose {
                0 => Level::INFO,
                1 => Level::DEBUG,
                _ => Level::TRACE,
            }
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level())
        .with_writer(std::io::stderr)
        .init();

    let result = if cli.info {
        commands::cmd_info(cli.root, cli.config)
    } else {
        commands::cmd_run(cli.root, cli.config, cli.task)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<tend_core::Error>() {
            Some(core) if core.is_cancellation() => {
                print_cancelled(&core.to_string());
                ExitCode::SUCCESS
            }
            _ => {
                print_error(&format!("{:#}", err));
                ExitCode::FAILURE
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_task() {
        let cli = Cli::try_parse_from(["tend", "--task", "publish:unsafe"]).unwrap();
        assert_eq!(cli.task.as_deref(), Some("publish:unsafe"));
        assert_eq!(cli.root, PathBuf::from("."));
        assert!(!cli.info);
    }

    #[test]
    fn test_parse_root_and_config() {
        let cli = Cli::try_parse_from([
            "tend",
            "--root",
            "/repo",
            "--config",
            "/etc/tend.toml",
            "--task",
            "build",
        ])
        .unwrap();
        assert_eq!(cli.root, PathBuf::from("/repo"));
        assert_eq!(cli.config, Some(PathBuf::from("/etc/tend.toml")));
    }

    #[test]
    fn test_info_conflicts_with_task() {
        assert!(Cli::try_parse_from(["tend", "--info", "--task", "build"]).is_err());
    }

    #[test]
    fn test_log_level() {
        let cli = Cli::try_parse_from(["tend", "-v"]).unwrap();
        assert_eq!(cli.log_level(), Level::DEBUG);

        let cli = Cli::try_parse_from(["tend", "-q", "-v"]).unwrap();
        assert_eq!(cli.log_level(), Level::ERROR);
    }
}
