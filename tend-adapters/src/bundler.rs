use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use notify::{Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info};

use tend_core::error::{Error, Result};
use tend_core::{Bundler, DistributionConfig, Display, ShellCommand};

/// Environment variable carrying the derived configs as a JSON array.
pub const CONFIGS_ENV: &str = "TEND_DISTRIBUTION_CONFIGS";

const DEBOUNCE: Duration = Duration::from_millis(300);
const POLL: Duration = Duration::from_millis(250);

/// Bundler driven by a configured command line.
pub struct CommandBundler {
    command: Option<String>,
    root: PathBuf,
    stop: Arc<AtomicBool>,
}

impl CommandBundler {
    pub fn new(command: Option<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            command,
            root: root.into(),
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag that ends watch mode once set.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    fn command(&self, configs: &[DistributionConfig]) -> Result<ShellCommand> {
        let line = self.command.as_deref().ok_or_else(|| Error::InvalidOptions {
            field: "toolchain.bundler".to_string(),
            message: "required when [dist] is set".to_string(),
        })?;
        let payload = serde_json::to_string(configs).map_err(|error| Error::Json {
            error,
            context: "distribution configs".to_string(),
        })?;

        Ok(ShellCommand::shell("bundler", line).env(CONFIGS_ENV, payload))
    }
}

#[async_trait]
impl Bundler for CommandBundler {
    async fn run(&self, configs: &[DistributionConfig], display: &Display) -> Result<()> {
        self.command(configs)?.run(&self.root, display).await
    }

    async fn watch(&self, configs: &[DistributionConfig], display: &Display) -> Result<()> {
        let command = self.command(configs)?;
        let (tx, mut rx) = mpsc::unbounded_channel::<notify::Result<Event>>();

        let mut watcher = RecommendedWatcher::new(
            move |event| {
                let _ = tx.send(event);
            },
            NotifyConfig::default(),
        )
        .map_err(|e| Error::Watcher(format!("Failed to create watcher: {}", e)))?;

        for source in watched_roots(configs) {
            watcher
                .watch(&source, RecursiveMode::Recursive)
                .map_err(|e| Error::Watcher(format!("Failed to watch {}: {}", source.display(), e)))?;
            info!(path = %source.display(), "watching");
        }

        command.run(&self.root, display).await?;
        display.echo("Waiting for changes");

        while !self.stop.load(Ordering::SeqCst) {
            let event = match tokio::time::timeout(POLL, rx.recv()).await {
                Err(_) => continue,
                Ok(None) => break,
                Ok(Some(event)) => event.map_err(|e| Error::Watcher(e.to_string()))?,
            };
            if !is_change(&event.kind) {
                continue;
            }

            // Coalesce the burst of events an editor save produces
            while let Ok(Some(_)) = tokio::time::timeout(DEBOUNCE, rx.recv()).await {}

            debug!(paths = ?event.paths, "sources changed");
            display.print("Rebuild distributions");
            if !command.stream(&self.root, display).await? {
                display.warning("Bundler failed, waiting for the next change");
            }
        }

        Ok(())
    }
}

fn watched_roots(configs: &[DistributionConfig]) -> BTreeSet<PathBuf> {
    configs
        .iter()
        .map(|config| config.source.clone())
        .filter(|source| Path::new(source).is_dir())
        .collect()
}

fn is_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tend_core::{Entry, TargetKind};

    fn config(source: &Path) -> DistributionConfig {
        DistributionConfig {
            target_kind: TargetKind::BrowserModule,
            source: source.to_path_buf(),
            entry: Entry::Source {
                path: source.join("index.js"),
            },
            transform_rules: Vec::new(),
            output_path: source.join("../dist/browser"),
            output_file: None,
            externals: BTreeMap::new(),
            definitions: BTreeMap::new(),
        }
    }

    #[test]
    fn test_missing_command_is_an_option_error() {
        let bundler = CommandBundler::new(None, "/repo");
        let result = bundler.command(&[]);
        assert!(matches!(result, Err(Error::InvalidOptions { .. })));
    }

    #[test]
    fn test_watched_roots_are_unique_existing_sources() {
        let dir = tempfile::TempDir::new().unwrap();
        let source = dir.path().join("src");
        std::fs::create_dir_all(&source).unwrap();

        let configs = vec![
            config(&source),
            config(&source),
            config(&dir.path().join("missing")),
        ];
        let roots = watched_roots(&configs);

        assert_eq!(roots.len(), 1);
        assert!(roots.contains(&source));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_passes_configs_in_environment() {
        let dir = tempfile::TempDir::new().unwrap();
        let bundler = CommandBundler::new(
            Some(format!("printf '%s' \"${}\" > configs.json", CONFIGS_ENV)),
            dir.path(),
        );
        let display: Display = Arc::new(tend_core::MemoryReporter::new());

        bundler
            .run(&[config(&dir.path().join("src"))], &display)
            .await
            .unwrap();

        let written = std::fs::read_to_string(dir.path().join("configs.json")).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed[0]["target_kind"], "browser-module");
        assert_eq!(parsed[0]["entry"]["kind"], "source");
    }
}
