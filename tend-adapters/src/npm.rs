use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use semver::Version;
use serde_json::{Map, Value};
use tracing::debug;

use tend_core::error::{Error, Result};
use tend_core::{DependencyState, Display, PackageRegistry, PublishRequest, ShellCommand};

const DEPENDENCY_FIELDS: [&str; 2] = ["dependencies", "devDependencies"];

/// Registry client backed by the `npm` CLI.
pub struct NpmRegistry {
    test_command: String,
}

impl NpmRegistry {
    pub fn new(test_command: impl Into<String>) -> Self {
        Self {
            test_command: test_command.into(),
        }
    }

    fn npm() -> ShellCommand {
        ShellCommand::program("npm", "npm")
    }
}

impl Default for NpmRegistry {
    fn default() -> Self {
        Self::new("npm test")
    }
}

#[async_trait]
impl PackageRegistry for NpmRegistry {
    async fn install(&self, root: &Path, display: &Display) -> Result<()> {
        clear_install_state(root)?;
        display.print("Install dependencies");
        Self::npm()
            .args(["install", "--no-audit"])
            .run(root, display)
            .await
    }

    async fn outdated(&self, root: &Path) -> Result<Vec<DependencyState>> {
        let manifest = read_json(&root.join("package.json"))?;
        let declared = declared_dependencies(&manifest);

        // npm exits with 1 whenever something is outdated
        let output = Self::npm()
            .args(["outdated", "--json"])
            .output(root)
            .await?;
        let report = parse_outdated(&output.stdout).map_err(|message| Error::Command {
            tool: "npm".to_string(),
            message: if output.stderr.trim().is_empty() {
                message
            } else {
                output.stderr.trim().to_string()
            },
        })?;

        let states = declared
            .into_iter()
            .map(|(name, wanted)| {
                let installed = installed_version(root, &name);
                let latest = match report.get(&name) {
                    Some(entry) => entry
                        .get("latest")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    None => installed.clone(),
                };
                DependencyState {
                    name,
                    wanted,
                    installed,
                    latest,
                }
            })
            .collect();

        Ok(states)
    }

    async fn pack(&self, root: &Path, into: &Path, display: &Display) -> Result<()> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .map_err(|e| Error::Command {
                    tool: "npm".to_string(),
                    message: e.to_string(),
                })?,
        );
        spinner.set_message(format!("Packing {}", root.display()));
        spinner.enable_steady_tick(Duration::from_millis(100));

        let root = fs::canonicalize(root)?;
        let output = Self::npm()
            .arg("pack")
            .arg(root.to_string_lossy())
            .output(into)
            .await;
        spinner.finish_and_clear();

        let output = output?;
        if !output.success {
            return Err(Error::Command {
                tool: "npm".to_string(),
                message: format!("pack failed: {}", output.stderr.trim()),
            });
        }

        for line in output.stdout.lines().filter(|l| !l.trim().is_empty()) {
            display.echo(line.trim());
        }
        Ok(())
    }

    async fn publish(&self, request: &PublishRequest, display: &Display) -> Result<()> {
        let directory = request
            .artifact
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Self::npm()
            .args(publish_args(request))
            .run(&directory, display)
            .await
    }

    async fn run_tests(&self, root: &Path, display: &Display) -> Result<bool> {
        ShellCommand::shell("test", self.test_command.as_str())
            .stream(root, display)
            .await
    }

    async fn runtime_version(&self) -> Result<Version> {
        let output = ShellCommand::program("node", "node")
            .arg("--version")
            .output(Path::new("."))
            .await?;
        parse_node_version(&output.stdout)
    }
}

/// Removes `node_modules` and the lock file so npm resolves from scratch.
fn clear_install_state(root: &Path) -> Result<()> {
    match fs::remove_dir_all(root.join("node_modules")) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    match fs::remove_file(root.join("package-lock.json")) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    debug!(root = %root.display(), "cleared install state");
    Ok(())
}

fn read_json(path: &Path) -> Result<Map<String, Value>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::ManifestNotFound(path.to_path_buf()))
        }
        Err(e) => return Err(e.into()),
    };
    match serde_json::from_str(&content) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Ok(Map::new()),
        Err(error) => Err(Error::Json {
            error,
            context: path.display().to_string(),
        }),
    }
}

/// Declared dependencies in manifest order, skipping a self-reference.
fn declared_dependencies(manifest: &Map<String, Value>) -> Vec<(String, String)> {
    let own_name = manifest.get("name").and_then(Value::as_str);

    DEPENDENCY_FIELDS
        .iter()
        .filter_map(|field| manifest.get(*field).and_then(Value::as_object))
        .flat_map(|dependencies| dependencies.iter())
        .filter(|(name, _)| Some(name.as_str()) != own_name)
        .map(|(name, range)| {
            (
                name.clone(),
                range.as_str().unwrap_or_default().to_string(),
            )
        })
        .collect()
}

fn installed_version(root: &Path, name: &str) -> Option<String> {
    let manifest = root.join("node_modules").join(name).join("package.json");
    read_json(&manifest)
        .ok()?
        .get("version")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Parses `npm outdated --json`; empty output means nothing is outdated.
fn parse_outdated(stdout: &str) -> std::result::Result<Map<String, Value>, String> {
    if stdout.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str(stdout) {
        Ok(Value::Object(map)) if !map.contains_key("error") => Ok(map),
        Ok(_) => Err("npm outdated reported an error".to_string()),
        Err(e) => Err(format!("unreadable npm outdated output: {}", e)),
    }
}

fn publish_args(request: &PublishRequest) -> Vec<String> {
    let mut args = vec![
        "publish".to_string(),
        request.artifact.to_string_lossy().to_string(),
        format!("--tag={}", request.tag),
        format!("--access={}", request.access.as_str()),
    ];
    if let Some(otp) = &request.otp {
        args.push(format!("--otp={}", otp));
    }
    args
}

fn parse_node_version(stdout: &str) -> Result<Version> {
    let raw = stdout.trim().trim_start_matches('v');
    debug!(version = raw, "runtime version");
    Version::parse(raw).map_err(|e| Error::Command {
        tool: "node".to_string(),
        message: format!("unexpected version '{}': {}", raw, e),
    })
}
