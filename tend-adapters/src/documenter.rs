use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;
use walkdir::WalkDir;

use tend_core::error::{Error, Result};
use tend_core::{Display, DocumentationRequest, Documenter, ShellCommand};

/// Environment variable carrying the API documentation options as JSON.
pub const OPTIONS_ENV: &str = "TEND_DOCUMENTATION_OPTIONS";

/// Directory, under the documentation root, holding the shared theme assets.
pub const COMMON_ASSETS_DIR: &str = "assets__";

const API_DIR: &str = "api";

const REDIRECT_PAGE: &str = r#"<!DOCTYPE html>
<html>
	<head>
		<meta charset="utf-8">
		<meta http-equiv="refresh" content="0; url=api/">
		<title>Documentation</title>
	</head>
	<body>
		<a href="api/">API documentation</a>
	</body>
</html>
"#;

#[derive(Debug, Serialize)]
struct ApiOptions<'a> {
    root: &'a Path,
    source: &'a Path,
    destination: &'a Path,
    depth: usize,
}

/// Documentation generator driven by a configured command line.
pub struct CommandDocumenter {
    command: Option<String>,
    theme: Option<PathBuf>,
}

impl CommandDocumenter {
    pub fn new(command: Option<String>, theme: Option<PathBuf>) -> Self {
        Self { command, theme }
    }
}

#[async_trait]
impl Documenter for CommandDocumenter {
    async fn common_assets(&self, destination: &Path, _display: &Display) -> Result<()> {
        reset_dir(destination)?;
        let assets = destination.join(COMMON_ASSETS_DIR);
        fs::create_dir_all(&assets)?;

        if let Some(theme) = &self.theme {
            let copied = copy_tree(theme, &assets)?;
            debug!(files = copied, theme = %theme.display(), "copied theme assets");
        }
        Ok(())
    }

    async fn api(&self, request: &DocumentationRequest, display: &Display) -> Result<()> {
        let output = request.destination.join(API_DIR);
        reset_dir(&output)?;

        let Some(line) = self.command.as_deref() else {
            display.echo("No documenter command configured, API documentation skipped");
            return Ok(());
        };

        let options = ApiOptions {
            root: &request.root,
            source: &request.source,
            destination: &output,
            depth: request.depth,
        };
        let payload = serde_json::to_string(&options).map_err(|error| Error::Json {
            error,
            context: "documentation options".to_string(),
        })?;

        ShellCommand::shell("documenter", line)
            .env(OPTIONS_ENV, payload)
            .run(&request.root, display)
            .await
    }

    /// Text pages are a redirect to the API pages for now.
    async fn text(&self, _source: &Path, destination: &Path, _display: &Display) -> Result<()> {
        fs::create_dir_all(destination)?;
        fs::write(destination.join("index.html"), REDIRECT_PAGE)?;
        Ok(())
    }
}

fn reset_dir(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    fs::create_dir_all(path)?;
    Ok(())
}

/// Copies every file under `from` into `to`, keeping the layout.
fn copy_tree(from: &Path, to: &Path) -> Result<usize> {
    let mut copied = 0;
    for entry in WalkDir::new(from).follow_links(true) {
        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(|e| Error::Io(std::io::Error::new(ErrorKind::Other, e)))?;
        let target = to.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}
