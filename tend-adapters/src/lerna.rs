use std::path::{Path, PathBuf};

use async_trait::async_trait;
use semver::Version;
use tracing::debug;

use tend_core::error::{Error, Result};
use tend_core::{Display, ShellCommand, WorkspaceTool};

/// Workspace tool backed by the `lerna` CLI.
#[derive(Debug, Default)]
pub struct LernaWorkspace;

impl LernaWorkspace {
    pub fn new() -> Self {
        Self
    }

    fn lerna() -> ShellCommand {
        ShellCommand::program("lerna", "lerna")
    }
}

#[async_trait]
impl WorkspaceTool for LernaWorkspace {
    async fn discover(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let output = Self::lerna()
            .args(["exec", "--concurrency=1", "--loglevel=silent", "--", "pwd"])
            .output(root)
            .await?;

        if !output.success {
            return Err(Error::Command {
                tool: "lerna".to_string(),
                message: format!("listing members failed: {}", output.stderr.trim()),
            });
        }

        let members = parse_members(&output.stdout);
        debug!(count = members.len(), "lerna members");
        Ok(members)
    }

    async fn bootstrap(&self, root: &Path, display: &Display) -> Result<()> {
        Self::lerna().args(["clean", "--yes"]).run(root, display).await?;
        Self::lerna()
            .args(["bootstrap", "--no-ci"])
            .run(root, display)
            .await
    }

    async fn sync_version(&self, root: &Path, version: &Version, display: &Display) -> Result<()> {
        Self::lerna()
            .args(version_args(version))
            .run(root, display)
            .await
    }
}

/// Member roots from `lerna exec -- pwd`, without the CLI's header lines.
fn parse_members(stdout: &str) -> Vec<PathBuf> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !line.starts_with("info cli") && !line.starts_with("lerna "))
        .map(PathBuf::from)
        .collect()
}

fn version_args(version: &Version) -> Vec<String> {
    vec![
        "version".to_string(),
        version.to_string(),
        "--force-publish=*".to_string(),
        "--exact".to_string(),
        "--no-git-tag-version".to_string(),
        "--no-push".to_string(),
        "--yes".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_members_drops_headers() {
        let stdout = "info cli using local version of lerna\n\
                      lerna notice cli v6.6.2\n\
                      /repo/packages/core\n\
                      \n\
                      /repo/packages/ui\n";

        assert_eq!(
            parse_members(stdout),
            vec![
                PathBuf::from("/repo/packages/core"),
                PathBuf::from("/repo/packages/ui"),
            ]
        );
    }

    #[test]
    fn test_parse_members_empty() {
        assert!(parse_members("\n\n").is_empty());
    }

    #[test]
    fn test_version_args() {
        let args = version_args(&Version::parse("2.0.0-rc.1").unwrap());
        assert_eq!(args[1], "2.0.0-rc.1");
        assert!(args.contains(&"--no-git-tag-version".to_string()));
    }
}
