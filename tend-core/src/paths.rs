//! Repository path conventions.

use std::path::{Component, Path, PathBuf};

pub const SOURCES_DIR: &str = "src";
pub const DISTRIBUTIONS_DIR: &str = "dist";
pub const DOCUMENTATION_DIR: &str = "docs";
pub const SUBPACKAGES_DIR: &str = "packages";
pub const MANIFEST_FILE: &str = "package.json";
pub const LICENSE_FILE: &str = "license";
pub const WORKSPACE_FILE: &str = "lerna.json";
pub const LOCK_FILE: &str = "package-lock.json";

/// Well-known locations under a repository root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryPaths {
    root: PathBuf,
}

impl RepositoryPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    pub fn license(&self) -> PathBuf {
        self.root.join(LICENSE_FILE)
    }

    pub fn workspace(&self) -> PathBuf {
        self.root.join(WORKSPACE_FILE)
    }

    pub fn sources(&self) -> PathBuf {
        self.root.join(SOURCES_DIR)
    }

    pub fn distributions(&self) -> PathBuf {
        self.root.join(DISTRIBUTIONS_DIR)
    }

    pub fn documentation(&self) -> PathBuf {
        self.root.join(DOCUMENTATION_DIR)
    }

    pub fn subpackages(&self) -> PathBuf {
        self.root.join(SUBPACKAGES_DIR)
    }

    /// Resolves a configured path against the root unless it is already absolute.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            normalize(path)
        } else {
            normalize(&self.root.join(path))
        }
    }

    /// Renders `path` relative to the root as `./…`, for display.
    pub fn relativize(&self, path: &Path) -> String {
        match path.strip_prefix(&self.root) {
            Ok(relative) if relative.as_os_str().is_empty() => ".".to_string(),
            Ok(relative) => format!("./{}", relative.display()),
            Err(_) => path.display().to_string(),
        }
    }
}

/// Lexically removes `.` and `..` components.
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}
