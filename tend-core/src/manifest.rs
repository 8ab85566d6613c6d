//! Reading and rewriting `package.json` and `lerna.json`.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use semver::Version;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Error, Result};
use crate::paths::RepositoryPaths;

/// A unit manifest with its key order preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    path: PathBuf,
    fields: Map<String, Value>,
}

impl Manifest {
    /// Loads `<root>/package.json`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ManifestNotFound`] if the file does not exist.
    pub fn load(root: &Path) -> Result<Self> {
        let path = RepositoryPaths::new(root).manifest();
        let fields = read_object(&path)?;
        Ok(Self { path, fields })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> Option<&str> {
        self.fields.get("name").and_then(Value::as_str)
    }

    pub fn version_str(&self) -> Option<&str> {
        self.fields.get("version").and_then(Value::as_str)
    }

    /// The declared version, parsed.
    pub fn version(&self) -> Result<Version> {
        parse_version(&self.path, self.version_str())
    }

    /// The `engines.node` range.
    pub fn engine_range(&self) -> Option<&str> {
        self.fields
            .get("engines")
            .and_then(|engines| engines.get("node"))
            .and_then(Value::as_str)
    }

    /// Whether the unit lists itself in its `devDependencies`.
    pub fn is_self_referencing(&self) -> bool {
        match (self.name(), self.fields.get("devDependencies")) {
            (Some(name), Some(Value::Object(dev))) => dev.contains_key(name),
            _ => false,
        }
    }

    /// Pins `engines.node` to `>= <version>`, creating `engines` if needed.
    pub fn pin_engine(&mut self, version: &Version) {
        let range = Value::String(format!(">= {}", version));
        match self.fields.get_mut("engines") {
            Some(Value::Object(engines)) => {
                engines.insert("node".to_string(), range);
            }
            _ => {
                let mut engines = Map::new();
                engines.insert("node".to_string(), range);
                self.fields
                    .insert("engines".to_string(), Value::Object(engines));
            }
        }
    }

    /// Points the self-referencing dev-dependency at the unit's own version.
    ///
    /// Returns `false` when the unit does not reference itself.
    pub fn sync_self_reference(&mut self) -> bool {
        if !self.is_self_referencing() {
            return false;
        }

        let (Some(name), Some(version)) = (
            self.name().map(str::to_string),
            self.version_str().map(str::to_string),
        ) else {
            return false;
        };

        if let Some(Value::Object(dev)) = self.fields.get_mut("devDependencies") {
            dev.insert(name, Value::String(version));
            return true;
        }
        false
    }

    /// Writes the manifest back with 2-space indentation.
    pub fn save(&self) -> Result<()> {
        let mut content = serde_json::to_string_pretty(&self.fields)
            .map_err(|e| Error::json(e, self.path.display().to_string()))?;
        content.push('\n');
        fs::write(&self.path, content)?;
        debug!(path = %self.path.display(), "wrote manifest");
        Ok(())
    }
}

/// Reads the `version` field of a JSON file such as `lerna.json`.
pub fn read_version(path: &Path) -> Result<Version> {
    let fields = match read_object(path) {
        Err(Error::ManifestNotFound(_)) => return Err(Error::VersionUnavailable(path.to_path_buf())),
        other => other?,
    };
    parse_version(path, fields.get("version").and_then(Value::as_str))
}

fn parse_version(path: &Path, raw: Option<&str>) -> Result<Version> {
    let raw = raw.ok_or_else(|| Error::VersionUnavailable(path.to_path_buf()))?;
    Version::parse(raw.trim()).map_err(|e| {
        Error::invalid(
            format!("{}#version", path.display()),
            format!("'{}' is not a semantic version: {}", raw, e),
        )
    })
}

fn read_object(path: &Path) -> Result<Map<String, Value>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(Error::ManifestNotFound(path.to_path_buf()))
        }
        Err(e) => return Err(e.into()),
    };

    match serde_json::from_str(&content).map_err(|e| Error::json(e, path.display().to_string()))? {
        Value::Object(fields) => Ok(fields),
        _ => Err(Error::invalid(
            path.display().to_string(),
            "expected a JSON object",
        )),
    }
}

/// Copies the repository license into a unit root.
pub fn copy_license(repository_root: &Path, unit_root: &Path) -> Result<PathBuf> {
    let target = RepositoryPaths::new(unit_root).license();
    fs::copy(RepositoryPaths::new(repository_root).license(), &target)?;
    Ok(target)
}

/// Replaces `node_modules/<name>` with a symlink to the unit root.
pub fn link_self_reference(root: &Path, name: &str) -> Result<PathBuf> {
    let link = root.join("node_modules").join(name);

    match fs::symlink_metadata(&link) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(&link)?,
        Ok(_) => fs::remove_file(&link)?,
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    if let Some(parent) = link.parent() {
        fs::create_dir_all(parent)?;
    }

    #[cfg(unix)]
    std::os::unix::fs::symlink(root, &link)?;
    #[cfg(windows)]
    std::os::windows::fs::symlink_dir(root, &link)?;

    Ok(link)
}
