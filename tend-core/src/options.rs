//! `tend.toml` configuration parsing and validation.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::command_validator::CommandValidator;
use crate::distribution::minimum_version;
use crate::error::{Error, Result};
use crate::task::Task;

/// File name of the configuration at the repository root.
pub const CONFIG_FILE: &str = "tend.toml";

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("identifier pattern is valid"));

/// Shape of the repository being managed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepositoryType {
    SinglePackage,
    MultiPackage,
}

impl RepositoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepositoryType::SinglePackage => "single-package",
            RepositoryType::MultiPackage => "multi-package",
        }
    }
}

impl fmt::Display for RepositoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Module system of the server-runtime distribution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    #[default]
    Commonjs,
    Module,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserType {
    /// Standalone classic script exposing one global.
    Script,
    /// Native ES modules.
    Module,
}

impl BrowserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrowserType::Script => "script",
            BrowserType::Module => "module",
        }
    }

    /// Browserslist query used when the target does not set one.
    pub fn default_target(&self) -> &'static str {
        match self {
            BrowserType::Script => "> 0.25%, not dead",
            BrowserType::Module => "last 1 version, not ie 11, not dead",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyntaxType {
    #[default]
    Javascript,
    Typescript,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeOptions {
    #[serde(rename = "type", default)]
    pub kind: NodeType,
    /// Supported runtime range; defaults to the manifest's `engines.node`.
    #[serde(default)]
    pub target: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BrowserOptions {
    #[serde(rename = "type")]
    pub kind: BrowserType,
    #[serde(default)]
    pub target: Option<String>,
    /// Global name the script exposes. Required for `script`.
    #[serde(default)]
    pub name: Option<String>,
    /// Dependency identifiers mapped to globals the host page already provides.
    #[serde(default)]
    pub externals: BTreeMap<String, String>,
}

impl BrowserOptions {
    pub fn module() -> Self {
        Self {
            kind: BrowserType::Module,
            target: None,
            name: None,
            externals: BTreeMap::new(),
        }
    }

    pub fn script(name: impl Into<String>) -> Self {
        Self {
            kind: BrowserType::Script,
            target: None,
            name: Some(name.into()),
            externals: BTreeMap::new(),
        }
    }
}

/// Distribution options for the build and watch tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DistributionOptions {
    #[serde(default)]
    pub source: Option<PathBuf>,
    #[serde(default)]
    pub destination: Option<PathBuf>,
    #[serde(default)]
    pub node: Option<NodeOptions>,
    #[serde(default)]
    pub browser: Option<Vec<BrowserOptions>>,
    #[serde(default)]
    pub syntax: SyntaxType,
    /// Extra files copied verbatim from source to destination.
    #[serde(default)]
    pub include: Vec<String>,
}

impl DistributionOptions {
    /// Checks the options without touching the file system.
    pub fn validate(&self) -> Result<()> {
        if self.node.is_none() && self.browser.is_none() {
            return Err(Error::invalid(
                "dist",
                "at least one of 'node' or 'browser' must be set",
            ));
        }

        if let Some(target) = self.node.as_ref().and_then(|node| node.target.as_deref()) {
            if target.trim().is_empty() {
                return Err(Error::invalid("dist.node.target", "cannot be empty"));
            }
            minimum_version(target)?;
        }

        if let Some(browser) = &self.browser {
            if browser.is_empty() {
                return Err(Error::invalid("dist.browser", "must list at least one target"));
            }

            for (index, target) in browser.iter().enumerate() {
                let field = format!("dist.browser[{}]", index);

                if browser[..index].iter().any(|t| t.kind == target.kind) {
                    return Err(Error::invalid(
                        field,
                        format!("duplicate '{}' target", target.kind.as_str()),
                    ));
                }

                match (&target.kind, &target.name) {
                    (BrowserType::Script, None) => {
                        return Err(Error::invalid(
                            format!("{}.name", field),
                            "required for 'script' targets",
                        ));
                    }
                    (_, Some(name)) if !IDENTIFIER.is_match(name) => {
                        return Err(Error::invalid(
                            format!("{}.name", field),
                            format!("'{}' is not a valid global name", name),
                        ));
                    }
                    _ => {}
                }

                for (dependency, global) in &target.externals {
                    if dependency.trim().is_empty() {
                        return Err(Error::invalid(
                            format!("{}.externals", field),
                            "dependency identifiers cannot be empty",
                        ));
                    }
                    if !IDENTIFIER.is_match(global) {
                        return Err(Error::invalid(
                            format!("{}.externals.{}", field, dependency),
                            format!("'{}' is not a valid global name", global),
                        ));
                    }
                }
            }
        }

        Ok(())
    }
}

/// Hook commands for one task as declared in `tend.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HookConfig {
    #[serde(default)]
    pub pre_run: Option<String>,
    #[serde(default)]
    pub post_run: Option<String>,
}

/// Commands for the external tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolchainConfig {
    /// Bundler command; receives the derived configs as JSON.
    #[serde(default)]
    pub bundler: Option<String>,
    #[serde(default)]
    pub documenter: Option<String>,
    #[serde(default = "default_fixer")]
    pub fixer: Vec<String>,
    #[serde(default = "default_test")]
    pub test: String,
    /// Prebuilt documentation theme copied as common assets.
    #[serde(default)]
    pub theme: Option<PathBuf>,
}

fn default_fixer() -> Vec<String> {
    vec![
        "eslint --ext=.js,.cjs,.mjs --fix .".to_string(),
        "prettier --write .".to_string(),
    ]
}

fn default_test() -> String {
    "npm test".to_string()
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            bundler: None,
            documenter: None,
            fixer: default_fixer(),
            test: default_test(),
            theme: None,
        }
    }
}

fn default_use_otp() -> bool {
    true
}

/// Complete configuration for one orchestration run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManagerConfig {
    pub repository_type: RepositoryType,
    #[serde(default)]
    pub restricted: bool,
    #[serde(default = "default_use_otp")]
    pub use_otp: bool,
    #[serde(default)]
    pub dist: Option<DistributionOptions>,
    #[serde(default)]
    pub tasks: BTreeMap<Task, HookConfig>,
    #[serde(default)]
    pub toolchain: ToolchainConfig,
}

impl ManagerConfig {
    pub fn new(repository_type: RepositoryType) -> Self {
        Self {
            repository_type,
            restricted: false,
            use_otp: default_use_otp(),
            dist: None,
            tasks: BTreeMap::new(),
            toolchain: ToolchainConfig::default(),
        }
    }

    /// Parses and validates configuration text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ManagerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ManagerConfig = toml::from_str(&content).map_err(|error| Error::Toml {
            error,
            context: path.display().to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(dist) = &self.dist {
            dist.validate()?;
        }

        let validator = CommandValidator::new();
        for (task, hooks) in &self.tasks {
            if task.hooks_key() != *task {
                return Err(Error::invalid(
                    format!("tasks.{}", task),
                    format!("declare these hooks under [tasks.{}]", task.hooks_key()),
                ));
            }
            if let Some(line) = &hooks.pre_run {
                validator.validate(&format!("tasks.{}.pre_run", task), line)?;
            }
            if let Some(line) = &hooks.post_run {
                validator.validate(&format!("tasks.{}.post_run", task), line)?;
            }
        }

        if let Some(line) = &self.toolchain.bundler {
            validator.validate("toolchain.bundler", line)?;
        }
        if let Some(line) = &self.toolchain.documenter {
            validator.validate("toolchain.documenter", line)?;
        }
        for line in &self.toolchain.fixer {
            validator.validate("toolchain.fixer", line)?;
        }
        validator.validate("toolchain.test", &self.toolchain.test)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script_without_name() -> DistributionOptions {
        DistributionOptions {
            browser: Some(vec![BrowserOptions {
                kind: BrowserType::Script,
                target: None,
                name: None,
                externals: BTreeMap::new(),
            }]),
            ..Default::default()
        }
    }

    #[test]
    fn test_requires_a_target() {
        let options = DistributionOptions::default();
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_script_requires_name() {
        let err = script_without_name().validate().unwrap_err();
        assert!(err.to_string().contains("dist.browser[0].name"));
    }

    #[test]
    fn test_rejects_invalid_global_names() {
        let options = DistributionOptions {
            browser: Some(vec![BrowserOptions::script("my-lib")]),
            ..Default::default()
        };
        assert!(options.validate().is_err());

        let mut target = BrowserOptions::script("MyLib");
        target
            .externals
            .insert("jquery".to_string(), "not a global".to_string());
        let options = DistributionOptions {
            browser: Some(vec![target]),
            ..Default::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_rejects_duplicate_browser_types() {
        let options = DistributionOptions {
            browser: Some(vec![BrowserOptions::module(), BrowserOptions::module()]),
            ..Default::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_accepts_node_and_module() {
        let options = DistributionOptions {
            node: Some(NodeOptions::default()),
            browser: Some(vec![BrowserOptions::module()]),
            ..Default::default()
        };
        assert!(options.validate().is_ok());
    }
}
