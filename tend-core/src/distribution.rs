//! Derivation of per-target bundler configurations.
//!
//! Derivation is a pure function of the [`DistributionOptions`] and the unit
//! being built. File-system effects (output and decoy cleanup) are separate
//! functions the build body calls around the bundler.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use semver::{Comparator, Op, Version, VersionReq};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::options::{BrowserOptions, BrowserType, DistributionOptions, NodeType, SyntaxType};
use crate::paths::{normalize, RepositoryPaths, DISTRIBUTIONS_DIR, SOURCES_DIR};

/// Placeholder the bundler emits when a target has no real entry point.
pub const DECOY_FILE: &str = "__decoy__.js";

/// Marker identifying an untouched decoy output.
pub const DECOY_MARKER: &str = "/* tend:decoy-entry */";

pub const NAME_DEFINITION: &str = "process.env.__PACKAGE_NAME__";
pub const ROOT_DEFINITION: &str = "process.env.__PACKAGE_ROOT__";

/// Contents of the decoy entry source handed to the bundler.
pub fn decoy_source() -> String {
    format!("{}\n", DECOY_MARKER)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetKind {
    ServerRuntime,
    BrowserModule,
    BrowserScript,
}

impl TargetKind {
    pub fn label(&self) -> &'static str {
        match self {
            TargetKind::ServerRuntime => "Node.js",
            TargetKind::BrowserModule => "browser (modules)",
            TargetKind::BrowserScript => "browser (script)",
        }
    }
}

/// What the bundler starts from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Entry {
    /// No real entry; the bundler writes [`DECOY_FILE`] into the output.
    Decoy { output: PathBuf },
    Source { path: PathBuf },
}

/// Environment a preset compiles for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "runtime", content = "query", rename_all = "kebab-case")]
pub enum PresetTargets {
    /// Minimum Node.js version, or `current` when none is declared.
    Node(String),
    /// Browserslist query.
    Browsers(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "kebab-case")]
pub enum TransformStep {
    StripTypes,
    Preset { targets: PresetTargets },
    /// CommonJS interop, exporting the default as `module.exports`.
    ModuleInterop,
}

/// Files matching `pattern` (relative to the source) go through `steps`.
///
/// A rule with no steps copies matching files verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformRule {
    pub pattern: String,
    pub steps: Vec<TransformStep>,
}

impl TransformRule {
    pub fn is_copy(&self) -> bool {
        self.steps.is_empty()
    }
}

/// One bundler invocation target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistributionConfig {
    pub target_kind: TargetKind,
    pub source: PathBuf,
    pub entry: Entry,
    pub transform_rules: Vec<TransformRule>,
    pub output_path: PathBuf,
    /// Set when the target produces exactly one file.
    pub output_file: Option<String>,
    pub externals: BTreeMap<String, String>,
    /// Build-time constants, values already JSON-encoded.
    pub definitions: BTreeMap<String, String>,
}

impl DistributionConfig {
    /// The path removed before this target is rebuilt.
    pub fn stale_output(&self) -> PathBuf {
        match &self.output_file {
            Some(file) => self.output_path.join(file),
            None => self.output_path.clone(),
        }
    }

    pub fn decoy_path(&self) -> PathBuf {
        self.output_path.join(DECOY_FILE)
    }
}

/// The unit a set of configs is derived for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionUnit {
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Declared package name.
    pub package_name: String,
    /// The manifest's `engines.node` range.
    pub engine_range: Option<String>,
}

impl DistributionUnit {
    /// A unit at the repository root, honoring the configured directories.
    pub fn for_root(
        paths: &RepositoryPaths,
        options: &DistributionOptions,
        package_name: impl Into<String>,
    ) -> Self {
        let source = options
            .source
            .as_deref()
            .map(|p| paths.resolve(p))
            .unwrap_or_else(|| paths.sources());
        let destination = options
            .destination
            .as_deref()
            .map(|p| paths.resolve(p))
            .unwrap_or_else(|| paths.distributions());

        Self {
            source,
            destination,
            package_name: package_name.into(),
            engine_range: None,
        }
    }

    /// A workspace member; its own `src` and `dist` replace the configured ones.
    pub fn for_member(root: &Path, package_name: impl Into<String>) -> Self {
        Self {
            source: normalize(&root.join(SOURCES_DIR)),
            destination: normalize(&root.join(DISTRIBUTIONS_DIR)),
            package_name: package_name.into(),
            engine_range: None,
        }
    }

    pub fn with_engine_range(mut self, range: Option<String>) -> Self {
        self.engine_range = range;
        self
    }
}

/// Derives one config per target for a single unit.
///
/// Node comes first, then browser targets in declaration order.
///
/// # Errors
///
/// Returns an error if the options are invalid or a runtime range cannot be
/// parsed. Nothing is written to disk either way.
pub fn derive(
    options: &DistributionOptions,
    unit: &DistributionUnit,
) -> Result<Vec<DistributionConfig>> {
    options.validate()?;

    let definitions = definitions(unit)?;
    let includes = include_rules(&options.include);
    let mut configs = Vec::new();

    if let Some(node) = &options.node {
        let range = node.target.as_deref().or(unit.engine_range.as_deref());
        let version = match range {
            Some(range) => minimum_version(range)?
                .map(|v| v.to_string())
                .unwrap_or_else(|| "current".to_string()),
            None => "current".to_string(),
        };

        let mut steps = syntax_steps(options.syntax);
        steps.push(TransformStep::Preset {
            targets: PresetTargets::Node(version),
        });
        if node.kind == NodeType::Commonjs {
            steps.push(TransformStep::ModuleInterop);
        }

        let mut transform_rules = vec![TransformRule {
            pattern: source_glob(options.syntax).to_string(),
            steps,
        }];
        transform_rules.extend(includes.iter().cloned());

        let output_path = unit.destination.join("node");
        configs.push(DistributionConfig {
            target_kind: TargetKind::ServerRuntime,
            source: unit.source.clone(),
            entry: Entry::Decoy {
                output: output_path.join(DECOY_FILE),
            },
            transform_rules,
            output_path,
            output_file: None,
            externals: BTreeMap::new(),
            definitions: definitions.clone(),
        });
    }

    for browser in options.browser.iter().flatten() {
        configs.push(browser_config(
            browser,
            options.syntax,
            unit,
            &includes,
            &definitions,
        ));
    }

    debug!(
        package = %unit.package_name,
        targets = configs.len(),
        "derived distribution configs"
    );
    Ok(configs)
}

/// Derives the configs of every workspace member, in discovery order.
pub fn derive_for_units(
    options: &DistributionOptions,
    units: &[DistributionUnit],
) -> Result<Vec<DistributionConfig>> {
    options.validate()?;

    let mut configs = Vec::new();
    for unit in units {
        configs.extend(derive(options, unit)?);
    }
    Ok(configs)
}

fn browser_config(
    browser: &BrowserOptions,
    syntax: SyntaxType,
    unit: &DistributionUnit,
    includes: &[TransformRule],
    definitions: &BTreeMap<String, String>,
) -> DistributionConfig {
    let query = browser
        .target
        .clone()
        .unwrap_or_else(|| browser.kind.default_target().to_string());

    let mut steps = syntax_steps(syntax);
    steps.push(TransformStep::Preset {
        targets: PresetTargets::Browsers(query),
    });

    let mut transform_rules = vec![TransformRule {
        pattern: source_glob(syntax).to_string(),
        steps,
    }];

    let (target_kind, output_file, externals) = match browser.kind {
        BrowserType::Module => {
            transform_rules.extend(includes.iter().cloned());
            (TargetKind::BrowserModule, None, BTreeMap::new())
        }
        BrowserType::Script => (
            TargetKind::BrowserScript,
            browser.name.as_ref().map(|name| format!("{}.js", name)),
            browser.externals.clone(),
        ),
    };

    DistributionConfig {
        target_kind,
        source: unit.source.clone(),
        entry: Entry::Source {
            path: unit.source.join(format!("index.{}", extension(syntax))),
        },
        transform_rules,
        output_path: unit.destination.join("browser"),
        output_file,
        externals,
        definitions: definitions.clone(),
    }
}

fn definitions(unit: &DistributionUnit) -> Result<BTreeMap<String, String>> {
    let name = serde_json::to_string(&unit.package_name)
        .map_err(|e| Error::json(e, "package name"))?;
    let root = serde_json::to_string(&unit.source.to_string_lossy())
        .map_err(|e| Error::json(e, "source root"))?;

    let mut definitions = BTreeMap::new();
    definitions.insert(NAME_DEFINITION.to_string(), name);
    definitions.insert(ROOT_DEFINITION.to_string(), root);
    Ok(definitions)
}

fn include_rules(patterns: &[String]) -> Vec<TransformRule> {
    patterns
        .iter()
        .filter(|pattern| {
            let rooted = pattern.starts_with('/') || pattern.starts_with('.');
            if rooted {
                warn!(pattern = %pattern, "ignoring rooted include pattern");
            }
            !rooted
        })
        .map(|pattern| TransformRule {
            pattern: pattern.clone(),
            steps: Vec::new(),
        })
        .collect()
}

fn syntax_steps(syntax: SyntaxType) -> Vec<TransformStep> {
    match syntax {
        SyntaxType::Javascript => Vec::new(),
        SyntaxType::Typescript => vec![TransformStep::StripTypes],
    }
}

fn source_glob(syntax: SyntaxType) -> &'static str {
    match syntax {
        SyntaxType::Javascript => "**/*.js",
        SyntaxType::Typescript => "**/!(*.d).ts",
    }
}

fn extension(syntax: SyntaxType) -> &'static str {
    match syntax {
        SyntaxType::Javascript => "js",
        SyntaxType::Typescript => "ts",
    }
}

/// Lowest version a runtime range admits.
///
/// Alternatives separated by `||` are each parsed and the smallest lower
/// bound wins. `None` when the range is empty or any alternative is
/// unbounded from below (`*`, `<16`).
pub fn minimum_version(range: &str) -> Result<Option<Version>> {
    let mut lowest: Option<Version> = None;
    let mut unbounded = false;

    for alternative in range.split("||") {
        let alternative = alternative.trim();
        if alternative.is_empty() {
            continue;
        }

        let requirement = VersionReq::parse(&comparators(alternative)).map_err(|e| {
            Error::invalid("dist.node.target", format!("'{}': {}", alternative, e))
        })?;

        match requirement.comparators.iter().filter_map(lower_bound).max() {
            Some(bound) => {
                lowest = Some(match lowest {
                    Some(current) if current <= bound => current,
                    _ => bound,
                });
            }
            None => unbounded = true,
        }
    }

    Ok(if unbounded { None } else { lowest })
}

/// Rewrites npm's space-separated comparators into the comma-separated form.
///
/// A hyphen range `A - B` keeps only its `>=A` half, which is all the lower
/// bound needs.
fn comparators(alternative: &str) -> String {
    let tokens: Vec<&str> = alternative.split_whitespace().collect();
    if let [low, "-", _] = tokens.as_slice() {
        return format!(">={}", low);
    }

    let mut parts: Vec<String> = Vec::new();
    let mut pending_op: Option<&str> = None;
    for token in tokens {
        if token.chars().all(|c| matches!(c, '<' | '>' | '=' | '~' | '^')) {
            pending_op = Some(token);
            continue;
        }
        match pending_op.take() {
            Some(op) => parts.push(format!("{}{}", op, token)),
            None => parts.push(token.to_string()),
        }
    }
    parts.join(", ")
}

fn lower_bound(comparator: &Comparator) -> Option<Version> {
    let minor = comparator.minor.unwrap_or(0);
    let patch = comparator.patch.unwrap_or(0);

    match comparator.op {
        Op::Exact | Op::GreaterEq | Op::Tilde | Op::Caret | Op::Wildcard => {
            let mut version = Version::new(comparator.major, minor, patch);
            version.pre = comparator.pre.clone();
            Some(version)
        }
        // The release itself is the first version above one of its prereleases
        Op::Greater if !comparator.pre.is_empty() => {
            Some(Version::new(comparator.major, minor, patch))
        }
        Op::Greater => Some(match (comparator.minor, comparator.patch) {
            (Some(_), Some(_)) => Version::new(comparator.major, minor, patch + 1),
            (Some(_), None) => Version::new(comparator.major, minor + 1, 0),
            _ => Version::new(comparator.major + 1, 0, 0),
        }),
        _ => None,
    }
}

/// Removes what a previous build of each target left behind.
pub fn clean_outputs(configs: &[DistributionConfig]) -> Result<()> {
    for config in configs {
        let stale = config.stale_output();
        let removed = if config.output_file.is_some() {
            fs::remove_file(&stale)
        } else {
            fs::remove_dir_all(&stale)
        };

        match removed {
            Ok(()) => debug!(path = %stale.display(), "removed previous output"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// Deletes decoy outputs that still carry the marker.
///
/// Returns how many were removed. A decoy whose content no longer contains
/// the marker was replaced by real output and is kept.
pub fn remove_decoys(configs: &[DistributionConfig]) -> Result<usize> {
    let mut removed = 0;
    for config in configs {
        let decoy = config.decoy_path();
        let content = match fs::read_to_string(&decoy) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => continue,
            Err(e) => return Err(e.into()),
        };

        if content.contains(DECOY_MARKER) {
            fs::remove_file(&decoy)?;
            removed += 1;
        }
    }
    Ok(removed)
}
