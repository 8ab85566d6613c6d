//! Traits for the external tools the orchestrator drives.
//!
//! Collaborators are invoked, never reimplemented. Command-backed
//! implementations live in `tend-adapters`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use semver::Version;

use crate::distribution::DistributionConfig;
use crate::error::Result;
use crate::outdated::DependencyState;
use crate::reporter::Display;

/// Registry access level of a published artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Restricted,
}

impl Access {
    pub fn from_restricted(restricted: bool) -> Self {
        if restricted {
            Access::Restricted
        } else {
            Access::Public
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Access::Public => "public",
            Access::Restricted => "restricted",
        }
    }
}

/// One artifact submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    pub artifact: PathBuf,
    pub tag: String,
    pub access: Access,
    pub otp: Option<String>,
}

/// Inputs of one API documentation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentationRequest {
    pub root: PathBuf,
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Directory depth of `destination` below the documentation root.
    pub depth: usize,
}

/// Registry client: staleness, packing, publishing and the test gate.
#[async_trait]
pub trait PackageRegistry: Send + Sync {
    /// Reinstalls the dependencies of the unit at `root` from a clean slate.
    async fn install(&self, root: &Path, display: &Display) -> Result<()>;

    /// Lists the declared dependencies of the unit at `root` with their state.
    async fn outdated(&self, root: &Path) -> Result<Vec<DependencyState>>;

    /// Packs the unit at `root`, writing the artifact into `into`.
    async fn pack(&self, root: &Path, into: &Path, display: &Display) -> Result<()>;

    async fn publish(&self, request: &PublishRequest, display: &Display) -> Result<()>;

    /// Runs the test command; `Ok(false)` means the tests failed.
    async fn run_tests(&self, root: &Path, display: &Display) -> Result<bool>;

    /// Version of the runtime the unit is prepared with.
    async fn runtime_version(&self) -> Result<Version>;
}

#[async_trait]
pub trait Bundler: Send + Sync {
    /// Builds every config once.
    async fn run(&self, configs: &[DistributionConfig], display: &Display) -> Result<()>;

    /// Rebuilds on source changes until stopped.
    async fn watch(&self, configs: &[DistributionConfig], display: &Display) -> Result<()>;
}

#[async_trait]
pub trait Documenter: Send + Sync {
    /// Resets `destination` and copies the shared theme assets into it.
    async fn common_assets(&self, destination: &Path, display: &Display) -> Result<()>;

    async fn api(&self, request: &DocumentationRequest, display: &Display) -> Result<()>;

    /// Text pages for `destination`, sourced from `source`.
    async fn text(&self, source: &Path, destination: &Path, display: &Display) -> Result<()>;
}

#[async_trait]
pub trait Fixer: Send + Sync {
    async fn fix(&self, root: &Path, display: &Display) -> Result<()>;
}

/// Multi-unit workspace management.
#[async_trait]
pub trait WorkspaceTool: Send + Sync {
    /// Absolute roots of the workspace members, in the tool's order.
    async fn discover(&self, root: &Path) -> Result<Vec<PathBuf>>;

    /// Installs member dependencies and links siblings.
    async fn bootstrap(&self, root: &Path, display: &Display) -> Result<()>;

    /// Sets every member to `version`.
    async fn sync_version(&self, root: &Path, version: &Version, display: &Display) -> Result<()>;
}

/// Interactive questions.
#[async_trait]
pub trait Prompter: Send + Sync {
    /// Asks for a one-time password; `None` when the user gives no answer.
    async fn otp(&self, message: &str) -> Result<Option<String>>;

    async fn confirm(&self, message: &str) -> Result<bool>;
}

/// The full set of collaborators for one run.
#[derive(Clone)]
pub struct Toolchain {
    pub registry: Arc<dyn PackageRegistry>,
    pub bundler: Arc<dyn Bundler>,
    pub documenter: Arc<dyn Documenter>,
    pub fixer: Arc<dyn Fixer>,
    pub workspace: Arc<dyn WorkspaceTool>,
    pub prompter: Arc<dyn Prompter>,
}
