use std::fs;
use std::path::{Path, PathBuf};

use semver::Version;
use tracing::{debug, info};

use super::{RepositoryDescription, Session, UnitSummary};
use crate::collaborator::DocumentationRequest;
use crate::distribution::DistributionUnit;
use crate::error::Result;
use crate::manifest::{self, Manifest};
use crate::paths::{normalize, DISTRIBUTIONS_DIR, LOCK_FILE, SOURCES_DIR};

/// One workspace member, with paths relative to the repository root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subpackage {
    pub root: PathBuf,
    pub source_path: PathBuf,
    pub destination_path: PathBuf,
    /// Directory name of the member.
    pub name: String,
}

impl Subpackage {
    /// Builds a member from the absolute root the workspace tool reported.
    pub fn from_absolute(repository_root: &Path, absolute: &Path) -> Self {
        let absolute = normalize(absolute);
        let root = absolute
            .strip_prefix(repository_root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| absolute.clone());
        let name = absolute
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Self {
            source_path: root.join(SOURCES_DIR),
            destination_path: root.join(DISTRIBUTIONS_DIR),
            root,
            name,
        }
    }
}

/// A workspace of interdependent units.
pub struct MultiUnit {
    pub(crate) session: Session,
    subpackages: Vec<Subpackage>,
}

impl MultiUnit {
    pub(crate) async fn discover(session: Session) -> Result<Self> {
        let root = session.root().to_path_buf();
        let subpackages: Vec<Subpackage> = session
            .toolchain
            .workspace
            .discover(&root)
            .await?
            .iter()
            .map(|absolute| Subpackage::from_absolute(&root, absolute))
            .collect();

        info!(members = subpackages.len(), "discovered workspace members");
        Ok(Self {
            session,
            subpackages,
        })
    }

    pub fn subpackages(&self) -> &[Subpackage] {
        &self.subpackages
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        self.session.root().join(path)
    }

    pub(crate) fn member_roots(&self) -> Vec<PathBuf> {
        self.subpackages
            .iter()
            .map(|subpackage| self.absolute(&subpackage.root))
            .collect()
    }

    /// The version in the root `lerna.json`.
    pub(crate) fn version(&self) -> Result<Version> {
        manifest::read_version(&self.session.context.paths().workspace())
    }

    pub(crate) fn distribution_units(&self) -> Result<Vec<DistributionUnit>> {
        self.subpackages
            .iter()
            .map(|subpackage| {
                let root = self.absolute(&subpackage.root);
                let manifest = Manifest::load(&root)?;
                let name = manifest.name().unwrap_or(&subpackage.name).to_string();
                Ok(DistributionUnit::for_member(&root, name)
                    .with_engine_range(manifest.engine_range().map(str::to_string)))
            })
            .collect()
    }

    /// Drops member lock files, then lets the workspace tool bootstrap.
    pub(crate) async fn install(&self) -> Result<()> {
        let display = self.session.display();
        display.print("Install subpackages dependencies and link siblings");

        let members = self.session.context.paths().subpackages();
        if members.is_dir() {
            for entry in fs::read_dir(&members)? {
                let lock = entry?.path().join(LOCK_FILE);
                if lock.is_file() {
                    fs::remove_file(&lock)?;
                    debug!(path = %lock.display(), "removed lock file");
                }
            }
        }

        self.session
            .toolchain
            .workspace
            .bootstrap(self.session.root(), display)
            .await
    }

    /// Checks each member in discovery order.
    pub(crate) async fn outdated(&self) -> Result<()> {
        for root in self.member_roots() {
            self.session.outdated_in(&root).await?;
        }
        Ok(())
    }

    pub(crate) async fn documentation(&self) -> Result<()> {
        let display = self.session.display();
        let documenter = &self.session.toolchain.documenter;
        let documentation = self.session.context.paths().documentation();

        for subpackage in &self.subpackages {
            let request = DocumentationRequest {
                root: self.absolute(&subpackage.root),
                source: self.absolute(&subpackage.source_path),
                destination: documentation.join(&subpackage.name),
                depth: 2,
            };

            display.print(&format!(
                "Build API documentation for {}",
                self.session.relative(&request.source)
            ));
            documenter.api(&request, display).await?;

            display.print(&format!(
                "Build text documentation for {}",
                self.session.relative(&request.source)
            ));
            documenter
                .text(&request.source, &request.destination, display)
                .await?;
        }
        Ok(())
    }

    /// Per member: license, engine pin and self-reference. Then one version sync.
    pub(crate) async fn prepare(&self) -> Result<()> {
        let display = self.session.display();
        let runtime = self.session.toolchain.registry.runtime_version().await?;

        for root in self.member_roots() {
            let license = manifest::copy_license(self.session.root(), &root)?;
            display.print(&format!(
                "Update license in {}",
                self.session.relative(&license)
            ));

            let mut manifest = Manifest::load(&root)?;
            manifest.pin_engine(&runtime);
            if manifest.sync_self_reference() {
                display.print(&format!(
                    "Update self-reference version in {}",
                    self.session.relative(manifest.path())
                ));
            }
            manifest.save()?;
        }

        let version = self.version()?;
        display.print(&format!("Update subpackages version to {}", version));
        self.session
            .toolchain
            .workspace
            .sync_version(self.session.root(), &version, display)
            .await
    }

    pub(crate) fn describe(&self) -> Result<RepositoryDescription> {
        let version = self.version().ok().map(|v| v.to_string());
        let units = self
            .subpackages
            .iter()
            .map(|subpackage| {
                let manifest = Manifest::load(&self.absolute(&subpackage.root)).ok();
                UnitSummary {
                    name: manifest
                        .as_ref()
                        .and_then(|m| m.name().map(str::to_string))
                        .unwrap_or_else(|| subpackage.name.clone()),
                    path: format!("./{}", subpackage.root.display()),
                    version: manifest.and_then(|m| m.version_str().map(str::to_string)),
                }
            })
            .collect();

        Ok(RepositoryDescription {
            repository_type: self.session.context.repository_type(),
            root: self.session.root().to_path_buf(),
            version,
            units,
        })
    }
}
