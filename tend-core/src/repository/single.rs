use semver::Version;

use super::{RepositoryDescription, Session, UnitSummary};
use crate::collaborator::DocumentationRequest;
use crate::distribution::DistributionUnit;
use crate::error::Result;
use crate::manifest::{self, Manifest};
use crate::options::DistributionOptions;

/// A repository that is itself the one publishable unit.
pub struct SingleUnit {
    pub(crate) session: Session,
}

impl SingleUnit {
    pub(crate) fn new(session: Session) -> Self {
        Self { session }
    }

    fn manifest(&self) -> Result<Manifest> {
        Manifest::load(self.session.root())
    }

    pub(crate) fn version(&self) -> Result<Version> {
        self.manifest()?.version()
    }

    pub(crate) fn distribution_unit(&self, options: &DistributionOptions) -> Result<DistributionUnit> {
        let manifest = self.manifest()?;
        let name = manifest.name().unwrap_or_default().to_string();
        Ok(
            DistributionUnit::for_root(self.session.context.paths(), options, name)
                .with_engine_range(manifest.engine_range().map(str::to_string)),
        )
    }

    /// Reinstalls dependencies, then links the unit into its own
    /// `node_modules` when it depends on itself.
    pub(crate) async fn install(&self) -> Result<()> {
        let manifest = self.manifest()?;
        self.session
            .toolchain
            .registry
            .install(self.session.root(), self.session.display())
            .await?;

        if let (true, Some(name)) = (manifest.is_self_referencing(), manifest.name()) {
            manifest::link_self_reference(self.session.root(), name)?;
            self.session
                .display()
                .print("Symlink self-reference dependency");
        }
        Ok(())
    }

    pub(crate) async fn outdated(&self) -> Result<()> {
        self.session.outdated_in(self.session.root()).await
    }

    pub(crate) async fn documentation(&self) -> Result<()> {
        let paths = self.session.context.paths();
        let display = self.session.display();
        let documenter = &self.session.toolchain.documenter;
        let request = DocumentationRequest {
            root: paths.root().to_path_buf(),
            source: paths.sources(),
            destination: paths.documentation(),
            depth: 1,
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
            .await
    }

    /// Pins the runtime engine, then syncs the self-reference to the unit version.
    pub(crate) async fn prepare(&self) -> Result<()> {
        let runtime = self.session.toolchain.registry.runtime_version().await?;
        let mut manifest = self.manifest()?;
        let display = self.session.display();

        manifest.pin_engine(&runtime);
        display.print(&format!(
            "Update Node.js engine version in {}",
            self.session.relative(manifest.path())
        ));

        if manifest.sync_self_reference() {
            display.print(&format!(
                "Update self-reference version in {}",
                self.session.relative(manifest.path())
            ));
        }

        manifest.save()
    }

    pub(crate) fn describe(&self) -> Result<RepositoryDescription> {
        let manifest = self.manifest()?;
        let version = manifest.version_str().map(str::to_string);
        Ok(RepositoryDescription {
            repository_type: self.session.context.repository_type(),
            root: self.session.root().to_path_buf(),
            version: version.clone(),
            units: vec![UnitSummary {
                name: manifest.name().unwrap_or_default().to_string(),
                path: ".".to_string(),
                version,
            }],
        })
    }
}
