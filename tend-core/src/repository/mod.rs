//! Repository shapes and the task bodies they supply.

mod multi;
mod single;

pub use multi::{MultiUnit, Subpackage};
pub use single::SingleUnit;

use std::future::Future;
use std::path::{Path, PathBuf};

use semver::Version;
use tracing::debug;

use crate::collaborator::{Prompter, Toolchain};
use crate::context::OrchestrationContext;
use crate::distribution::{self, DistributionConfig};
use crate::error::{Error, Result};
use crate::hooks::Hook;
use crate::options::RepositoryType;
use crate::orchestrator::TaskOrchestrator;
use crate::outdated::OutdatedReport;
use crate::paths::MANIFEST_FILE;
use crate::publish::{self, PublishMode, PublishPlan};
use crate::reporter::Display;
use crate::task::Task;

/// State shared by every task body of a run.
pub(crate) struct Session {
    pub(crate) context: OrchestrationContext,
    pub(crate) toolchain: Toolchain,
    pub(crate) orchestrator: TaskOrchestrator,
}

impl Session {
    pub(crate) fn display(&self) -> &Display {
        self.orchestrator.display()
    }

    pub(crate) fn root(&self) -> &Path {
        self.context.root()
    }

    pub(crate) fn relative(&self, path: &Path) -> String {
        self.context.paths().relativize(path)
    }

    /// Cleans previous outputs, bundles once, then drops untouched decoys.
    pub(crate) async fn bundle(&self, configs: &[DistributionConfig]) -> Result<()> {
        self.announce_targets(configs);
        distribution::clean_outputs(configs)?;

        self.display().print("Build distributions");
        self.toolchain.bundler.run(configs, self.display()).await?;

        let removed = distribution::remove_decoys(configs)?;
        debug!(removed, "removed decoy outputs");
        Ok(())
    }

    /// Cleans previous outputs and hands the configs to the bundler's watch mode.
    pub(crate) async fn watch(&self, configs: &[DistributionConfig]) -> Result<()> {
        self.announce_targets(configs);
        distribution::clean_outputs(configs)?;

        self.display().print("Start watching distributions");
        self.toolchain.bundler.watch(configs, self.display()).await?;

        distribution::remove_decoys(configs)?;
        Ok(())
    }

    fn announce_targets(&self, configs: &[DistributionConfig]) {
        for config in configs {
            self.display().echo(&format!(
                "Add {} distribution in {}",
                config.target_kind.label(),
                self.relative(&config.output_path)
            ));
        }
    }

    pub(crate) async fn outdated_in(&self, root: &Path) -> Result<()> {
        let manifest = root.join(MANIFEST_FILE);
        self.display().print(&format!(
            "Checking {} for outdated dependencies",
            self.relative(&manifest)
        ));

        let dependencies = self.toolchain.registry.outdated(root).await?;
        OutdatedReport::new(root, dependencies).render(self.display());
        Ok(())
    }
}

/// Summary printed by `tend --info`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryDescription {
    pub repository_type: RepositoryType,
    pub root: PathBuf,
    pub version: Option<String>,
    pub units: Vec<UnitSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitSummary {
    pub name: String,
    pub path: String,
    pub version: Option<String>,
}

/// A managed repository.
pub enum Repository {
    Single(SingleUnit),
    Multi(MultiUnit),
}

impl Repository {
    /// Opens the repository described by `context`.
    ///
    /// Multi-unit repositories discover their members here, once.
    pub async fn open(
        context: OrchestrationContext,
        toolchain: Toolchain,
        display: Display,
    ) -> Result<Self> {
        let orchestrator = TaskOrchestrator::new(display, context.root());
        let repository_type = context.repository_type();
        let session = Session {
            context,
            toolchain,
            orchestrator,
        };

        match repository_type {
            RepositoryType::SinglePackage => Ok(Repository::Single(SingleUnit::new(session))),
            RepositoryType::MultiPackage => Ok(Repository::Multi(MultiUnit::discover(session).await?)),
        }
    }

    fn session(&self) -> &Session {
        match self {
            Repository::Single(unit) => &unit.session,
            Repository::Multi(unit) => &unit.session,
        }
    }

    pub fn context(&self) -> &OrchestrationContext {
        &self.session().context
    }

    pub fn display(&self) -> &Display {
        self.session().display()
    }

    pub fn prompter(&self) -> &dyn Prompter {
        self.session().toolchain.prompter.as_ref()
    }

    /// The declared version of the repository.
    pub fn version(&self) -> Result<Version> {
        match self {
            Repository::Single(unit) => unit.version(),
            Repository::Multi(unit) => unit.version(),
        }
    }

    /// Roots of every publishable unit, in publication order.
    pub fn unit_roots(&self) -> Vec<PathBuf> {
        match self {
            Repository::Single(unit) => vec![unit.session.root().to_path_buf()],
            Repository::Multi(unit) => unit.member_roots(),
        }
    }

    pub fn describe(&self) -> Result<RepositoryDescription> {
        match self {
            Repository::Single(unit) => unit.describe(),
            Repository::Multi(unit) => unit.describe(),
        }
    }

    async fn run<F>(&self, task: Task, grouped: bool, body: F) -> Result<()>
    where
        F: Future<Output = Result<()>>,
    {
        let session = self.session();
        session
            .orchestrator
            .run(task, session.context.hooks(task), grouped, body)
            .await
    }

    pub async fn install(&self, grouped: bool) -> Result<()> {
        self.run(Task::Install, grouped, async {
            match self {
                Repository::Single(unit) => unit.install().await,
                Repository::Multi(unit) => unit.install().await,
            }
        })
        .await
    }

    pub async fn outdated(&self, grouped: bool) -> Result<()> {
        self.run(Task::Outdated, grouped, async {
            match self {
                Repository::Single(unit) => unit.outdated().await,
                Repository::Multi(unit) => unit.outdated().await,
            }
        })
        .await
    }

    /// Builds every distribution. Nothing happens without `dist` options.
    pub async fn build(&self, grouped: bool) -> Result<()> {
        self.run(Task::Build, grouped, async {
            let configs = self.derive()?;
            if configs.is_empty() {
                return Ok(());
            }
            self.session().bundle(&configs).await
        })
        .await
    }

    pub async fn watch(&self, grouped: bool) -> Result<()> {
        self.run(Task::Watch, grouped, async {
            let configs = self.derive()?;
            if configs.is_empty() {
                return Ok(());
            }
            self.session().watch(&configs).await
        })
        .await
    }

    /// Derives the configs for the current options, fresh on every call.
    pub fn derive(&self) -> Result<Vec<DistributionConfig>> {
        let Some(options) = self.context().dist() else {
            return Ok(Vec::new());
        };

        match self {
            Repository::Single(unit) => distribution::derive(options, &unit.distribution_unit(options)?),
            Repository::Multi(unit) => {
                distribution::derive_for_units(options, &unit.distribution_units()?)
            }
        }
    }

    pub async fn fix(&self, grouped: bool) -> Result<()> {
        self.run(Task::Fix, grouped, async {
            let session = self.session();
            session.display().print("Fix code");
            session
                .toolchain
                .fixer
                .fix(session.root(), session.display())
                .await
        })
        .await
    }

    pub async fn documentation(&self, grouped: bool) -> Result<()> {
        self.run(Task::Documentation, grouped, async {
            let session = self.session();
            let destination = session.context.paths().documentation();
            session.display().print("Copy documentation common assets");
            session
                .toolchain
                .documenter
                .common_assets(&destination, session.display())
                .await?;

            match self {
                Repository::Single(unit) => unit.documentation().await,
                Repository::Multi(unit) => unit.documentation().await,
            }
        })
        .await
    }

    pub async fn prepare(&self, grouped: bool) -> Result<()> {
        self.run(Task::Prepare, grouped, async {
            match self {
                Repository::Single(unit) => unit.prepare().await,
                Repository::Multi(unit) => unit.prepare().await,
            }
        })
        .await
    }

    /// Build, prepare and documentation as grouped steps, then `tail`.
    pub async fn rebuild(&self, grouped: bool, tail: Option<&Hook>) -> Result<()> {
        self.run(Task::Rebuild, grouped, async {
            self.build(true).await?;
            self.prepare(true).await?;
            self.documentation(true).await?;
            if let Some(tail) = tail {
                tail.invoke(Task::Rebuild, self.display(), self.session().root())
                    .await?;
            }
            Ok(())
        })
        .await
    }

    pub async fn publish(&self, mode: PublishMode, grouped: bool) -> Result<()> {
        let task = match mode {
            PublishMode::Safe => Task::Publish,
            PublishMode::Unsafe => Task::PublishUnsafe,
        };
        self.run(task, grouped, self.publish_body(mode)).await
    }

    async fn publish_body(&self, mode: PublishMode) -> Result<()> {
        let session = self.session();
        let display = session.display();
        let registry = session.toolchain.registry.as_ref();

        if mode == PublishMode::Safe {
            self.outdated(true).await?;
            self.rebuild(true, None).await?;

            display.print("Run tests");
            if !registry.run_tests(session.root(), display).await? {
                return Err(Error::TestsFailed);
            }
        }

        let version = self.version()?;
        let tag = publish::tag_for(&version);

        let scratch = tempfile::Builder::new()
            .prefix("tend-package-tarball-")
            .tempdir()?;

        let mut artifacts = Vec::new();
        for root in self.unit_roots() {
            display.print(&format!("Pack package in {}", session.relative(&root)));
            artifacts.push(publish::pack(registry, &root, scratch.path(), display).await?);
        }

        let authorization = publish::authorize(
            session.toolchain.prompter.as_ref(),
            session.context.publish(),
            display,
        )
        .await?;

        let plan = PublishPlan {
            tag: tag.to_string(),
            restricted: session.context.publish().restricted,
            authorization,
            artifacts,
        };
        publish::submit(registry, &plan, display).await
    }
}
