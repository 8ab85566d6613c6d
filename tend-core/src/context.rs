//! Immutable per-run orchestration state.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::hooks::{Hook, TaskHooks};
use crate::options::{DistributionOptions, ManagerConfig, RepositoryType};
use crate::paths::RepositoryPaths;
use crate::task::Task;

/// Publication flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishFlags {
    /// Publish with `--access=restricted` instead of public.
    pub restricted: bool,
    /// Ask for a one-time password instead of a yes/no confirmation.
    pub use_otp: bool,
}

impl Default for PublishFlags {
    fn default() -> Self {
        Self {
            restricted: false,
            use_otp: true,
        }
    }
}

/// Everything a run needs to know, validated once and never mutated.
///
/// Construct it with [`OrchestrationContext::builder`] or
/// [`OrchestrationContext::from_config`]; both validate before returning.
#[derive(Debug, Clone)]
pub struct OrchestrationContext {
    repository_type: RepositoryType,
    paths: RepositoryPaths,
    dist: Option<DistributionOptions>,
    tasks: HashMap<Task, TaskHooks>,
    publish: PublishFlags,
}

impl OrchestrationContext {
    pub fn builder(repository_type: RepositoryType, root: impl Into<PathBuf>) -> ContextBuilder {
        ContextBuilder {
            repository_type,
            root: root.into(),
            dist: None,
            tasks: HashMap::new(),
            publish: PublishFlags::default(),
        }
    }

    /// Builds a context from a parsed `tend.toml`.
    ///
    /// Hook command lines become [`Hook::Command`] entries.
    pub fn from_config(config: &ManagerConfig, root: impl Into<PathBuf>) -> Result<Self> {
        config.validate()?;

        let mut builder = Self::builder(config.repository_type, root)
            .restricted(config.restricted)
            .use_otp(config.use_otp);

        if let Some(dist) = &config.dist {
            builder = builder.dist(dist.clone());
        }

        for (task, hooks) in &config.tasks {
            let mut task_hooks = TaskHooks::new();
            if let Some(line) = &hooks.pre_run {
                task_hooks = task_hooks.with_pre_run(Hook::command(line.clone()));
            }
            if let Some(line) = &hooks.post_run {
                task_hooks = task_hooks.with_post_run(Hook::command(line.clone()));
            }
            builder = builder.hooks(*task, task_hooks);
        }

        builder.build()
    }

    pub fn repository_type(&self) -> RepositoryType {
        self.repository_type
    }

    pub fn root(&self) -> &Path {
        self.paths.root()
    }

    pub fn paths(&self) -> &RepositoryPaths {
        &self.paths
    }

    pub fn dist(&self) -> Option<&DistributionOptions> {
        self.dist.as_ref()
    }

    /// Hooks registered for `task`, falling back to the shared entry for variants.
    pub fn hooks(&self, task: Task) -> Option<&TaskHooks> {
        self.tasks.get(&task.hooks_key())
    }

    pub fn publish(&self) -> PublishFlags {
        self.publish
    }
}

/// Builder for [`OrchestrationContext`].
#[derive(Debug)]
pub struct ContextBuilder {
    repository_type: RepositoryType,
    root: PathBuf,
    dist: Option<DistributionOptions>,
    tasks: HashMap<Task, TaskHooks>,
    publish: PublishFlags,
}

impl ContextBuilder {
    pub fn dist(mut self, dist: DistributionOptions) -> Self {
        self.dist = Some(dist);
        self
    }

    /// Registers hooks for a task. `publish:unsafe` hooks are stored under `publish`.
    pub fn hooks(mut self, task: Task, hooks: TaskHooks) -> Self {
        self.tasks.insert(task.hooks_key(), hooks);
        self
    }

    pub fn restricted(mut self, restricted: bool) -> Self {
        self.publish.restricted = restricted;
        self
    }

    pub fn use_otp(mut self, use_otp: bool) -> Self {
        self.publish.use_otp = use_otp;
        self
    }

    /// Validates the distribution options and freezes the context.
    pub fn build(self) -> Result<OrchestrationContext> {
        if let Some(dist) = &self.dist {
            dist.validate()?;

            if self.repository_type == RepositoryType::MultiPackage
                && (dist.source.is_some() || dist.destination.is_some())
            {
                return Err(Error::Unsupported {
                    operation: "Custom 'dist.source' or 'dist.destination'",
                    repository: RepositoryType::MultiPackage.as_str(),
                });
            }
        }

        Ok(OrchestrationContext {
            repository_type: self.repository_type,
            paths: RepositoryPaths::new(self.root),
            dist: self.dist,
            tasks: self.tasks,
            publish: self.publish,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{BrowserOptions, HookConfig};

    #[test]
    fn test_builder_rejects_invalid_dist() {
        let dist = DistributionOptions {
            browser: Some(vec![]),
            ..Default::default()
        };
        let result = OrchestrationContext::builder(RepositoryType::SinglePackage, "/repo")
            .dist(dist)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_multi_package_rejects_custom_directories() {
        let dist = DistributionOptions {
            source: Some(PathBuf::from("lib")),
            browser: Some(vec![BrowserOptions::module()]),
            ..Default::default()
        };
        let result = OrchestrationContext::builder(RepositoryType::MultiPackage, "/repo")
            .dist(dist)
            .build();
        assert!(matches!(result, Err(Error::Unsupported { .. })));
    }

    #[test]
    fn test_unsafe_publish_reads_publish_hooks() {
        let context = OrchestrationContext::builder(RepositoryType::SinglePackage, "/repo")
            .hooks(
                Task::PublishUnsafe,
                TaskHooks::new().with_pre_run(Hook::command("true")),
            )
            .build()
            .unwrap();

        assert!(context.hooks(Task::Publish).is_some());
        assert!(context.hooks(Task::PublishUnsafe).is_some());
        assert!(context.hooks(Task::Build).is_none());
    }

    #[test]
    fn test_from_config_turns_lines_into_command_hooks() {
        let mut config = ManagerConfig::new(RepositoryType::MultiPackage);
        config.restricted = true;
        config.use_otp = false;
        config.dist = Some(DistributionOptions {
            browser: Some(vec![BrowserOptions::module()]),
            ..Default::default()
        });
        config.tasks.insert(
            Task::Build,
            HookConfig {
                pre_run: Some("echo before".to_string()),
                post_run: None,
            },
        );

        let context = OrchestrationContext::from_config(&config, "/repo").unwrap();
        let hooks = context.hooks(Task::Build).unwrap();

        assert!(matches!(&hooks.pre_run, Some(Hook::Command(line)) if line == "echo before"));
        assert!(hooks.post_run.is_none());
        assert!(context.publish().restricted);
        assert!(!context.publish().use_otp);
        assert_eq!(context.repository_type(), RepositoryType::MultiPackage);
    }
}
