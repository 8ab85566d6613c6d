//! Core library for package repository lifecycle orchestration.

pub mod collaborator;
pub mod command_validator;
pub mod context;
pub mod distribution;
pub mod error;
pub mod hooks;
pub mod manager;
pub mod manifest;
pub mod options;
pub mod orchestrator;
pub mod outdated;
pub mod paths;
pub mod publish;
pub mod reporter;
pub mod repository;
pub mod shell;
pub mod task;

pub use collaborator::{
    Access, Bundler, DocumentationRequest, Documenter, Fixer, PackageRegistry, Prompter,
    PublishRequest, Toolchain, WorkspaceTool,
};
pub use command_validator::CommandValidator;
pub use context::{ContextBuilder, OrchestrationContext, PublishFlags};
pub use distribution::{
    DistributionConfig, DistributionUnit, Entry, PresetTargets, TargetKind, TransformRule,
    TransformStep,
};
pub use error::{Error, Result};
pub use hooks::{Hook, HookContext, TaskHooks};
pub use manager::dispatch;
pub use manifest::Manifest;
pub use options::{
    BrowserOptions, BrowserType, DistributionOptions, ManagerConfig, NodeOptions, NodeType,
    RepositoryType, SyntaxType, ToolchainConfig,
};
pub use orchestrator::TaskOrchestrator;
pub use outdated::{DependencyState, Freshness, OutdatedReport};
pub use publish::{Artifact, Authorization, PublishMode, PublishPlan};
pub use reporter::{Display, MemoryReporter, ReportLine, Reporter};
pub use repository::{Repository, RepositoryDescription, Subpackage, UnitSummary};
pub use shell::{CommandOutput, ShellCommand};
pub use task::Task;
