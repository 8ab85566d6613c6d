//! Lifecycle task identifiers and their display data.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A named lifecycle task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    Install,
    Outdated,
    Build,
    Watch,
    Fix,
    Documentation,
    Prepare,
    Rebuild,
    Publish,
    #[serde(rename = "publish:unsafe", alias = "publish-unsafe")]
    PublishUnsafe,
}

impl Task {
    pub const ALL: [Task; 10] = [
        Task::Install,
        Task::Outdated,
        Task::Build,
        Task::Watch,
        Task::Fix,
        Task::Documentation,
        Task::Prepare,
        Task::Rebuild,
        Task::Publish,
        Task::PublishUnsafe,
    ];

    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Task::Install => "install",
            Task::Outdated => "outdated",
            Task::Build => "build",
            Task::Watch => "watch",
            Task::Fix => "fix",
            Task::Documentation => "documentation",
            Task::Prepare => "prepare",
            Task::Rebuild => "rebuild",
            Task::Publish => "publish",
            Task::PublishUnsafe => "publish:unsafe",
        }
    }

    /// Parses a task name as given on the command line.
    ///
    /// Returns `None` for anything unrecognized; the front door treats that as a no-op.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim() {
            "install" => Some(Task::Install),
            "outdated" => Some(Task::Outdated),
            "build" => Some(Task::Build),
            "watch" => Some(Task::Watch),
            "fix" => Some(Task::Fix),
            "documentation" => Some(Task::Documentation),
            "prepare" => Some(Task::Prepare),
            "rebuild" => Some(Task::Rebuild),
            "publish" => Some(Task::Publish),
            "publish:unsafe" | "publish-unsafe" => Some(Task::PublishUnsafe),
            _ => None,
        }
    }

    /// Display name used as the prefix of nested banners.
    pub fn name(&self) -> &'static str {
        match self {
            Task::Install => "Install",
            Task::Outdated => "Outdated",
            Task::Build => "Build",
            Task::Watch => "Watch",
            Task::Fix => "Fix",
            Task::Documentation => "Documentation",
            Task::Prepare => "Prepare",
            Task::Rebuild => "Rebuild",
            Task::Publish | Task::PublishUnsafe => "Publish",
        }
    }

    pub fn banner(&self) -> &'static str {
        match self {
            Task::Install => "Install extra stuff",
            Task::Outdated => "Check for outdated package dependencies",
            Task::Build => "Generate package distributions",
            Task::Watch => "Watch changes in sources",
            Task::Fix => "Fix code",
            Task::Documentation => "Generate documentation",
            Task::Prepare => "Prepare package for publication",
            Task::Rebuild => "Rebuild package",
            Task::Publish => "Publish package",
            Task::PublishUnsafe => "Publish package (unsafe)",
        }
    }

    /// The task whose hooks apply to this one.
    ///
    /// The unsafe publish variant shares the `publish` hooks.
    pub fn hooks_key(&self) -> Task {
        match self {
            Task::PublishUnsafe => Task::Publish,
            other => *other,
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
