//! Error types and result aliases.

use std::path::PathBuf;

use thiserror::Error;

use crate::task::Task;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error in {context}: {error}")]
    Json {
        error: serde_json::Error,
        context: String,
    },

    #[error("TOML parse error in {context}: {error}")]
    Toml {
        error: toml::de::Error,
        context: String,
    },

    #[error("Invalid option '{field}': {message}")]
    InvalidOptions { field: String, message: String },

    #[error("Manifest not found: {0}. Expected a 'package.json' in the unit root.")]
    ManifestNotFound(PathBuf),

    #[error("No version declared in {0}")]
    VersionUnavailable(PathBuf),

    #[error("{task} hook failed: {message}")]
    Hook { task: Task, message: String },

    #[error("{tool} failed: {message}")]
    Command { tool: String, message: String },

    #[error("Tarball name mismatch '{}'", .0.display())]
    ArtifactNameMismatch(PathBuf),

    #[error("Test command failed, nothing was packed")]
    TestsFailed,

    #[error("{0}")]
    Cancelled(String),

    #[error("{operation} is not supported for {repository} repositories")]
    Unsupported {
        operation: &'static str,
        repository: &'static str,
    },

    #[error("Watcher error: {0}")]
    Watcher(String),
}

impl Error {
    pub(crate) fn json(error: serde_json::Error, context: impl Into<String>) -> Self {
        Error::Json {
            error,
            context: context.into(),
        }
    }

    pub(crate) fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidOptions {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether this error is a user-initiated cancellation rather than a failure.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Error::Cancelled(_))
    }
}

impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Error::Toml {
            error,
            context: "tend.toml".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
