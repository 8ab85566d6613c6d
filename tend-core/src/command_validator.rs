//! Validation of commands declared in configuration.

use crate::error::{Error, Result};

const MAX_COMMAND_LENGTH: usize = 10_000;

/// Validates shell command lines before they are handed to `sh -c`.
///
/// Hook and toolchain commands come from `tend.toml`; a malformed line is a
/// configuration error and must be rejected before any task runs.
#[derive(Debug, Clone, Default)]
pub struct CommandValidator;

impl CommandValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validates a command line.
    ///
    /// # Errors
    ///
    /// Returns an error if the command is empty, too long, or contains control
    /// characters. Shell operators are allowed since lines run through `sh -c`.
    pub fn validate(&self, field: &str, command: &str) -> Result<()> {
        if command.trim().is_empty() {
            return Err(Error::invalid(field, "command cannot be empty"));
        }

        if command.len() > MAX_COMMAND_LENGTH {
            return Err(Error::invalid(
                field,
                format!("command exceeds {} characters", MAX_COMMAND_LENGTH),
            ));
        }

        if command.contains('\0') || command.contains('\n') || command.contains('\r') {
            return Err(Error::invalid(
                field,
                "command must be a single line without control characters",
            ));
        }

        Ok(())
    }
}
