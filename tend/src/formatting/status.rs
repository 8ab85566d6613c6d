//! One-line outcome messages: step results, cancellations and failures.

use owo_colors::OwoColorize;

/// How a task or one of its steps ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    Warning,
    /// The user declined; not a failure.
    Cancelled,
    Failed,
}

impl Outcome {
    fn marker(self) -> &'static str {
        match self {
            Outcome::Done => "✓",
            Outcome::Warning => "⚠",
            Outcome::Cancelled => "⊘",
            Outcome::Failed => "✗",
        }
    }

    /// Colored marker followed by `message`, indented under the current banner.
    pub fn line(self, message: &str) -> String {
        let marker = self.marker();
        match self {
            Outcome::Done => format!("  {} {}", marker.green(), message.green()),
            Outcome::Warning => format!("  {} {}", marker.yellow(), message.yellow().bold()),
            Outcome::Cancelled => format!("  {} {}", marker.dimmed(), message.bold()),
            Outcome::Failed => format!("  {} {}", marker.red(), message.red().bold()),
        }
    }
}

pub fn print_success(message: &str) {
    println!("{}", Outcome::Done.line(message));
}

pub fn print_warning(message: &str) {
    println!("{}", Outcome::Warning.line(message));
}

/// Printed on stdout; a cancelled run still exits successfully.
pub fn print_cancelled(message: &str) {
    println!("{}", Outcome::Cancelled.line(message));
}

/// Failures go to stderr so piped output stays clean.
pub fn print_error(message: &str) {
    eprintln!("{}", Outcome::Failed.line(message));
}
