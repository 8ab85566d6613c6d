//! Trait for reporting orchestration progress.

use std::sync::{Arc, Mutex};

/// Trait for user-facing output.
///
/// This trait allows the core library to announce banners and progress without
/// directly writing to stdout/stderr. Hooks receive the same handle.
pub trait Reporter: Send + Sync {
    /// Top-level banner for a task the user invoked directly.
    fn title_box(&self, text: &str);

    /// Nested banner for a grouped task or a hook announcement.
    fn info_box(&self, text: &str);

    /// Plain line of secondary text.
    fn echo(&self, text: &str);

    /// Progress line for a step within a task body.
    fn print(&self, text: &str);

    fn success(&self, text: &str);

    fn warning(&self, text: &str);

    /// Renders rows under a header line.
    fn table(&self, headers: &[&str], rows: &[Vec<String>]);

    /// Final banner emitted once after dispatch.
    fn completion_box(&self, text: &str);
}

/// Shared display handle passed to task bodies and hooks.
pub type Display = Arc<dyn Reporter>;

/// One line captured by [`MemoryReporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportLine {
    Title(String),
    Info(String),
    Echo(String),
    Print(String),
    Success(String),
    Warning(String),
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    Completion(String),
}

/// Reporter that keeps every line in memory.
///
/// Used by embedders that render output themselves, and by tests.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    lines: Mutex<Vec<ReportLine>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<ReportLine> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    fn push(&self, line: ReportLine) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line);
        }
    }
}

impl Reporter for MemoryReporter {
    fn title_box(&self, text: &str) {
        self.push(ReportLine::Title(text.to_string()));
    }

    fn info_box(&self, text: &str) {
        self.push(ReportLine::Info(text.to_string()));
    }

    fn echo(&self, text: &str) {
        self.push(ReportLine::Echo(text.to_string()));
    }

    fn print(&self, text: &str) {
        self.push(ReportLine::Print(text.to_string()));
    }

    fn success(&self, text: &str) {
        self.push(ReportLine::Success(text.to_string()));
    }

    fn warning(&self, text: &str) {
        self.push(ReportLine::Warning(text.to_string()));
    }

    fn table(&self, headers: &[&str], rows: &[Vec<String>]) {
        self.push(ReportLine::Table {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows.to_vec(),
        });
    }

    fn completion_box(&self, text: &str) {
        self.push(ReportLine::Completion(text.to_string()));
    }
}
