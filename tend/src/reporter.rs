//! Terminal implementation of the core reporter.

use tend_core::Reporter;

use crate::formatting::{
    print_banner, print_echo, print_section_header, print_step, print_success, print_table,
    print_warning, SectionStyle,
};

/// Writes every report line to stdout with colors.
#[derive(Debug, Default)]
pub struct TerminalReporter;

impl Reporter for TerminalReporter {
    fn title_box(&self, text: &str) {
        print_section_header(text, SectionStyle::Primary);
    }

    fn info_box(&self, text: &str) {
        print_section_header(text, SectionStyle::Secondary);
    }

    fn echo(&self, text: &str) {
        print_echo(text);
    }

    fn print(&self, text: &str) {
        print_step(text);
    }

    fn success(&self, text: &str) {
        print_success(text);
    }

    fn warning(&self, text: &str) {
        print_warning(text);
    }

    fn table(&self, headers: &[&str], rows: &[Vec<String>]) {
        print_table(headers, rows);
    }

    fn completion_box(&self, text: &str) {
        print_banner(text);
    }
}
