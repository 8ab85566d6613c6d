//! Section header formatting with visual separators.

use owo_colors::OwoColorize;

/// Style options for section headers.
#[derive(Debug, Clone, Copy)]
pub enum SectionStyle {
    /// Top-level task banner.
    Primary,
    /// Nested task banner and hook announcements.
    Secondary,
}

impl SectionStyle {
    fn colorize(&self, text: &str) -> String {
        match self {
            SectionStyle::Primary => text.cyan().bold().to_string(),
            SectionStyle::Secondary => text.blue().bold().to_string(),
        }
    }
}

/// Prints a section header with visual separator.
pub fn print_section_header(title: &str, style: SectionStyle) {
    match style {
        SectionStyle::Primary => {
            let rule = "─".repeat(title.chars().count() + 4);
            println!();
            println!("{}", format!("┌{}┐", rule).bright_black());
            println!("{}  {}  {}", "│".bright_black(), style.colorize(title), "│".bright_black());
            println!("{}", format!("└{}┘", rule).bright_black());
            println!();
        }
        SectionStyle::Secondary => {
            println!();
            println!("{} {}", "▸".bright_black(), style.colorize(title));
        }
    }
}
