//! Terminal formatting for banners, status lines and tables.
//!
//! Every line the orchestrator reports goes through these helpers so the
//! colors and indentation stay consistent.

mod headers;
mod output;
mod status;
mod tables;

pub use headers::{print_section_header, SectionStyle};
pub use output::{print_banner, print_echo, print_key_value, print_step};
pub use status::{print_cancelled, print_error, print_success, print_warning};
pub use tables::{print_table, print_unit_table};
