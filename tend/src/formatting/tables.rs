//! Table formatting utilities using comfy-table.

use comfy_table::{Cell, Table};

use tend_core::UnitSummary;

fn styled_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    let header_cells: Vec<Cell> = headers
        .iter()
        .map(|h| Cell::new(*h).add_attribute(comfy_table::Attribute::Bold))
        .collect();
    table
        .set_header(header_cells)
        .load_preset(comfy_table::presets::UTF8_FULL)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS)
        .set_content_arrangement(comfy_table::ContentArrangement::Dynamic);
    table
}

/// Prints a table with custom headers and rows.
///
/// The first column is the row's name and stands out; the others are right-aligned.
pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let mut table = styled_table(headers);
    for row in rows {
        let cells: Vec<Cell> = row
            .iter()
            .enumerate()
            .map(|(index, value)| {
                if index == 0 {
                    Cell::new(value).fg(comfy_table::Color::Yellow)
                } else {
                    Cell::new(value).set_alignment(comfy_table::CellAlignment::Right)
                }
            })
            .collect();
        table.add_row(cells);
    }

    println!("{}", table);
}

/// Prints the publishable units of a repository.
pub fn print_unit_table(units: &[UnitSummary]) {
    let mut table = styled_table(&["Package", "Path", "Version"]);
    for unit in units {
        table.add_row(vec![
            Cell::new(&unit.name).fg(comfy_table::Color::White),
            Cell::new(&unit.path).fg(comfy_table::Color::DarkGrey),
            Cell::new(unit.version.as_deref().unwrap_or("-")).fg(comfy_table::Color::Cyan),
        ]);
    }

    println!("{}", table);
}
