//! Final run summary printed to stdout.

use std::time::Duration;

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use flatload_load::LoadCounters;

pub fn print_summary(table_name: &str, counters: &LoadCounters, elapsed: Duration) {
    println!("Target table: {table_name}");
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![header_cell("Metric"), header_cell("Count")]);
    if let Some(column) = table.column_mut(1) {
        column.set_cell_alignment(CellAlignment::Right);
    }
    table.add_row(vec![Cell::new("Lines read"), Cell::new(counters.lines_read)]);
    table.add_row(vec![
        Cell::new("Rows inserted"),
        Cell::new(counters.rows_inserted)
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![Cell::new("Rows rejected"), rejected_cell(counters)]);
    table.add_row(vec![
        Cell::new("Elapsed"),
        Cell::new(format!("{:.2}s", elapsed.as_secs_f64())),
    ]);
    println!("{table}");
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn rejected_cell(counters: &LoadCounters) -> Cell {
    if counters.rows_rejected > 0 {
        Cell::new(counters.rows_rejected)
            .fg(Color::Red)
            .add_attribute(Attribute::Bold)
    } else {
        Cell::new(counters.rows_rejected).fg(Color::DarkGrey)
    }
}
