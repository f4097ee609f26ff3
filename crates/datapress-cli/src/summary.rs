use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::types::RunOutcome;

pub fn print_summary(outcome: &RunOutcome) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Dataset"),
        header_cell("Records"),
        header_cell("Outputs"),
        header_cell("Notes"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);

    let mut total_records = 0usize;
    for report in &outcome.reports {
        total_records += report.records;
        let outputs = report
            .outputs
            .iter()
            .map(|path| path.display().to_string())
            .collect::<Vec<_>>()
            .join("\n");
        table.add_row(vec![
            Cell::new(&report.name)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(report.records),
            Cell::new(outputs),
            notes_cell(&report.notes),
        ]);
    }
    if outcome.reports.len() > 1 {
        table.add_row(vec![
            Cell::new("TOTAL")
                .fg(Color::Cyan)
                .add_attribute(Attribute::Bold),
            Cell::new(total_records).add_attribute(Attribute::Bold),
            dim_cell("-"),
            dim_cell("-"),
        ]);
    }
    println!("{table}");

    if !outcome.errors.is_empty() {
        eprintln!("Errors:");
        for error in &outcome.errors {
            eprintln!("- {error}");
        }
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn notes_cell(notes: &[String]) -> Cell {
    if notes.is_empty() {
        dim_cell("-")
    } else {
        Cell::new(notes.join("\n"))
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
