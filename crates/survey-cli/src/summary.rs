use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};
use survey_transform::RowResolutionWarning;

use crate::types::RenderResult;

/// Print the run summary to stderr so stdout stays reserved for the document.
pub fn print_summary(result: &RenderResult) {
    let outcome = &result.outcome;
    let document = &outcome.document;
    match &result.output {
        Some(path) => eprintln!("Output: {}", path.display()),
        None => eprintln!("Output: <stdout>"),
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Format"),
        header_cell("Rows"),
        header_cell("Records"),
        header_cell("Columns"),
        header_cell("Bytes"),
        header_cell("Warnings"),
        header_cell("SHA-256"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 1..=5 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    table.add_row(vec![
        Cell::new(result.format)
            .fg(Color::Blue)
            .add_attribute(Attribute::Bold),
        Cell::new(outcome.rows_seen),
        Cell::new(document.record_count),
        Cell::new(document.column_count),
        Cell::new(document.byte_len()),
        count_cell(outcome.warnings.len(), Color::Yellow),
        dim_cell(document.sha256()),
    ]);
    eprintln!("{table}");
    print_warning_table(&outcome.warnings);
}

fn print_warning_table(warnings: &[RowResolutionWarning]) {
    if warnings.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Row"),
        header_cell("Outcome"),
        header_cell("Message"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 1, CellAlignment::Center);
    for warning in warnings {
        table.add_row(vec![
            Cell::new(warning.row()),
            outcome_cell(warning),
            Cell::new(warning.to_string()),
        ]);
    }
    eprintln!();
    eprintln!("Warnings:");
    eprintln!("{table}");
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
    if table.column_count() >= 7 {
        table.set_constraints(vec![
            ColumnConstraint::LowerBoundary(Width::Fixed(12)),
            ColumnConstraint::LowerBoundary(Width::Fixed(6)),
            ColumnConstraint::LowerBoundary(Width::Fixed(9)),
            ColumnConstraint::LowerBoundary(Width::Fixed(9)),
            ColumnConstraint::LowerBoundary(Width::Fixed(7)),
            ColumnConstraint::LowerBoundary(Width::Fixed(10)),
            ColumnConstraint::UpperBoundary(Width::Percentage(50)),
        ]);
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn outcome_cell(warning: &RowResolutionWarning) -> Cell {
    if warning.is_skip() {
        Cell::new("SKIPPED")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold)
    } else {
        Cell::new("KEPT").fg(Color::Yellow)
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
