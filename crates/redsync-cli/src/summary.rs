use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use redsync_core::{TableOutcome, TableReport, TransferSummary};

pub fn print_summary(summary: &TransferSummary) {
    if summary.tables.is_empty() {
        println!("Nothing to transfer.");
    } else {
        println!("{}", summary_table(summary));
    }
    if !summary.untouched.is_empty() {
        println!("Left unchanged: {}", summary.untouched.join(", "));
    }
    let omitted: Vec<&TableReport> = summary
        .tables
        .iter()
        .filter(|report| !report.omitted_columns.is_empty())
        .collect();
    for report in omitted {
        println!(
            "{}: no column for {}",
            report.table,
            report.omitted_columns.join(", ")
        );
    }
}

/// One row per table plus a total row.
pub fn summary_table(summary: &TransferSummary) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Table"),
        header_cell("Form"),
        header_cell("Outcome"),
        header_cell("Rows"),
        header_cell("Skipped"),
        header_cell("Renamed"),
        header_cell("Omitted"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Center);
    for index in 3..=6 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for report in &summary.tables {
        table.add_row(vec![
            Cell::new(&report.table)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(&report.form),
            outcome_cell(report.outcome),
            Cell::new(report.rows_written),
            count_cell(report.rows_skipped, Color::Yellow),
            count_cell(report.renamed_columns, Color::Yellow),
            count_cell(report.omitted_columns.len(), Color::DarkYellow),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        Cell::new(summary.rows_written()).add_attribute(Attribute::Bold),
        count_cell(summary.rows_skipped(), Color::Yellow).add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
    ]);
    table
}

/// Table with the given header and plain text rows, in the listing style.
pub fn listing_table(header: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut table = Table::new();
    let header: Vec<_> = header.iter().map(|label| header_cell(label)).collect();
    table.set_header(header);
    apply_table_style(&mut table);
    for row in rows {
        table.add_row(row);
    }
    table
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
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn outcome_cell(outcome: TableOutcome) -> Cell {
    match outcome {
        TableOutcome::Created => Cell::new("created").fg(Color::Green),
        TableOutcome::Overwritten => Cell::new("overwritten").fg(Color::Yellow),
        TableOutcome::Imported => Cell::new("imported").fg(Color::Green),
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
