use std::collections::BTreeMap;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::types::{DatasetSummary, PopulateResult};

pub fn print_summary(result: &PopulateResult) {
    println!(
        "Model: {}{}",
        result.model_name,
        if result.dry_run { " (dry run)" } else { "" }
    );
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Dataset"),
        header_cell("Records"),
        header_cell("Skipped"),
        header_cell("Output"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    let mut total_records = 0usize;
    let mut total_skipped = 0usize;
    for summary in &result.summaries {
        total_records += summary.outcome.kept_count();
        total_skipped += summary.outcome.skipped_count();
        table.add_row(vec![
            Cell::new(&summary.dataset)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(summary.outcome.kept_count()),
            count_cell(summary.outcome.skipped_count(), Color::Yellow),
            match &summary.output {
                Some(path) => Cell::new(path.display().to_string()),
                None => dim_cell("-"),
            },
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(total_records).add_attribute(Attribute::Bold),
        count_cell(total_skipped, Color::Yellow).add_attribute(Attribute::Bold),
        dim_cell("-"),
    ]);
    println!("{table}");
    print_skip_table(&result.summaries);
    if !result.errors.is_empty() {
        eprintln!("Errors:");
        for error in &result.errors {
            eprintln!("- {error}");
        }
    }
}

/// One row per (dataset, skip reason) with the affected record keys.
fn print_skip_table(summaries: &[DatasetSummary]) {
    let mut grouped: BTreeMap<(&str, String), Vec<&str>> = BTreeMap::new();
    for summary in summaries {
        for skipped in &summary.outcome.skipped {
            grouped
                .entry((summary.dataset.as_str(), skipped.reason.to_string()))
                .or_default()
                .push(skipped.key.as_str());
        }
    }
    if grouped.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Dataset"),
        header_cell("Reason"),
        header_cell("Count"),
        header_cell("Keys"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for ((dataset, reason), keys) in grouped {
        table.add_row(vec![
            Cell::new(dataset),
            Cell::new(reason).fg(Color::Yellow),
            Cell::new(keys.len()),
            Cell::new(preview_keys(&keys)),
        ]);
    }
    println!();
    println!("Skipped records:");
    println!("{table}");
}

fn preview_keys(keys: &[&str]) -> String {
    const PREVIEW: usize = 5;
    if keys.len() <= PREVIEW {
        keys.join(", ")
    } else {
        format!("{}, … ({} more)", keys[..PREVIEW].join(", "), keys.len() - PREVIEW)
    }
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

pub fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

pub fn bool_cell(flag: bool) -> Cell {
    if flag {
        Cell::new("✓")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold)
    } else {
        dim_cell("-")
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
