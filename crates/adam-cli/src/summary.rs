use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use adam_cli::config::{SourceConfig, StudyConfig};

use crate::types::DeriveResult;

pub fn print_summary(result: &DeriveResult) {
    println!("Study: {}", result.study_id);
    println!("Subjects: {}", result.subjects);
    match &result.output {
        Some(output) => {
            println!("Output: {}", output.path.display());
            println!("SHA-256: {}", output.sha256);
        }
        None => println!("Output: dry run, nothing written to {}", result.output_dir.display()),
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("PARAMCD"),
        header_cell("Parameter"),
        header_cell("Records"),
        header_cell("Events"),
        header_cell("Censored"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 2..=4 {
        align_column(&mut table, index, CellAlignment::Right);
    }

    let (mut total_events, mut total_censored) = (0usize, 0usize);
    for parameter in &result.parameters {
        total_events += parameter.events;
        total_censored += parameter.censored;
        table.add_row(vec![
            Cell::new(&parameter.paramcd)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(&parameter.param),
            count_cell(parameter.records, Color::White),
            count_cell(parameter.events, Color::Green),
            count_cell(parameter.censored, Color::Yellow),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new("All parameters")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(result.records).add_attribute(Attribute::Bold),
        count_cell(total_events, Color::Green).add_attribute(Attribute::Bold),
        count_cell(total_censored, Color::Yellow).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
}

pub fn print_check_table(config: &StudyConfig) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("PARAMCD"),
        header_cell("Start"),
        header_cell("Kind"),
        header_cell("Source"),
        header_cell("Filter"),
        header_cell("EVNTDESC"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Center);
    for parameter in &config.parameters {
        let sources = parameter
            .events
            .iter()
            .map(|source| ("event", source))
            .chain(parameter.censors.iter().map(|source| ("censor", source)));
        for (position, (kind, source)) in sources.enumerate() {
            let (paramcd, start) = if position == 0 {
                (
                    Cell::new(&parameter.paramcd)
                        .fg(Color::Blue)
                        .add_attribute(Attribute::Bold),
                    Cell::new(&parameter.start_date),
                )
            } else {
                (dim_cell(""), dim_cell(""))
            };
            let kind_cell = if kind == "event" {
                Cell::new(kind).fg(Color::Green)
            } else {
                Cell::new(kind).fg(Color::Yellow)
            };
            table.add_row(vec![
                paramcd,
                start,
                kind_cell,
                Cell::new(format!("{}.{}", source.table, source.date)),
                filter_cell(source),
                Cell::new(&source.event_description),
            ]);
        }
    }
    println!("{table}");
}

fn filter_cell(source: &SourceConfig) -> Cell {
    match &source.filter {
        Some(filter) => Cell::new(serde_json::to_string(filter).unwrap_or_default()),
        None => dim_cell("-"),
    }
}

fn apply_table_style(table: &mut Table) {
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
        .set_width(100);
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

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
