use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use dash_engine::{
    AggregateEntry, FieldClassification, RenderedWidget, SelectionChip, WidgetData,
};
use dash_model::{Dashboard, Dataset, ValueState};

pub fn print_fields(dataset: &Dataset) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Field"),
        header_cell("Type"),
        header_cell("Role"),
        header_cell("Distinct"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    for field in dataset.fields() {
        let role = if field.is_measure() {
            "measure"
        } else {
            "dimension"
        };
        table.add_row(vec![
            Cell::new(field.name.as_str()).add_attribute(Attribute::Bold),
            Cell::new(field.kind),
            dim_cell(role),
            Cell::new(dataset.distinct_values(field.name.as_str()).len()),
        ]);
    }
    println!("Rows: {}", dataset.len());
    println!("{table}");
}

pub fn print_classifications(panes: &[FieldClassification]) {
    for pane in panes {
        let mut table = Table::new();
        table.set_header(vec![header_cell(pane.field.as_str()), header_cell("State")]);
        apply_table_style(&mut table);
        for value in &pane.values {
            let label = if value.value.is_missing() {
                dim_cell("(missing)")
            } else {
                Cell::new(&value.value)
            };
            table.add_row(vec![label, state_cell(value.state)]);
        }
        println!("{table}");
    }
}

pub fn print_aggregate(dimension: &str, measure_label: &str, entries: &[AggregateEntry]) {
    let mut table = Table::new();
    table.set_header(vec![header_cell(dimension), header_cell(measure_label)]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for entry in entries {
        let value = match entry.value {
            Some(_) => Cell::new(entry.display_value()),
            None => dim_cell(entry.display_value()),
        };
        table.add_row(vec![Cell::new(&entry.key), value]);
    }
    println!("{table}");
}

pub fn print_selection(chips: &[SelectionChip]) {
    if chips.is_empty() {
        println!("No active selections.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Field"),
        header_cell("Selection"),
        header_cell("Count"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for chip in chips {
        table.add_row(vec![
            Cell::new(chip.field.as_str()).add_attribute(Attribute::Bold),
            Cell::new(&chip.label).fg(Color::Green),
            Cell::new(chip.selected),
        ]);
    }
    println!("{table}");
}

pub fn print_sheets(dashboard: &Dashboard) {
    println!("Dashboard: {}", dashboard.title);
    let mut table = Table::new();
    table.set_header(vec![
        header_cell(""),
        header_cell("Id"),
        header_cell("Name"),
        header_cell("Title"),
        header_cell("Widgets"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Center);
    align_column(&mut table, 4, CellAlignment::Right);
    let active = dashboard.active().map(|s| s.id.clone());
    for sheet in &dashboard.sheets {
        let marker = if active.as_ref() == Some(&sheet.id) {
            Cell::new("*").fg(Color::Green).add_attribute(Attribute::Bold)
        } else {
            Cell::new("")
        };
        table.add_row(vec![
            marker,
            Cell::new(sheet.id.as_str()).fg(Color::Blue),
            Cell::new(&sheet.name),
            Cell::new(sheet.display_title()),
            Cell::new(sheet.widgets.len()),
        ]);
    }
    println!("{table}");
}

pub fn print_rendered(sheet_title: &str, widgets: &[RenderedWidget]) {
    println!("Sheet: {sheet_title}");
    if widgets.is_empty() {
        println!("No widgets on this sheet.");
        return;
    }
    for widget in widgets {
        println!();
        println!("[{}] {} ({})", widget.kind, widget.title, widget.id);
        match &widget.data {
            WidgetData::Filter { values, field } => {
                print_classifications(&[FieldClassification {
                    field: field.clone(),
                    values: values.clone(),
                }]);
            }
            WidgetData::Series { entries } if entries.is_empty() => {
                println!("(no measure configured)");
            }
            WidgetData::Series { entries } => print_aggregate("Key", "Value", entries),
            WidgetData::Table {
                dimension,
                measure,
                entries,
            } => {
                let measure = measure.as_ref().map_or("-", |m| m.as_str());
                print_aggregate(dimension.as_str(), measure, entries);
            }
            WidgetData::Kpi(kpi) => println!("{} of {}: {}", kpi.label, kpi.measure, kpi.value),
            WidgetData::Text { text } => println!("{text}"),
            WidgetData::Empty => println!("(not configured)"),
        }
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
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

fn state_cell(state: ValueState) -> Cell {
    let cell = Cell::new(state.as_str());
    match state {
        ValueState::Selected => cell.fg(Color::Green).add_attribute(Attribute::Bold),
        ValueState::Possible => cell,
        ValueState::Alternative => cell.fg(Color::Grey),
        ValueState::Excluded => cell.fg(Color::DarkGrey),
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
