use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::data::model::{FilteredView, ViewRow};
use crate::state::AppState;

const TIMESTAMP_DISPLAY: &str = "%Y-%m-%d %H:%M";

// ---------------------------------------------------------------------------
// Cell projection
// ---------------------------------------------------------------------------

/// Where a table column's text comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Timestamp,
    Field(usize),
}

fn sources(view: &FilteredView, columns: &[String]) -> Vec<Source> {
    columns
        .iter()
        .filter_map(|c| {
            if *c == view.timestamp_column {
                Some(Source::Timestamp)
            } else {
                view.field_index(c).map(Source::Field)
            }
        })
        .collect()
}

fn cell_text(row: &ViewRow, source: Source) -> String {
    match source {
        Source::Timestamp => row.timestamp.format(TIMESTAMP_DISPLAY).to_string(),
        Source::Field(i) => row.values[i].map(|v| v.to_string()).unwrap_or_default(),
    }
}

// ---------------------------------------------------------------------------
// Detail table (right panel)
// ---------------------------------------------------------------------------

/// Render the filtered, unaggregated rows.
pub fn detail_table(ui: &mut Ui, state: &AppState) {
    let Some(out) = &state.output else {
        return;
    };
    let view = &out.filtered;
    let columns = state.visible_columns();
    let sources = sources(view, &columns);

    ui.label(format!("{} rows", view.len()));
    if sources.is_empty() {
        ui.label("No columns selected.");
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .columns(Column::auto().at_least(70.0), sources.len())
        .header(20.0, |mut header| {
            for name in &columns {
                header.col(|ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, view.len(), |mut row| {
                let record = &view.rows[row.index()];
                for source in &sources {
                    row.col(|ui| {
                        ui.label(cell_text(record, *source));
                    });
                }
            });
        });
}
