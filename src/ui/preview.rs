use eframe::egui::{RichText, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use rusty_dash::data::model::{CellValue, Table};

const PREVIEW_HEIGHT: f32 = 300.0;
const ROW_HEIGHT: f32 = 18.0;

/// Show the first `max_rows` rows of `table`, with each column's kind
/// under its name.
pub fn table_preview(ui: &mut Ui, table: &Table, max_rows: usize) {
    if table.columns().is_empty() {
        return;
    }
    let shown = table.len().min(max_rows);
    ui.label(format!("Showing {shown} of {} rows", table.len()));

    TableBuilder::new(ui)
        .striped(true)
        .max_scroll_height(PREVIEW_HEIGHT)
        .columns(TableColumn::auto().at_least(60.0).resizable(true), table.columns().len())
        .header(36.0, |mut header| {
            for col in table.columns() {
                header.col(|ui: &mut Ui| {
                    ui.vertical(|ui: &mut Ui| {
                        ui.strong(&col.name);
                        ui.label(RichText::new(col.kind.to_string()).small().weak());
                    });
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, shown, |mut row| {
                let index = row.index();
                for value in table.row(index) {
                    row.col(|ui: &mut Ui| {
                        let text = RichText::new(value.to_string());
                        if matches!(value, CellValue::Null) {
                            ui.label(text.weak().italics());
                        } else {
                            ui.label(text);
                        }
                    });
                }
            });
        });
}
