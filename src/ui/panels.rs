use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use rusty_dash::chart::ChartKind;
use rusty_dash::config::{MAX_HISTOGRAM_BINS, MIN_HISTOGRAM_BINS};
use rusty_dash::data::aggregate::AggMode;
use rusty_dash::data::filter::FilterWidget;
use rusty_dash::data::model::ColumnKind;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filters and chart builder
// ---------------------------------------------------------------------------

/// Render the left side panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    if state.table.is_none() {
        ui.heading("Filters");
        ui.separator();
        ui.label("No file loaded.");
        if ui.button("Open CSV…").clicked() {
            open_file_dialog(state);
        }
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Filters");
            ui.separator();
            date_range_filter(ui, state);
            value_filters(ui, state);

            ui.add_space(8.0);
            ui.heading("Visualization");
            ui.separator();
            visualization_options(ui, state);

            ui.add_space(8.0);
            ui.heading("Custom Chart Builder");
            ui.separator();
            chart_builder(ui, state);
        });
}

fn date_range_filter(ui: &mut Ui, state: &mut AppState) {
    let datetime_cols: Vec<String> = state
        .filter_options
        .iter()
        .filter(|opt| matches!(opt.widget, FilterWidget::DateRange { .. }))
        .map(|opt| opt.column.clone())
        .collect();
    if datetime_cols.is_empty() {
        return;
    }

    ui.strong("Date column for range filter");
    let current = state.filters.date_range.as_ref().map(|r| r.column.clone());
    let mut chosen = current.clone();
    egui::ComboBox::from_id_salt("date_column")
        .selected_text(current.as_deref().unwrap_or("None"))
        .show_ui(ui, |ui: &mut Ui| {
            ui.selectable_value(&mut chosen, None, "None");
            for col in &datetime_cols {
                ui.selectable_value(&mut chosen, Some(col.clone()), col);
            }
        });
    if chosen != current {
        state.set_date_column(chosen);
    }

    if let Some((mut start, mut end)) = state.date_bounds {
        let mut changed = false;
        ui.horizontal(|ui: &mut Ui| {
            ui.label("From");
            changed |= ui
                .add(DatePickerButton::new(&mut start).id_salt("range_start"))
                .changed();
        });
        ui.horizontal(|ui: &mut Ui| {
            ui.label("To");
            changed |= ui
                .add(DatePickerButton::new(&mut end).id_salt("range_end"))
                .changed();
        });
        if changed {
            state.set_date_bounds(start, end);
        }
    }
    ui.separator();
}

fn value_filters(ui: &mut Ui, state: &mut AppState) {
    // The options are cloned so the loop can call back into `state`.
    let options = state.filter_options.clone();

    for opt in &options {
        let FilterWidget::AllowList { values: all_values } = &opt.widget else {
            continue;
        };
        let col = &opt.column;

        let n_selected = state
            .filters
            .allow_lists
            .get(col)
            .map_or(0, |s| s.len());
        let header = format!("{col}  ({n_selected}/{})", all_values.len());

        egui::CollapsingHeader::new(RichText::new(header).strong())
            .id_salt(col)
            .default_open(false)
            .show(ui, |ui: &mut Ui| {
                ui.horizontal(|ui: &mut Ui| {
                    if ui.small_button("All").clicked() {
                        state.select_all(col);
                    }
                    if ui.small_button("None").clicked() {
                        state.select_none(col);
                    }
                });

                for val in all_values {
                    let mut checked = state
                        .filters
                        .allow_lists
                        .get(col)
                        .is_some_and(|s| s.contains(val));
                    if ui.checkbox(&mut checked, val.to_string()).changed() {
                        state.toggle_filter_value(col, val);
                    }
                }
            });
    }

    let skipped = state.skipped_columns();
    if !skipped.is_empty() {
        ui.label(
            RichText::new(format!(
                "Skipped filters for high-cardinality columns: {}",
                skipped.join(", ")
            ))
            .small()
            .weak(),
        );
    }
}

fn visualization_options(ui: &mut Ui, state: &mut AppState) {
    let mut grid_mode = state.settings.grid_mode;
    if ui
        .checkbox(&mut grid_mode, "Grid mode for auto charts")
        .changed()
    {
        state.set_grid_mode(grid_mode);
    }

    let mut bins = state.settings.histogram_bins;
    let slider =
        egui::Slider::new(&mut bins, MIN_HISTOGRAM_BINS..=MAX_HISTOGRAM_BINS).text("Histogram bins");
    if ui.add(slider).changed() {
        state.set_histogram_bins(bins);
    }
}

fn chart_builder(ui: &mut Ui, state: &mut AppState) {
    let Some(table) = &state.table else {
        return;
    };
    let columns = table.column_names();
    let numeric = table.columns_of_kind(ColumnKind::Numeric);

    egui::ComboBox::from_label("Chart type")
        .selected_text(state.request.kind.label())
        .show_ui(ui, |ui: &mut Ui| {
            for kind in ChartKind::ALL {
                ui.selectable_value(&mut state.request.kind, kind, kind.label());
            }
        });

    egui::ComboBox::from_label("X-axis")
        .selected_text(state.request.x.as_deref().unwrap_or("—"))
        .show_ui(ui, |ui: &mut Ui| {
            for col in &columns {
                ui.selectable_value(&mut state.request.x, Some(col.clone()), col);
            }
        });

    egui::ComboBox::from_label("Aggregate")
        .selected_text(state.request.aggregation.label())
        .show_ui(ui, |ui: &mut Ui| {
            for mode in AggMode::ALL {
                ui.selectable_value(&mut state.request.aggregation, mode, mode.label());
            }
        });

    // Pies size slices by a numeric column; other charts may also plot raw
    // text columns when the table has no numeric ones.
    let y_choices = if state.request.kind == ChartKind::Pie || !numeric.is_empty() {
        numeric
    } else {
        columns
    };
    let y_label = if state.request.kind == ChartKind::Pie {
        "Values"
    } else {
        "Y-axis"
    };
    egui::ComboBox::from_label(y_label)
        .selected_text(state.request.y.as_deref().unwrap_or("None"))
        .show_ui(ui, |ui: &mut Ui| {
            ui.selectable_value(&mut state.request.y, None, "None");
            for col in &y_choices {
                ui.selectable_value(&mut state.request.y, Some(col.clone()), col);
            }
        });

    ui.add_space(4.0);
    ui.horizontal(|ui: &mut Ui| {
        if ui.button("Generate Chart").clicked() {
            state.generate_chart();
        }
        if let Some(json) = state.custom_spec_json() {
            if ui.button("Copy spec").clicked() {
                ui.ctx().copy_text(json);
            }
        }
    });

    if let Some(err) = &state.chart_error {
        ui.label(RichText::new(err).color(Color32::RED));
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// File menu plus a summary of what is loaded.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(table), Some(name)) = (&state.table, &state.file_name) {
            ui.label(format!(
                "{name}: {} rows loaded, {} visible",
                table.len(),
                state.filtered.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open table")
        .add_filter("Supported files", &["csv", "tsv", "txt", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv", "tsv", "txt"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}
