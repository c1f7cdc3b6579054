use std::f64::consts::TAU;

use eframe::egui::{self, Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points, Polygon};

use rusty_dash::chart::series::{ChartData, Marks, PieSlice};

use crate::color::{series_color, ColorMap};
use crate::state::{AppState, RenderedChart};
use crate::ui::preview;

const AUTO_CHART_HEIGHT: f32 = 260.0;
const CUSTOM_CHART_HEIGHT: f32 = 380.0;

// ---------------------------------------------------------------------------
// Central panel: preview, auto charts, custom chart
// ---------------------------------------------------------------------------

/// Render the dashboard in the central panel.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    if state.table.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a CSV file to build a dashboard  (File → Open…)");
        });
        return;
    }

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Filtered Data Preview");
            preview::table_preview(ui, &state.filtered, state.settings.preview_rows);
            ui.separator();

            ui.heading("Auto-Generated Charts");
            auto_chart_grid(ui, &state.auto_charts);
            ui.separator();

            if let Some(chart) = &state.custom_chart {
                ui.heading("Custom Chart");
                chart_view(ui, "custom_chart", chart, series_color(0), CUSTOM_CHART_HEIGHT);
            }
        });
}

/// Two charts per row, like the sidebar's grid layout.
fn auto_chart_grid(ui: &mut Ui, charts: &[RenderedChart]) {
    if charts.is_empty() {
        ui.label("No numeric or categorical columns to chart.");
        return;
    }
    for (row, pair) in charts.chunks(2).enumerate() {
        ui.columns(2, |cols| {
            for (i, chart) in pair.iter().enumerate() {
                let n = row * 2 + i;
                chart_view(
                    &mut cols[i],
                    format!("auto_chart_{n}"),
                    chart,
                    series_color(n),
                    AUTO_CHART_HEIGHT,
                );
            }
        });
    }
}

fn chart_view(
    ui: &mut Ui,
    id: impl std::hash::Hash,
    chart: &RenderedChart,
    color: Color32,
    height: f32,
) {
    ui.strong(chart.spec.title());
    match &chart.data {
        Ok(data) => draw_chart(ui, id, data, color, height),
        Err(e) => {
            ui.label(RichText::new(format!("Could not draw chart: {e}")).color(Color32::RED));
        }
    }
}

// ---------------------------------------------------------------------------
// egui_plot rendering
// ---------------------------------------------------------------------------

fn draw_chart(
    ui: &mut Ui,
    id: impl std::hash::Hash,
    data: &ChartData,
    color: Color32,
    height: f32,
) {
    if let Marks::Pie(slices) = &data.marks {
        draw_pie(ui, id, slices, height);
        return;
    }

    let axis = data.x_axis.clone();
    let hover_axis = data.x_axis.clone();
    let x_label = data.x_label.clone();

    Plot::new(id)
        .height(height)
        .x_axis_label(data.x_label.clone())
        .y_axis_label(data.y_label.clone())
        .x_axis_formatter(move |mark, _range| axis.format(mark.value))
        .label_formatter(move |_name, value| {
            format!("{x_label}: {}\n{:.3}", hover_axis.format(value.x), value.y)
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| match &data.marks {
            Marks::Line(points) => {
                let line = Line::new(PlotPoints::from(points.clone()))
                    .name(&data.y_label)
                    .color(color)
                    .width(1.5);
                plot_ui.line(line);
            }
            Marks::Points(points) => {
                let pts = Points::new(PlotPoints::from(points.clone()))
                    .name(&data.y_label)
                    .color(color)
                    .radius(3.0);
                plot_ui.points(pts);
            }
            Marks::Bars { bars, width } => {
                let bars: Vec<Bar> = bars
                    .iter()
                    .map(|&[x, y]| Bar::new(x, y).width(*width))
                    .collect();
                plot_ui.bar_chart(BarChart::new(bars).name(&data.y_label).color(color));
            }
            Marks::Pie(_) => {}
        });
}

fn draw_pie(ui: &mut Ui, id: impl std::hash::Hash, slices: &[PieSlice], height: f32) {
    if slices.is_empty() {
        ui.label("Nothing to show: no positive values.");
        return;
    }
    let colors = ColorMap::new(slices.iter().map(|s| s.label.as_str()));

    Plot::new(id)
        .height(height)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .legend(Legend::default())
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show(ui, |plot_ui| {
            for (slice, points) in slices.iter().zip(pie_wedges(slices)) {
                let color = colors.color_for(&slice.label);
                let polygon = Polygon::new(PlotPoints::from(points))
                    .name(&slice.label)
                    .fill_color(color)
                    .stroke(egui::Stroke::new(1.0, Color32::WHITE));
                plot_ui.polygon(polygon);
            }
        });
}

/// Outline of each slice on the unit circle, starting at 12 o'clock and
/// going clockwise.
fn pie_wedges(slices: &[PieSlice]) -> Vec<Vec<[f64; 2]>> {
    let total: f64 = slices.iter().map(|s| s.value).sum();
    let mut start = 0.0;
    slices
        .iter()
        .map(|s| {
            let sweep = s.value / total * TAU;
            // Roughly one vertex per 2 degrees.
            let steps = ((sweep / TAU) * 180.0).ceil().max(1.0) as usize;
            let mut points = vec![[0.0, 0.0]];
            for i in 0..=steps {
                let a = start + sweep * i as f64 / steps as f64;
                points.push([a.sin(), a.cos()]);
            }
            start += sweep;
            points
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wedges_close_the_circle() {
        let slices = vec![
            PieSlice { label: "A".into(), value: 3.0 },
            PieSlice { label: "B".into(), value: 1.0 },
        ];
        let wedges = pie_wedges(&slices);
        assert_eq!(wedges.len(), 2);
        // A covers three quarters: its last vertex sits at 9 o'clock.
        let last = wedges[0].last().unwrap();
        assert!((last[0] + 1.0).abs() < 1e-9 && last[1].abs() < 1e-9);
        // B ends back at 12 o'clock.
        let end = wedges[1].last().unwrap();
        assert!(end[0].abs() < 1e-9 && (end[1] - 1.0).abs() < 1e-9);
    }
}
