use std::collections::BTreeSet;
use std::path::Path;

use chrono::NaiveDate;

use rusty_dash::chart::auto::auto_charts;
use rusty_dash::chart::series::{resolve, ChartData};
use rusty_dash::chart::{build_chart, ChartRequest, ChartSpec};
use rusty_dash::config::Settings;
use rusty_dash::data::filter::{
    apply_filters, filter_options, init_filter_state, DateRange, FilterOption, FilterState,
    FilterWidget,
};
use rusty_dash::data::load_table;
use rusty_dash::data::model::{CellValue, Table};
use rusty_dash::ConfigError;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// A chart on screen: its spec and what resolving it produced.
pub struct RenderedChart {
    pub spec: ChartSpec,
    pub data: Result<ChartData, ConfigError>,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub settings: Settings,

    /// Loaded and classified table (None until user loads a file).
    pub table: Option<Table>,

    /// Name of the loaded file, for the top bar.
    pub file_name: Option<String>,

    /// Filter widget per column, decided once per load.
    pub filter_options: Vec<FilterOption>,

    /// Active predicates.
    pub filters: FilterState,

    /// Day pickers backing the date range, when one is active.
    pub date_bounds: Option<(NaiveDate, NaiveDate)>,

    /// Table after filtering (cached).
    pub filtered: Table,

    pub auto_charts: Vec<RenderedChart>,

    /// Current chart builder selections.
    pub request: ChartRequest,

    /// Result of the last "Generate" press, re-resolved after every filter change.
    pub custom_chart: Option<RenderedChart>,

    /// Inline message for a chart that could not be built.
    pub chart_error: Option<String>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Whether a file loading operation is in progress.
    pub loading: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            filters: FilterState {
                max_cardinality: settings.max_filter_cardinality,
                ..FilterState::default()
            },
            settings,
            table: None,
            file_name: None,
            filter_options: Vec::new(),
            date_bounds: None,
            filtered: Table::default(),
            auto_charts: Vec::new(),
            request: ChartRequest::default(),
            custom_chart: None,
            chart_error: None,
            status_message: None,
            loading: false,
        }
    }

    /// Load a file, replacing the current table. On failure the previous
    /// session is left untouched and the error is shown in the top bar.
    pub fn load_path(&mut self, path: &Path) {
        self.loading = true;
        match load_table(path) {
            Ok(table) => {
                log::info!(
                    "Loaded {} rows from {} with columns {:?}",
                    table.len(),
                    path.display(),
                    table.classification()
                );
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                self.set_table(table, name);
            }
            Err(e) => {
                log::error!("{e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
                self.loading = false;
            }
        }
    }

    /// Ingest a newly loaded table, initialise filters and charts.
    pub fn set_table(&mut self, table: Table, file_name: String) {
        let max = self.settings.max_filter_cardinality;
        self.filter_options = filter_options(&table, max);
        self.filters = init_filter_state(&table, max);
        self.date_bounds = None;

        // Default chart selections: first column on x, nothing else.
        self.request = ChartRequest {
            x: table.column_names().into_iter().next(),
            ..ChartRequest::default()
        };
        self.custom_chart = None;
        self.chart_error = None;

        self.table = Some(table);
        self.file_name = Some(file_name);
        self.status_message = None;
        self.loading = false;
        self.refilter();
    }

    /// Recompute the filtered table and everything drawn from it.
    pub fn refilter(&mut self) {
        let Some(table) = &self.table else {
            return;
        };
        self.filtered = apply_filters(table, &self.filters);
        log::debug!("{} of {} rows visible", self.filtered.len(), table.len());
        self.rebuild_charts();
    }

    /// Re-resolve auto charts and the custom chart against the filtered table.
    pub fn rebuild_charts(&mut self) {
        let bins = self.settings.histogram_bins;
        self.auto_charts = auto_charts(&self.filtered, self.settings.grid_mode)
            .into_iter()
            .map(|spec| RenderedChart {
                data: resolve(&spec, &self.filtered, bins),
                spec,
            })
            .collect();
        if let Some(chart) = &mut self.custom_chart {
            chart.data = resolve(&chart.spec, &self.filtered, bins);
        }
    }

    /// Build the chart for the current selections. Configuration problems are
    /// reported inline; filters are never touched.
    pub fn generate_chart(&mut self) {
        let built = build_chart(&self.request, &self.filtered).and_then(|spec| {
            let data = resolve(&spec, &self.filtered, self.settings.histogram_bins)?;
            Ok(RenderedChart {
                spec,
                data: Ok(data),
            })
        });
        match built {
            Ok(chart) => {
                self.chart_error = None;
                self.custom_chart = Some(chart);
            }
            Err(e) => {
                log::warn!("Chart not generated: {e}");
                self.chart_error = Some(e.to_string());
                self.custom_chart = None;
            }
        }
    }

    /// Choose (or clear) the datetime column restricted by the date range.
    /// The range starts out covering every observed timestamp.
    pub fn set_date_column(&mut self, column: Option<String>) {
        self.filters.date_range = None;
        self.date_bounds = None;
        if let (Some(col), Some(table)) = (column, &self.table) {
            if let Some(range) = DateRange::full(table, &col) {
                self.date_bounds = range.start.zip(range.end).map(|(s, e)| (s.date(), e.date()));
                self.filters.date_range = Some(range);
            }
        }
        self.refilter();
    }

    /// Apply the day pickers to the active date range.
    pub fn set_date_bounds(&mut self, start: NaiveDate, end: NaiveDate) {
        let Some(range) = &self.filters.date_range else {
            return;
        };
        self.filters.date_range = Some(DateRange::from_dates(&range.column, start, end));
        self.date_bounds = Some((start, end));
        self.refilter();
    }

    /// Toggle a single value in a column's allow-list.
    pub fn toggle_filter_value(&mut self, column: &str, value: &CellValue) {
        let selected = self.filters.allow_lists.entry(column.to_string()).or_default();
        if selected.contains(value) {
            selected.remove(value);
        } else {
            selected.insert(value.clone());
        }
        self.refilter();
    }

    /// Select all values in a column.
    pub fn select_all(&mut self, column: &str) {
        let all_vals = self.filter_options.iter().find_map(|opt| match &opt.widget {
            FilterWidget::AllowList { values } if opt.column == column => Some(values.clone()),
            _ => None,
        });
        if let Some(all_vals) = all_vals {
            self.filters.allow_lists.insert(column.to_string(), all_vals);
            self.refilter();
        }
    }

    /// Deselect all values in a column.
    pub fn select_none(&mut self, column: &str) {
        self.filters
            .allow_lists
            .insert(column.to_string(), BTreeSet::new());
        self.refilter();
    }

    /// Columns left without a filter because they have too many values.
    pub fn skipped_columns(&self) -> Vec<&str> {
        self.filter_options
            .iter()
            .filter(|opt| matches!(opt.widget, FilterWidget::Skipped { .. }))
            .map(|opt| opt.column.as_str())
            .collect()
    }

    pub fn set_grid_mode(&mut self, grid_mode: bool) {
        self.settings.grid_mode = grid_mode;
        self.rebuild_charts();
    }

    pub fn set_histogram_bins(&mut self, bins: usize) {
        self.settings.histogram_bins = bins;
        self.rebuild_charts();
    }

    /// The current custom chart spec as pretty JSON.
    pub fn custom_spec_json(&self) -> Option<String> {
        let chart = self.custom_chart.as_ref()?;
        serde_json::to_string_pretty(&chart.spec)
            .map_err(|e| log::warn!("Could not serialize chart spec: {e}"))
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusty_dash::chart::ChartKind;
    use rusty_dash::data::aggregate::AggMode;
    use rusty_dash::data::infer::infer_types;
    use rusty_dash::data::loader::read_csv;

    const COSTS: &str = "id,provider,cost,date\n\
                         1,A,10,2023-01-01\n\
                         2,A,20,2023-01-02\n\
                         3,B,5,2023-01-03\n";

    fn loaded() -> AppState {
        let table = infer_types(read_csv(COSTS.as_bytes(), b',').unwrap());
        let mut state = AppState::default();
        state.set_table(table, "costs.csv".into());
        state
    }

    #[test]
    fn fresh_table_shows_everything() {
        let state = loaded();
        assert_eq!(state.filtered.len(), 3);
        assert_eq!(state.request.x.as_deref(), Some("id"));
        // id and cost histograms are not both drawn outside grid mode.
        assert_eq!(state.auto_charts.len(), 2);
        assert!(state.skipped_columns().is_empty());
    }

    #[test]
    fn toggling_values_narrows_rows() {
        let mut state = loaded();
        state.toggle_filter_value("provider", &CellValue::Text("B".into()));
        assert_eq!(state.filtered.len(), 2);
        state.select_none("provider");
        assert!(state.filtered.is_empty());
        state.select_all("provider");
        assert_eq!(state.filtered.len(), 3);
    }

    #[test]
    fn date_pickers_restrict_range() {
        let mut state = loaded();
        state.set_date_column(Some("date".into()));
        assert_eq!(state.filtered.len(), 3);
        let day = |d| NaiveDate::from_ymd_opt(2023, 1, d).unwrap();
        assert_eq!(state.date_bounds, Some((day(1), day(3))));
        state.set_date_bounds(day(2), day(3));
        assert_eq!(state.filtered.len(), 2);
        state.set_date_column(None);
        assert_eq!(state.filtered.len(), 3);
    }

    #[test]
    fn bad_chart_keeps_filters_and_reports_inline() {
        let mut state = loaded();
        state.toggle_filter_value("provider", &CellValue::Text("B".into()));
        state.request = ChartRequest {
            kind: ChartKind::Line,
            x: Some("provider".into()),
            y: None,
            aggregation: AggMode::Count,
        };
        state.generate_chart();
        assert!(state.custom_chart.is_none());
        assert!(state.chart_error.as_deref().unwrap().contains("count"));
        assert_eq!(state.filtered.len(), 2);
    }

    #[test]
    fn generated_chart_follows_filters() {
        let mut state = loaded();
        state.request = ChartRequest {
            kind: ChartKind::Bar,
            x: Some("provider".into()),
            y: Some("cost".into()),
            aggregation: AggMode::Sum,
        };
        state.generate_chart();
        assert!(state.custom_spec_json().unwrap().contains("Sum of cost by provider"));
        state.toggle_filter_value("provider", &CellValue::Text("A".into()));
        let data = state.custom_chart.as_ref().unwrap().data.as_ref().unwrap();
        assert_eq!(
            data.x_axis,
            rusty_dash::chart::series::XAxis::Category(vec!["B".into()])
        );
    }

    #[test]
    fn failed_load_keeps_previous_table() {
        let mut state = loaded();
        state.load_path(Path::new("/definitely/not/here.csv"));
        assert!(state.status_message.as_deref().unwrap().starts_with("Error"));
        assert_eq!(state.file_name.as_deref(), Some("costs.csv"));
        assert_eq!(state.filtered.len(), 3);
    }
}
