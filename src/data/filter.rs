use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::infer::parse_datetime;
use super::model::{CellValue, ColumnKind, Table};

/// Columns with more distinct non-missing values than this get no allow-list.
pub const MAX_FILTER_CARDINALITY: usize = 50;

// ---------------------------------------------------------------------------
// Filter widgets: what can be offered for each column
// ---------------------------------------------------------------------------

/// The filter a column supports, decided by its [`ColumnKind`].
#[derive(Debug, Clone, PartialEq)]
pub enum FilterWidget {
    /// Datetime column: inclusive range, defaulting to the observed bounds.
    DateRange {
        min: NaiveDateTime,
        max: NaiveDateTime,
    },
    /// Low-cardinality column: pick from the observed values
    /// (`CellValue::Null` included when the column has missing cells).
    AllowList { values: BTreeSet<CellValue> },
    /// Too many distinct values to offer a filter.
    Skipped { distinct: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterOption {
    pub column: String,
    pub widget: FilterWidget,
}

/// Work out which filter each column gets.
///
/// Datetime columns with no present value get nothing at all.
pub fn filter_options(table: &Table, max_cardinality: usize) -> Vec<FilterOption> {
    table
        .columns()
        .iter()
        .filter_map(|col| {
            let widget = match col.kind {
                ColumnKind::Datetime => {
                    let (min, max) = col.datetime_bounds()?;
                    FilterWidget::DateRange { min, max }
                }
                ColumnKind::Numeric | ColumnKind::Categorical => {
                    let distinct = col.distinct_count();
                    if distinct > max_cardinality {
                        FilterWidget::Skipped { distinct }
                    } else {
                        FilterWidget::AllowList {
                            values: col.unique_values(),
                        }
                    }
                }
            };
            Some(FilterOption {
                column: col.name.clone(),
                widget,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Date range
// ---------------------------------------------------------------------------

/// Inclusive range over one datetime column. An absent bound is unbounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub column: String,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

impl DateRange {
    /// The full observed range of `column`, or `None` if it has no timestamps.
    pub fn full(table: &Table, column: &str) -> Option<Self> {
        let (min, max) = table.column(column)?.datetime_bounds()?;
        Some(DateRange {
            column: column.to_string(),
            start: Some(min),
            end: Some(max),
        })
    }

    /// Build a range from free-text bounds. A bound that does not parse
    /// places no restriction on that side.
    pub fn from_inputs(column: &str, start: &str, end: &str) -> Self {
        DateRange {
            column: column.to_string(),
            start: parse_datetime(start),
            end: parse_datetime(end),
        }
    }

    /// Build a range from calendar days; the end day is covered entirely.
    pub fn from_dates(column: &str, start: NaiveDate, end: NaiveDate) -> Self {
        let end_of_day = NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999)
            .unwrap_or(NaiveTime::MIN);
        DateRange {
            column: column.to_string(),
            start: Some(start.and_time(NaiveTime::MIN)),
            end: Some(end.and_time(end_of_day)),
        }
    }

    /// Whether a cell satisfies the range. Missing cells never do.
    pub fn contains(&self, value: &CellValue) -> bool {
        let Some(v) = value.as_datetime() else {
            return false;
        };
        self.start.map_or(true, |s| s <= v) && self.end.map_or(true, |e| v <= e)
    }
}

// ---------------------------------------------------------------------------
// Filter state: which values are selected per column
// ---------------------------------------------------------------------------

/// All active predicates; they combine with AND.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    pub date_range: Option<DateRange>,
    /// Per-column selection: column_name → set of allowed values.
    /// A column that is absent here is not filtered.
    pub allow_lists: BTreeMap<String, BTreeSet<CellValue>>,
    pub max_cardinality: usize,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            date_range: None,
            allow_lists: BTreeMap::new(),
            max_cardinality: MAX_FILTER_CARDINALITY,
        }
    }
}

/// Initialise a [`FilterState`] with all values selected (i.e., show everything).
pub fn init_filter_state(table: &Table, max_cardinality: usize) -> FilterState {
    let allow_lists = filter_options(table, max_cardinality)
        .into_iter()
        .filter_map(|opt| match opt.widget {
            FilterWidget::AllowList { values } => Some((opt.column, values)),
            _ => None,
        })
        .collect();
    FilterState {
        date_range: None,
        allow_lists,
        max_cardinality,
    }
}

/// Return indices of rows that pass all active filters, in table order.
///
/// A row passes an allow-list when:
/// * the column is unknown, not low-cardinality, or datetime → no constraint
/// * the allow-list is empty → nothing selected → fails
/// * the row's value is in the allow-list → passes
///
/// A date range on a column that is not datetime is ignored.
pub fn filtered_indices(table: &Table, filters: &FilterState) -> Vec<usize> {
    let range = filters.date_range.as_ref().and_then(|r| {
        match table.column(&r.column) {
            Some(col) if col.kind == ColumnKind::Datetime => Some((r, col)),
            _ => {
                log::warn!("ignoring date range on non-datetime column '{}'", r.column);
                None
            }
        }
    });

    let lists: Vec<_> = filters
        .allow_lists
        .iter()
        .filter_map(|(name, selected)| {
            let col = table.column(name)?;
            if col.kind == ColumnKind::Datetime || col.distinct_count() > filters.max_cardinality {
                return None;
            }
            // Everything selected → no effective filter.
            if !selected.is_empty() && col.values.iter().all(|v| selected.contains(v)) {
                return None;
            }
            Some((col, selected))
        })
        .collect();

    (0..table.len())
        .filter(|&row| {
            if let Some((r, col)) = range {
                if !r.contains(&col.values[row]) {
                    return false;
                }
            }
            lists
                .iter()
                .all(|(col, selected)| selected.contains(&col.values[row]))
        })
        .collect()
}

/// Apply all filters and return the narrowed table.
pub fn apply_filters(table: &Table, filters: &FilterState) -> Table {
    let indices = filtered_indices(table, filters);
    log::debug!("filters keep {} of {} rows", indices.len(), table.len());
    table.take(&indices)
}
