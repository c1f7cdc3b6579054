//! Resolve a [`ChartSpec`] against a table into plot-ready geometry.
//!
//! This is the hand-off point to the renderer: everything here is plain
//! numbers and labels, so the UI only has to draw.

use chrono::{DateTime, NaiveDateTime};

use super::spec::ChartSpec;
use crate::data::aggregate::{aggregate, value_counts, AggMode};
use crate::data::model::{CellValue, Column, ColumnKind, Table};
use crate::error::ConfigError;

/// How x positions map back to what the user sees.
#[derive(Debug, Clone, PartialEq)]
pub enum XAxis {
    Numeric,
    /// Positions are Unix timestamps in seconds.
    Time,
    /// Positions are indices into the label list.
    Category(Vec<String>),
}

impl XAxis {
    /// Text for an x position, used for tick labels and hover text.
    pub fn format(&self, x: f64) -> String {
        match self {
            XAxis::Numeric => format!("{x}"),
            XAxis::Time => DateTime::from_timestamp(x as i64, 0)
                .map(|d| d.naive_utc().format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            XAxis::Category(labels) => {
                let i = x.round();
                if (x - i).abs() > 1e-6 || i < 0.0 {
                    return String::new();
                }
                labels.get(i as usize).cloned().unwrap_or_default()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Marks {
    Line(Vec<[f64; 2]>),
    Points(Vec<[f64; 2]>),
    /// Bars centred on x with a shared width.
    Bars { bars: Vec<[f64; 2]>, width: f64 },
    Pie(Vec<PieSlice>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub x_axis: XAxis,
    pub marks: Marks,
}

/// Produce plot data for `spec` from the (already filtered) `table`.
///
/// Rows whose x or y cannot be placed are dropped. `bins` only matters for
/// histograms of numeric or datetime columns.
pub fn resolve(spec: &ChartSpec, table: &Table, bins: usize) -> Result<ChartData, ConfigError> {
    if let ChartSpec::Histogram { x, title } = spec {
        return histogram(table.require(x)?, table, title, bins);
    }

    let source = match spec.aggregation() {
        Some(agg) => aggregate(table, &agg)?,
        None => table.clone(),
    };
    let x_col = source.require(spec.x_column())?;
    let y_name = spec.y_column().ok_or(ConfigError::MissingTarget {
        mode: AggMode::None.label(),
    })?;
    let y_col = source.require(&y_name)?;
    if y_col.kind != ColumnKind::Numeric {
        return Err(ConfigError::NotNumeric(y_name));
    }

    if let ChartSpec::Pie { .. } = spec {
        let slices = x_col
            .values
            .iter()
            .zip(&y_col.values)
            .filter_map(|(label, value)| {
                let value = value.as_f64().filter(|v| *v > 0.0)?;
                Some(PieSlice {
                    label: label.to_string(),
                    value,
                })
            })
            .collect();
        return Ok(ChartData {
            title: spec.title().to_string(),
            x_label: x_col.name.clone(),
            y_label: y_name,
            x_axis: XAxis::Category(Vec::new()),
            marks: Marks::Pie(slices),
        });
    }

    let (x_axis, xs) = x_positions(x_col);
    let points: Vec<[f64; 2]> = xs
        .into_iter()
        .zip(&y_col.values)
        .filter_map(|(x, y)| Some([x?, y.as_f64()?]))
        .collect();

    let marks = match spec {
        ChartSpec::Line { .. } => Marks::Line(points),
        ChartSpec::Scatter { .. } => Marks::Points(points),
        _ => Marks::Bars {
            width: bar_width(&x_axis, &points),
            bars: points,
        },
    };
    Ok(ChartData {
        title: spec.title().to_string(),
        x_label: x_col.name.clone(),
        y_label: y_name,
        x_axis,
        marks,
    })
}

fn timestamp(d: NaiveDateTime) -> f64 {
    d.and_utc().timestamp() as f64
}

/// Position of every row along x. Categories are numbered in first-seen order.
fn x_positions(col: &Column) -> (XAxis, Vec<Option<f64>>) {
    match col.kind {
        ColumnKind::Numeric => (
            XAxis::Numeric,
            col.values.iter().map(CellValue::as_f64).collect(),
        ),
        ColumnKind::Datetime => (
            XAxis::Time,
            col.values
                .iter()
                .map(|v| v.as_datetime().map(timestamp))
                .collect(),
        ),
        ColumnKind::Categorical => {
            let mut labels: Vec<String> = Vec::new();
            let xs = col
                .values
                .iter()
                .map(|v| {
                    let label = v.to_string();
                    let idx = labels.iter().position(|l| *l == label).unwrap_or_else(|| {
                        labels.push(label);
                        labels.len() - 1
                    });
                    Some(idx as f64)
                })
                .collect();
            (XAxis::Category(labels), xs)
        }
    }
}

/// Bars take 80% of the smallest gap between neighbouring x positions.
fn bar_width(axis: &XAxis, points: &[[f64; 2]]) -> f64 {
    if let XAxis::Category(_) = axis {
        return 0.8;
    }
    let mut xs: Vec<f64> = points.iter().map(|p| p[0]).collect();
    xs.sort_by(f64::total_cmp);
    xs.dedup();
    let gap = xs
        .windows(2)
        .map(|w| w[1] - w[0])
        .fold(f64::INFINITY, f64::min);
    if gap.is_finite() {
        gap * 0.8
    } else if let XAxis::Time = axis {
        // One distinct timestamp: a day wide.
        86_400.0 * 0.8
    } else {
        0.8
    }
}

fn histogram(
    col: &Column,
    table: &Table,
    title: &str,
    bins: usize,
) -> Result<ChartData, ConfigError> {
    let (x_axis, values): (XAxis, Vec<f64>) = match col.kind {
        ColumnKind::Numeric => (
            XAxis::Numeric,
            col.values.iter().filter_map(CellValue::as_f64).collect(),
        ),
        ColumnKind::Datetime => (
            XAxis::Time,
            col.values
                .iter()
                .filter_map(|v| v.as_datetime().map(timestamp))
                .collect(),
        ),
        ColumnKind::Categorical => {
            // Categorical distribution: one bar per value, most frequent first.
            let counts = value_counts(table, &col.name)?;
            return count_bars(&counts, &col.name, title);
        }
    };

    let bins = bins.max(1);
    let marks = match bin_edges(&values, bins) {
        Some((min, width)) => {
            let mut counts = vec![0u64; bins];
            for v in &values {
                let idx = (((v - min) / width).floor() as usize).min(bins - 1);
                counts[idx] += 1;
            }
            Marks::Bars {
                bars: counts
                    .iter()
                    .enumerate()
                    .map(|(i, &c)| [min + (i as f64 + 0.5) * width, c as f64])
                    .collect(),
                width,
            }
        }
        None => Marks::Bars {
            bars: Vec::new(),
            width: 1.0,
        },
    };

    Ok(ChartData {
        title: title.to_string(),
        x_label: col.name.clone(),
        y_label: "count".to_string(),
        x_axis,
        marks,
    })
}

/// Lower edge and width of equal-width bins spanning `values`.
fn bin_edges(values: &[f64], bins: usize) -> Option<(f64, f64)> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return None;
    }
    if max - min < f64::EPSILON {
        // All values equal: one unit-wide bin around them.
        return Some((min - 0.5, 1.0 / bins as f64));
    }
    Some((min, (max - min) / bins as f64))
}

/// Lay out an already grouped value-count table as category bars.
fn count_bars(counts: &Table, column: &str, title: &str) -> Result<ChartData, ConfigError> {
    let x_col = counts.require(column)?;
    let y_col = counts.require("count")?;
    let labels: Vec<String> = x_col.values.iter().map(CellValue::to_string).collect();
    let bars = y_col
        .values
        .iter()
        .enumerate()
        .filter_map(|(i, c)| Some([i as f64, c.as_f64()?]))
        .collect();
    Ok(ChartData {
        title: title.to_string(),
        x_label: column.to_string(),
        y_label: "count".to_string(),
        x_axis: XAxis::Category(labels),
        marks: Marks::Bars { bars, width: 0.8 },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::spec::{build_chart, ChartKind, ChartRequest};
    use crate::data::infer::parse_datetime;

    fn table() -> Table {
        let text = |s: &str| CellValue::Text(s.to_string());
        let dt = |s: &str| CellValue::DateTime(parse_datetime(s).unwrap());
        Table::from_columns(vec![
            Column::new("provider", vec![text("A"), text("A"), text("B")]),
            Column::new(
                "cost",
                vec![CellValue::Integer(10), CellValue::Integer(20), CellValue::Integer(5)],
            )
            .with_kind(ColumnKind::Numeric),
            Column::new("date", vec![dt("2023-01-01"), dt("2023-01-02"), dt("2023-01-03")])
                .with_kind(ColumnKind::Datetime),
        ])
        .unwrap()
    }

    fn chart(kind: ChartKind, x: &str, y: Option<&str>, aggregation: AggMode) -> ChartData {
        let t = table();
        let request = ChartRequest {
            kind,
            x: Some(x.to_string()),
            y: y.map(str::to_string),
            aggregation,
        };
        resolve(&build_chart(&request, &t).unwrap(), &t, 10).unwrap()
    }

    #[test]
    fn summed_bars_on_category_axis() {
        let data = chart(ChartKind::Bar, "provider", Some("cost"), AggMode::Sum);
        assert_eq!(data.x_axis, XAxis::Category(vec!["A".into(), "B".into()]));
        assert_eq!(
            data.marks,
            Marks::Bars {
                bars: vec![[0.0, 30.0], [1.0, 5.0]],
                width: 0.8
            }
        );
        assert_eq!(data.x_axis.format(1.0), "B");
    }

    #[test]
    fn line_over_time_axis() {
        let data = chart(ChartKind::Line, "date", Some("cost"), AggMode::None);
        assert_eq!(data.x_axis, XAxis::Time);
        let Marks::Line(points) = &data.marks else {
            panic!("expected line marks");
        };
        assert_eq!(points.len(), 3);
        assert_eq!(data.x_axis.format(points[1][0]), "2023-01-02");
    }

    #[test]
    fn pie_sums_slices_per_label() {
        let data = chart(ChartKind::Pie, "provider", Some("cost"), AggMode::None);
        assert_eq!(
            data.marks,
            Marks::Pie(vec![
                PieSlice { label: "A".into(), value: 30.0 },
                PieSlice { label: "B".into(), value: 5.0 },
            ])
        );
    }

    #[test]
    fn non_numeric_y_is_rejected() {
        let t = table();
        let request = ChartRequest {
            kind: ChartKind::Scatter,
            x: Some("cost".into()),
            y: Some("provider".into()),
            aggregation: AggMode::None,
        };
        let spec = build_chart(&request, &t).unwrap();
        assert_eq!(
            resolve(&spec, &t, 10).unwrap_err(),
            ConfigError::NotNumeric("provider".into())
        );
    }

    #[test]
    fn numeric_histogram_counts_every_value() {
        let data = chart(ChartKind::Bar, "cost", None, AggMode::None);
        let Marks::Bars { bars, width } = &data.marks else {
            panic!("expected bars");
        };
        assert_eq!(bars.len(), 10);
        assert!((width - 1.5).abs() < 1e-9);
        assert_eq!(bars.iter().map(|b| b[1]).sum::<f64>(), 3.0);
        // The maximum lands in the last bin.
        assert_eq!(bars[9][1], 1.0);
    }

    #[test]
    fn categorical_histogram_is_value_counts() {
        let data = chart(ChartKind::Bar, "provider", None, AggMode::None);
        assert_eq!(data.x_axis, XAxis::Category(vec!["A".into(), "B".into()]));
        assert_eq!(
            data.marks,
            Marks::Bars {
                bars: vec![[0.0, 2.0], [1.0, 1.0]],
                width: 0.8
            }
        );
    }

    #[test]
    fn constant_column_histogram_has_one_filled_bin() {
        assert_eq!(bin_edges(&[3.0, 3.0], 4), Some((2.5, 0.25)));
        assert_eq!(bin_edges(&[], 4), None);
    }
}
