//! Charts drawn as soon as a table is loaded, before the user builds one.

use super::spec::ChartSpec;
use crate::data::model::{ColumnKind, Table};

/// Overview charts for `table`: a histogram for numeric columns and value
/// counts (missing cells left out) for categorical ones. Without
/// `grid_mode` only the first column of each kind gets a chart.
pub fn auto_charts(table: &Table, grid_mode: bool) -> Vec<ChartSpec> {
    let take = if grid_mode { usize::MAX } else { 1 };

    let histograms = table
        .columns_of_kind(ColumnKind::Numeric)
        .into_iter()
        .take(take)
        .map(|x| ChartSpec::Histogram {
            title: format!("Distribution of {x}"),
            x,
        });
    let counts = table
        .columns_of_kind(ColumnKind::Categorical)
        .into_iter()
        .take(take)
        .map(|x| ChartSpec::Histogram {
            title: format!("Counts of {x}"),
            x,
        });

    histograms.chain(counts).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::series::{resolve, Marks, XAxis};
    use crate::data::model::{CellValue, Column};

    fn table() -> Table {
        let col = |name: &str, kind| Column::new(name, vec![CellValue::Null]).with_kind(kind);
        Table::from_columns(vec![
            col("id", ColumnKind::Numeric),
            col("provider", ColumnKind::Categorical),
            col("cost", ColumnKind::Numeric),
            col("date", ColumnKind::Datetime),
            col("service", ColumnKind::Categorical),
        ])
        .unwrap()
    }

    #[test]
    fn one_of_each_by_default() {
        let titles: Vec<_> = auto_charts(&table(), false)
            .iter()
            .map(|c| c.title().to_string())
            .collect();
        assert_eq!(titles, vec!["Distribution of id", "Counts of provider"]);
    }

    #[test]
    fn value_count_chart_has_no_missing_bar() {
        let text = |s: &str| CellValue::Text(s.to_string());
        let t = Table::from_columns(vec![Column::new(
            "provider",
            vec![text("A"), CellValue::Null, text("B"), text("A"), CellValue::Null],
        )])
        .unwrap();
        let charts = auto_charts(&t, false);
        assert_eq!(charts[0].title(), "Counts of provider");
        let data = resolve(&charts[0], &t, 20).unwrap();
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
    fn grid_mode_covers_every_column() {
        let charts = auto_charts(&table(), true);
        assert_eq!(charts.len(), 4);
        assert!(charts.iter().all(|c| c.x_column() != "date"));
    }
}
