use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::model::{CellValue, Column, ColumnKind, Table};
use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AggMode {
    #[default]
    None,
    Count,
    Sum,
    Mean,
}

impl AggMode {
    pub const ALL: [AggMode; 4] = [AggMode::None, AggMode::Count, AggMode::Sum, AggMode::Mean];

    pub fn label(self) -> &'static str {
        match self {
            AggMode::None => "None",
            AggMode::Count => "Count",
            AggMode::Sum => "Sum",
            AggMode::Mean => "Mean",
        }
    }
}

impl fmt::Display for AggMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Row order of an aggregated table. Presentation only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AggregateOrder {
    /// Groups in the order their key first appears.
    #[default]
    FirstSeen,
    /// Groups sorted by key.
    Sorted,
    /// Largest aggregate first; missing aggregates last.
    Descending,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationSpec {
    pub group_by: String,
    pub target: Option<String>,
    pub mode: AggMode,
    /// Name of the produced aggregate column, e.g. `"count"` or `"value"`.
    pub value_column: String,
    #[serde(default)]
    pub order: AggregateOrder,
}

impl AggregationSpec {
    pub fn new(group_by: &str, target: Option<&str>, mode: AggMode) -> Self {
        AggregationSpec {
            group_by: group_by.to_string(),
            target: target.map(str::to_string),
            mode,
            value_column: match mode {
                AggMode::Count => "count".to_string(),
                _ => "value".to_string(),
            },
            order: AggregateOrder::FirstSeen,
        }
    }

    pub fn with_order(mut self, order: AggregateOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_value_column(mut self, name: &str) -> Self {
        self.value_column = name.to_string();
        self
    }
}

/// Running state of one group.
#[derive(Debug, Default)]
struct Group {
    rows: usize,
    present: usize,
    sum: f64,
}

/// Summarise `table` according to `spec`.
///
/// `AggMode::None` hands back the table unchanged. Otherwise the result has
/// two columns: the group key (named like the grouping column) and the
/// aggregate. Missing keys form their own group.
pub fn aggregate(table: &Table, spec: &AggregationSpec) -> Result<Table, ConfigError> {
    if spec.mode == AggMode::None {
        return Ok(table.clone());
    }

    let key_col = table.require(&spec.group_by)?;
    let target = match spec.mode {
        AggMode::Sum | AggMode::Mean => {
            let name = spec.target.as_deref().ok_or(ConfigError::MissingTarget {
                mode: spec.mode.label(),
            })?;
            Some(table.require(name)?)
        }
        _ => None,
    };

    let mut keys: Vec<CellValue> = Vec::new();
    let mut groups: HashMap<CellValue, Group> = HashMap::new();

    for (row, key) in key_col.values.iter().enumerate() {
        let group = groups.entry(key.clone()).or_insert_with(|| {
            keys.push(key.clone());
            Group::default()
        });
        group.rows += 1;
        if let Some(v) = target.and_then(|t| t.values[row].coerce_f64()) {
            group.present += 1;
            group.sum += v;
        }
    }

    let mut rows: Vec<(CellValue, CellValue)> = keys
        .into_iter()
        .map(|key| {
            let g = &groups[&key];
            let value = match spec.mode {
                AggMode::Count => CellValue::Integer(g.rows as i64),
                AggMode::Sum if g.present > 0 => CellValue::Float(g.sum),
                AggMode::Mean if g.present > 0 => CellValue::Float(g.sum / g.present as f64),
                _ => CellValue::Null,
            };
            (key, value)
        })
        .collect();

    match spec.order {
        AggregateOrder::FirstSeen => {}
        AggregateOrder::Sorted => rows.sort_by(|a, b| a.0.cmp(&b.0)),
        AggregateOrder::Descending => rows.sort_by(|a, b| match (a.1.as_f64(), b.1.as_f64()) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        }),
    }

    let (group_values, agg_values): (Vec<_>, Vec<_>) = rows.into_iter().unzip();
    Table::from_columns(vec![
        Column::new(spec.group_by.clone(), group_values).with_kind(key_col.kind),
        Column::new(spec.value_column.clone(), agg_values).with_kind(ColumnKind::Numeric),
    ])
}

/// Frequency of each present value of `column`, most frequent first.
/// Unlike a count aggregation, missing cells are not counted.
pub fn value_counts(table: &Table, column: &str) -> Result<Table, ConfigError> {
    let counts = aggregate(
        table,
        &AggregationSpec::new(column, None, AggMode::Count).with_order(AggregateOrder::Descending),
    )?;
    let present: Vec<usize> = counts
        .require(column)?
        .values
        .iter()
        .enumerate()
        .filter(|(_, key)| !key.is_null())
        .map(|(i, _)| i)
        .collect();
    Ok(counts.take(&present))
}
