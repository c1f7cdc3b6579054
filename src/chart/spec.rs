use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::aggregate::{AggMode, AggregateOrder, AggregationSpec};
use crate::data::model::{ColumnKind, Table};
use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ChartKind {
    #[default]
    Line,
    Bar,
    Scatter,
    Pie,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        ChartKind::Line,
        ChartKind::Bar,
        ChartKind::Scatter,
        ChartKind::Pie,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ChartKind::Line => "Line",
            ChartKind::Bar => "Bar",
            ChartKind::Scatter => "Scatter",
            ChartKind::Pie => "Pie",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A numeric quantity per x value: a raw column or an aggregate of one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Magnitude {
    Column(String),
    Sum(String),
    Mean(String),
}

impl Magnitude {
    pub fn column(&self) -> &str {
        match self {
            Magnitude::Column(c) | Magnitude::Sum(c) | Magnitude::Mean(c) => c,
        }
    }

    pub fn mode(&self) -> AggMode {
        match self {
            Magnitude::Column(_) => AggMode::None,
            Magnitude::Sum(_) => AggMode::Sum,
            Magnitude::Mean(_) => AggMode::Mean,
        }
    }
}

/// What a bar or scatter chart plots on y. Only these kinds may count rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    Count,
    Magnitude(Magnitude),
}

impl Quantity {
    pub fn mode(&self) -> AggMode {
        match self {
            Quantity::Count => AggMode::Count,
            Quantity::Magnitude(m) => m.mode(),
        }
    }

    fn target(&self) -> Option<&str> {
        match self {
            Quantity::Count => None,
            Quantity::Magnitude(m) => Some(m.column()),
        }
    }
}

/// A normalized description of what to plot, independent of the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartSpec {
    Line {
        x: String,
        y: Magnitude,
        title: String,
    },
    Bar {
        x: String,
        y: Quantity,
        #[serde(default)]
        order: AggregateOrder,
        title: String,
    },
    Scatter {
        x: String,
        y: Quantity,
        title: String,
    },
    Pie {
        names: String,
        values: Magnitude,
        title: String,
    },
    Histogram {
        x: String,
        title: String,
    },
}

impl ChartSpec {
    pub fn title(&self) -> &str {
        match self {
            ChartSpec::Line { title, .. }
            | ChartSpec::Bar { title, .. }
            | ChartSpec::Scatter { title, .. }
            | ChartSpec::Pie { title, .. }
            | ChartSpec::Histogram { title, .. } => title,
        }
    }

    /// The column laid out along x (slice labels for pies).
    pub fn x_column(&self) -> &str {
        match self {
            ChartSpec::Line { x, .. }
            | ChartSpec::Bar { x, .. }
            | ChartSpec::Scatter { x, .. }
            | ChartSpec::Histogram { x, .. } => x,
            ChartSpec::Pie { names, .. } => names,
        }
    }

    /// The group-by step this chart needs, if any.
    ///
    /// Pies always group by their labels: slices with the same name add up.
    pub fn aggregation(&self) -> Option<AggregationSpec> {
        let (x, mode, target, order) = match self {
            ChartSpec::Line { x, y, .. } => (x, y.mode(), Some(y.column()), AggregateOrder::FirstSeen),
            ChartSpec::Bar { x, y, order, .. } => (x, y.mode(), y.target(), *order),
            ChartSpec::Scatter { x, y, .. } => (x, y.mode(), y.target(), AggregateOrder::FirstSeen),
            ChartSpec::Pie { names, values, .. } => {
                let mode = match values.mode() {
                    AggMode::None => AggMode::Sum,
                    other => other,
                };
                (names, mode, Some(values.column()), AggregateOrder::FirstSeen)
            }
            ChartSpec::Histogram { .. } => return None,
        };
        (mode != AggMode::None).then(|| AggregationSpec::new(x, target, mode).with_order(order))
    }

    /// Column holding the y values once [`ChartSpec::aggregation`] has run.
    pub fn y_column(&self) -> Option<String> {
        match (self.aggregation(), self) {
            (Some(agg), _) => Some(agg.value_column),
            (None, ChartSpec::Line { y, .. }) => Some(y.column().to_string()),
            (None, ChartSpec::Bar { y, .. } | ChartSpec::Scatter { y, .. }) => {
                y.target().map(str::to_string)
            }
            _ => None,
        }
    }
}

/// The raw selections from the chart builder controls.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChartRequest {
    pub kind: ChartKind,
    pub x: Option<String>,
    pub y: Option<String>,
    pub aggregation: AggMode,
}

/// Turn builder selections into a [`ChartSpec`], rejecting combinations
/// that cannot be drawn. Column names are checked against `table`.
pub fn build_chart(request: &ChartRequest, table: &Table) -> Result<ChartSpec, ConfigError> {
    let x = request.x.clone().ok_or(ConfigError::MissingX)?;
    table.require(&x)?;
    if let Some(y) = &request.y {
        table.require(y)?;
    }
    let kind = request.kind;

    let magnitude = |y: Option<&String>| -> Result<Magnitude, ConfigError> {
        let y = y.cloned().ok_or(ConfigError::MissingTarget {
            mode: request.aggregation.label(),
        })?;
        Ok(match request.aggregation {
            AggMode::Sum => Magnitude::Sum(y),
            AggMode::Mean => Magnitude::Mean(y),
            _ => Magnitude::Column(y),
        })
    };

    let spec = match (kind, request.aggregation, request.y.as_ref()) {
        (ChartKind::Line | ChartKind::Pie, AggMode::Count, _) => {
            return Err(ConfigError::CountUnsupported(kind));
        }
        (ChartKind::Pie, _, None) => return Err(ConfigError::PieNeedsValues),
        (ChartKind::Bar, AggMode::Count, _) => ChartSpec::Bar {
            title: format!("Count by {x}"),
            x,
            y: Quantity::Count,
            order: AggregateOrder::FirstSeen,
        },
        (ChartKind::Scatter, AggMode::Count, _) => ChartSpec::Scatter {
            title: format!("Count by {x}"),
            x,
            y: Quantity::Count,
        },
        // Nothing to plot against x: fall back to its distribution.
        (_, AggMode::None, None) => ChartSpec::Histogram {
            title: format!("Distribution of {x}"),
            x,
        },
        (ChartKind::Pie, _, Some(y))
            if table.column(y).is_some_and(|c| c.kind != ColumnKind::Numeric) =>
        {
            return Err(ConfigError::NotNumeric(y.clone()));
        }
        (ChartKind::Pie, _, y) => {
            let values = magnitude(y)?;
            ChartSpec::Pie {
                title: magnitude_title(&values, &x, true),
                names: x,
                values,
            }
        }
        (ChartKind::Line, _, y) => {
            let y = magnitude(y)?;
            ChartSpec::Line {
                title: magnitude_title(&y, &x, false),
                x,
                y,
            }
        }
        (ChartKind::Bar, _, y) => {
            let y = magnitude(y)?;
            ChartSpec::Bar {
                title: magnitude_title(&y, &x, false),
                x,
                y: Quantity::Magnitude(y),
                order: AggregateOrder::FirstSeen,
            }
        }
        (ChartKind::Scatter, _, y) => {
            let y = magnitude(y)?;
            ChartSpec::Scatter {
                title: magnitude_title(&y, &x, false),
                x,
                y: Quantity::Magnitude(y),
            }
        }
    };
    log::debug!("built chart spec: {spec:?}");
    Ok(spec)
}

fn magnitude_title(y: &Magnitude, x: &str, pie: bool) -> String {
    match y {
        Magnitude::Column(y) if pie => format!("{y} distribution"),
        Magnitude::Column(y) => format!("{y} vs {x}"),
        Magnitude::Sum(y) => format!("Sum of {y} by {x}"),
        Magnitude::Mean(y) => format!("Mean of {y} by {x}"),
    }
}
