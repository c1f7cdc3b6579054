use std::path::PathBuf;

use thiserror::Error;

use crate::chart::ChartKind;

/// A file could not be turned into a table. Nothing from the file is kept.
#[derive(Debug, Error)]
#[error("failed to load {}: {source:#}", path.display())]
pub struct LoadError {
    pub path: PathBuf,
    #[source]
    pub source: anyhow::Error,
}

/// An incompatible combination of chart kind, aggregation and axis selection
/// (or a reference to a column that does not exist). Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("column '{0}' appears more than once")]
    DuplicateColumn(String),

    #[error("column '{column}' has {len} rows, expected {expected}")]
    RaggedColumn {
        column: String,
        len: usize,
        expected: usize,
    },

    #[error("select an x-axis column first")]
    MissingX,

    #[error("a pie chart needs a numeric values column")]
    PieNeedsValues,

    #[error("count aggregation is not available for {0} charts (use bar or scatter)")]
    CountUnsupported(ChartKind),

    #[error("{mode} aggregation needs a target column")]
    MissingTarget { mode: &'static str },

    #[error("column '{0}' is not numeric")]
    NotNumeric(String),
}
