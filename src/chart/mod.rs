//! Chart layer: selections → [`ChartSpec`] → plot-ready [`series::ChartData`].

pub mod auto;
pub mod series;
pub mod spec;

pub use spec::{build_chart, ChartKind, ChartRequest, ChartSpec, Magnitude, Quantity};
