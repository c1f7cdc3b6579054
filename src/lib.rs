//! Pipeline behind the rusty-dash CSV dashboard: load a table, infer column
//! kinds, filter, aggregate and turn axis selections into chart specs.

pub mod chart;
pub mod config;
pub mod data;
pub mod error;

pub use error::{ConfigError, LoadError};
