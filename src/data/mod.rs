//! Data layer: core types, loading, inference, filtering and aggregation.
//!
//! Architecture:
//! ```text
//!  .csv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → raw Table (every column categorical)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  infer    │  numeric / datetime / categorical per column
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  date range + allow-lists → filtered rows
//!   └──────────┘
//!        │
//!        ▼
//!   ┌───────────┐
//!   │ aggregate  │  group-by count / sum / mean (or pass-through)
//!   └───────────┘
//! ```

use std::path::Path;

use crate::error::LoadError;

pub mod aggregate;
pub mod filter;
pub mod infer;
pub mod loader;
pub mod model;

/// Load a file and classify its columns. Any failure discards the whole file.
pub fn load_table(path: &Path) -> Result<model::Table, LoadError> {
    let raw = loader::load_file(path).map_err(|source| LoadError {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(infer::infer_types(raw))
}
