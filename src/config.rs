use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::filter::MAX_FILTER_CARDINALITY;

/// Environment variable naming an optional JSON settings file.
pub const CONFIG_ENV_VAR: &str = "RUSTY_DASH_CONFIG";

pub const MIN_HISTOGRAM_BINS: usize = 5;
pub const MAX_HISTOGRAM_BINS: usize = 100;

/// User-tunable dashboard settings. Every field has a default, so a settings
/// file only needs the keys it wants to change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Columns with more distinct values than this get no allow-list filter.
    pub max_filter_cardinality: usize,
    pub histogram_bins: usize,
    /// Rows shown in the data preview.
    pub preview_rows: usize,
    /// Start with one auto chart per column instead of one of each kind.
    pub grid_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_filter_cardinality: MAX_FILTER_CARDINALITY,
            histogram_bins: 20,
            preview_rows: 200,
            grid_mode: false,
        }
    }
}

impl Settings {
    /// Read settings from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings file {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&text).context("parsing settings JSON")?;
        Ok(settings.clamped())
    }

    /// Settings from `$RUSTY_DASH_CONFIG`, falling back to defaults when the
    /// variable is unset or the file cannot be used.
    pub fn load() -> Self {
        let Some(path) = std::env::var_os(CONFIG_ENV_VAR) else {
            return Settings::default();
        };
        match Settings::from_file(Path::new(&path)) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", Path::new(&path).display());
                settings
            }
            Err(e) => {
                log::warn!("Ignoring settings file: {e:#}");
                Settings::default()
            }
        }
    }

    fn clamped(mut self) -> Self {
        self.histogram_bins = self
            .histogram_bins
            .clamp(MIN_HISTOGRAM_BINS, MAX_HISTOGRAM_BINS);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "preview_rows": 10, "histogram_bins": 1000 }}"#).unwrap();

        let settings = Settings::from_file(file.path()).unwrap();
        assert_eq!(settings.preview_rows, 10);
        assert_eq!(settings.histogram_bins, MAX_HISTOGRAM_BINS);
        assert_eq!(settings.max_filter_cardinality, 50);
        assert!(!settings.grid_mode);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(Settings::from_file(file.path()).is_err());
    }
}
