use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Application-level constants
pub const APP_NAME: &str = "namaste-bridge";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default number of hits returned by a reference search.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Default file name for an exported bundle.
pub const DEFAULT_BUNDLE_FILENAME: &str = "namaste-icd11-fhir-bundle.json";

/// Get the application data directory.
/// ~/NamasteBridge/ on all platforms; falls back to the working directory
/// when no home directory can be determined.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("NamasteBridge")
}

/// Default location of the mapping database.
pub fn database_path() -> PathBuf {
    app_data_dir().join("mappings.db")
}

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "namaste_bridge=info,warn"
}

/// Tunables for one processing run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Rows mapped between two progress events. `None` picks a size from
    /// the row count (between 1 and 5, about twenty events per file).
    pub batch_size: Option<usize>,
    /// Mapping rows written per storage transaction.
    pub insert_batch_size: usize,
    /// Largest input file accepted by `import::read_input`.
    pub max_input_bytes: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: None,
            insert_batch_size: 50,
            max_input_bytes: 10 * 1024 * 1024,
        }
    }
}

impl PipelineConfig {
    /// Effective mapping batch size for `total` rows. Never zero.
    pub fn batch_size_for(&self, total: usize) -> usize {
        match self.batch_size {
            Some(size) => size.max(1),
            None => total.div_ceil(20).clamp(1, 5),
        }
    }

    /// Effective insert chunk size. Never zero.
    pub fn insert_chunk(&self) -> usize {
        self.insert_batch_size.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_under_app_data() {
        let db = database_path();
        assert!(db.starts_with(app_data_dir()));
        assert!(db.ends_with("mappings.db"));
    }

    #[test]
    fn app_data_dir_name() {
        assert!(app_data_dir().ends_with("NamasteBridge"));
    }

    #[test]
    fn adaptive_batch_size_bounds() {
        let config = PipelineConfig::default();
        assert_eq!(config.batch_size_for(0), 1);
        assert_eq!(config.batch_size_for(1), 1);
        assert_eq!(config.batch_size_for(20), 1);
        assert_eq!(config.batch_size_for(21), 2);
        assert_eq!(config.batch_size_for(100), 5);
        assert_eq!(config.batch_size_for(10_000), 5);
    }

    #[test]
    fn explicit_batch_size_never_zero() {
        let config = PipelineConfig {
            batch_size: Some(0),
            insert_batch_size: 0,
            ..PipelineConfig::default()
        };
        assert_eq!(config.batch_size_for(100), 1);
        assert_eq!(config.insert_chunk(), 1);
    }

    #[test]
    fn defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.batch_size, None);
        assert_eq!(config.insert_batch_size, 50);
        assert_eq!(config.max_input_bytes, 10 * 1024 * 1024);
    }
}
