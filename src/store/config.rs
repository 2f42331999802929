//! SQLite store configuration

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Path that opens a private in-memory database
pub const MEMORY_PATH: &str = ":memory:";

/// Configuration for [`super::SqliteStore`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqliteStoreConfig {
    /// Database file, or `:memory:`
    pub path: PathBuf,

    /// Schema version the registered tables expect (default: 1)
    #[serde(default = "default_version")]
    pub version: u32,

    /// Busy timeout in milliseconds (default: 5000)
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

fn default_version() -> u32 {
    1
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

impl SqliteStoreConfig {
    /// On-disk database at `path`
    pub fn new(path: impl Into<PathBuf>, version: u32) -> Self {
        Self {
            path: path.into(),
            version,
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }

    /// Private in-memory database
    pub fn in_memory(version: u32) -> Self {
        Self::new(MEMORY_PATH, version)
    }

    pub fn is_in_memory(&self) -> bool {
        self.path.as_os_str() == MEMORY_PATH
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_json() {
        let config: SqliteStoreConfig = serde_json::from_str(r#"{"path": "./data.db"}"#).unwrap();
        assert_eq!(config.version, 1);
        assert_eq!(config.busy_timeout_ms, 5_000);
        assert!(!config.is_in_memory());
    }

    #[test]
    fn test_in_memory() {
        assert!(SqliteStoreConfig::in_memory(2).is_in_memory());
    }
}
