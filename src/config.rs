//! # Provider Configuration
//!
//! JSON configuration naming the authority, the database and the tables
//! to register. Loaded and validated once at startup.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::ProviderError;
use crate::http_server::HttpServerConfig;
use crate::notify::ChangeNotifier;
use crate::router::{TableRegistry, TableRouter};
use crate::selection::is_valid_identifier;
use crate::store::{SqliteStore, SqliteStoreConfig, StoreError};
use crate::table::{DeclaredTable, SingleTable, TableDefinition};

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "./tablerouter.json";

/// Result type for configuration handling
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Read(String),

    #[error("Invalid config JSON: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Failed to open store: {0}")]
    Store(#[from] StoreError),
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Read(_) | Self::Parse(_) | Self::Invalid(_) | Self::Provider(_) => {
                "CONFIG_ERROR"
            }
            Self::Store(_) => "STORE_ERROR",
        }
    }

    fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Authority every registered table answers to
    pub authority: String,

    pub database: SqliteStoreConfig,

    #[serde(default)]
    pub http: HttpServerConfig,

    #[serde(default)]
    pub tables: Vec<TableDefinition>,
}

impl ProviderConfig {
    /// Load and validate configuration from `path`
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    /// Parse and validate configuration text
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: ProviderConfig =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.authority.trim().is_empty() {
            return Err(ConfigError::invalid("authority must not be empty"));
        }
        if self.authority.contains(['/', '?', '#']) || self.authority.contains(char::is_whitespace)
        {
            return Err(ConfigError::invalid(format!(
                "authority is not a host name: {}",
                self.authority
            )));
        }

        if self.database.version == 0 {
            return Err(ConfigError::invalid("database.version must be >= 1"));
        }
        if self.database.busy_timeout_ms == 0 {
            return Err(ConfigError::invalid("database.busy_timeout_ms must be > 0"));
        }

        let mut seen = HashSet::new();
        for table in &self.tables {
            if !is_valid_identifier(&table.name) {
                return Err(ConfigError::invalid(format!(
                    "invalid table name: {}",
                    table.name
                )));
            }
            if !seen.insert(table.name.as_str()) {
                return Err(ConfigError::invalid(format!(
                    "table {} declared twice",
                    table.name
                )));
            }
            table
                .validate()
                .map_err(|e| ConfigError::invalid(e.to_string()))?;
        }

        Ok(())
    }

    /// Registry holding one handler per declared table
    pub fn build_registry(&self) -> ConfigResult<TableRegistry> {
        let mut registry = TableRegistry::new();
        for definition in &self.tables {
            let schema = DeclaredTable::new(definition.clone())?;
            let handler = SingleTable::new(&self.authority, &definition.name, schema)?;
            registry.add_table_handler(Arc::new(handler));
        }
        Ok(registry)
    }

    /// Open the store, running lifecycle hooks, and assemble a router
    pub fn open_router(&self, notifier: Arc<dyn ChangeNotifier>) -> ConfigResult<TableRouter> {
        let registry = self.build_registry()?;
        let store = SqliteStore::open(&self.database, &registry)?;
        Ok(TableRouter::new(registry, Arc::new(store), notifier))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn notes_config() -> serde_json::Value {
        json!({
            "authority": "com.example.app",
            "database": { "path": ":memory:" },
            "tables": [{
                "name": "notes",
                "create_sql": "CREATE TABLE notes (_id INTEGER PRIMARY KEY AUTOINCREMENT, title TEXT NOT NULL)",
                "columns": [{"alias": "_id"}, {"alias": "title"}],
                "required_columns": ["title"]
            }]
        })
    }

    fn parse(value: serde_json::Value) -> ConfigResult<ProviderConfig> {
        ProviderConfig::from_json(&value.to_string())
    }

    #[test]
    fn test_defaults() {
        let config = parse(notes_config()).unwrap();
        assert_eq!(config.database.version, 1);
        assert_eq!(config.http.port, 54321);
        assert_eq!(config.tables.len(), 1);
    }

    #[test]
    fn test_rejects_empty_authority() {
        let mut value = notes_config();
        value["authority"] = json!("  ");
        assert!(matches!(parse(value), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_version_zero() {
        let mut value = notes_config();
        value["database"]["version"] = json!(0);
        assert!(matches!(parse(value), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_duplicate_tables() {
        let mut value = notes_config();
        let table = value["tables"][0].clone();
        value["tables"].as_array_mut().unwrap().push(table);
        let err = parse(value).unwrap_err();
        assert!(err.to_string().contains("declared twice"));
    }

    #[test]
    fn test_rejects_bad_column_alias() {
        let mut value = notes_config();
        value["tables"][0]["columns"] = json!([{"alias": "title; --"}]);
        assert!(matches!(parse(value), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            ProviderConfig::from_json("{"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = ProviderConfig::load(Path::new("/nonexistent/tablerouter.json")).unwrap_err();
        assert_eq!(err.code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_open_router_creates_tables() {
        let config = parse(notes_config()).unwrap();
        let router = config
            .open_router(Arc::new(crate::notify::NoopNotifier))
            .unwrap();
        assert_eq!(router.registry().table_names(), vec!["notes"]);
    }
}
