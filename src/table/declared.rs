//! # Declared Tables
//!
//! Table schemas described in configuration rather than code.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::schema::TableSchema;
use crate::errors::{ProviderError, ProviderResult};
use crate::selection::{is_valid_identifier, ProjectionMap};
use crate::store::{ContentValues, SchemaHandle, StoreResult};

/// A column callers may request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Name callers use
    pub alias: String,

    /// Store expression behind the alias (default: the alias itself)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expr: Option<String>,
}

impl ColumnDef {
    pub fn new(alias: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            expr: None,
        }
    }

    pub fn with_expr(alias: impl Into<String>, expr: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            expr: Some(expr.into()),
        }
    }
}

/// Configuration of one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDefinition {
    /// Table name, also the first URI path segment
    pub name: String,

    /// Statements that create the table in a fresh database
    pub create_sql: String,

    /// Statements run when upgrading *to* the keyed version
    #[serde(default)]
    pub migrations: BTreeMap<u32, String>,

    /// Columns callers may request; empty means unconstrained
    #[serde(default)]
    pub columns: Vec<ColumnDef>,

    /// Ordering used when a query supplies none
    #[serde(default)]
    pub default_sort_order: Option<String>,

    /// Columns an insert must supply with a non-null value
    #[serde(default)]
    pub required_columns: Vec<String>,

    /// Reject inserts naming columns outside `columns`
    #[serde(default)]
    pub strict_columns: bool,
}

impl TableDefinition {
    /// Check names that will end up in statement text
    pub fn validate(&self) -> ProviderResult<()> {
        if !is_valid_identifier(&self.name) {
            return Err(ProviderError::invalid_argument(format!(
                "Invalid table name: {}",
                self.name
            )));
        }
        if self.create_sql.trim().is_empty() {
            return Err(ProviderError::invalid_argument(format!(
                "Table {} has no create_sql",
                self.name
            )));
        }
        for column in self.columns.iter().map(|c| &c.alias).chain(&self.required_columns) {
            if !is_valid_identifier(column) {
                return Err(ProviderError::invalid_argument(format!(
                    "Invalid column name {} in table {}",
                    column, self.name
                )));
            }
        }
        if self.strict_columns {
            if let Some(missing) = self
                .required_columns
                .iter()
                .find(|r| !self.columns.iter().any(|c| &c.alias == *r))
            {
                return Err(ProviderError::invalid_argument(format!(
                    "Required column {} is not declared in table {}",
                    missing, self.name
                )));
            }
        }
        Ok(())
    }
}

/// [`TableSchema`] driven by a [`TableDefinition`]
#[derive(Debug, Clone)]
pub struct DeclaredTable {
    definition: TableDefinition,
}

impl DeclaredTable {
    pub fn new(definition: TableDefinition) -> ProviderResult<Self> {
        definition.validate()?;
        Ok(Self { definition })
    }

}

impl TableSchema for DeclaredTable {
    fn create(&self, db: &dyn SchemaHandle) -> StoreResult<()> {
        info!(event = "TABLE_CREATED", table = %self.definition.name);
        db.execute_batch(&self.definition.create_sql)
    }

    fn upgrade(
        &self,
        db: &dyn SchemaHandle,
        old_version: u32,
        new_version: u32,
    ) -> StoreResult<()> {
        if old_version >= new_version {
            return Ok(());
        }
        for (version, sql) in self
            .definition
            .migrations
            .range(old_version.saturating_add(1)..=new_version)
        {
            info!(
                event = "TABLE_MIGRATED",
                table = %self.definition.name,
                version = *version
            );
            db.execute_batch(sql)?;
        }
        Ok(())
    }

    fn projection_map(&self) -> ProjectionMap {
        let mut map = ProjectionMap::new();
        for column in &self.definition.columns {
            let expr = column.expr.clone().unwrap_or_else(|| column.alias.clone());
            map.insert(column.alias.clone(), expr);
        }
        map
    }

    fn default_sort_order(&self) -> Option<String> {
        self.definition.default_sort_order.clone()
    }

    fn check_insert_values(&self, values: &ContentValues) -> ProviderResult<bool> {
        for required in &self.definition.required_columns {
            match values.get(required) {
                Some(v) if !v.is_null() => {}
                _ => {
                    return Err(ProviderError::invalid_argument(format!(
                        "{} requires a value for {}",
                        self.definition.name, required
                    )))
                }
            }
        }

        if self.definition.strict_columns {
            if let Some(unknown) = values
                .keys()
                .find(|k| !self.definition.columns.iter().any(|c| c.alias == *k))
            {
                return Err(ProviderError::invalid_argument(format!(
                    "{} has no column {}",
                    self.definition.name, unknown
                )));
            }
        }

        Ok(true)
    }
}
