//! # Row Sets
//!
//! Materialized query results handed back to the caller.

use serde_json::{Map, Value};

use super::value::SqlValue;
use crate::uri::ResourceUri;

/// Result of a query.
///
/// The caller owns the row set; nothing in the router keeps a reference once
/// it is returned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    columns: Vec<String>,
    rows: Vec<Vec<SqlValue>>,
    notification_uri: Option<ResourceUri>,
}

impl RowSet {
    /// Create a row set. Every row must have one value per column.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<SqlValue>>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == columns.len()));
        Self {
            columns,
            rows,
            notification_uri: None,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<SqlValue>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by name
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Value at `row` for the named column
    pub fn get(&self, row: usize, column: &str) -> Option<&SqlValue> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// URI that change notifications for this result are published on
    pub fn notification_uri(&self) -> Option<&ResourceUri> {
        self.notification_uri.as_ref()
    }

    pub fn set_notification_uri(&mut self, uri: ResourceUri) {
        self.notification_uri = Some(uri);
    }

    /// Rows as JSON objects keyed by column name
    pub fn to_records(&self) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| {
                let obj: Map<String, Value> = self
                    .columns
                    .iter()
                    .cloned()
                    .zip(row.iter().map(SqlValue::to_json))
                    .collect();
                Value::Object(obj)
            })
            .collect()
    }
}
