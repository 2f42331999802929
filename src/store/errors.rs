//! # Store Errors

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors reported by a store implementation
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying engine rejected a statement
    #[error("Database error: {0}")]
    Db(String),

    /// A connection lock was poisoned by a panicking holder
    #[error("Store connection lock poisoned")]
    Poisoned,

    /// The on-disk schema is newer than the configured version
    #[error("Cannot downgrade database from version {found} to {configured}")]
    VersionDowngrade { found: u32, configured: u32 },

    /// A lifecycle hook failed while creating or upgrading the schema
    #[error("Lifecycle hook failed: {0}")]
    Lifecycle(String),
}

impl StoreError {
    /// Create a lifecycle error
    pub fn lifecycle(msg: impl Into<String>) -> Self {
        Self::Lifecycle(msg.into())
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Db(e.to_string())
    }
}
