//! # Store Boundary
//!
//! The relational engine is an external collaborator. The router only needs
//! read and write handles with query/insert/update/delete primitives, plus a
//! way for lifecycle hooks to run schema statements.
//!
//! All calls are synchronous and may block the calling thread for the
//! duration of the statement. Isolation and locking belong to the store.

pub mod config;
pub mod errors;
pub mod recording;
pub mod rows;
pub mod sqlite;
pub mod value;

pub use config::{SqliteStoreConfig, MEMORY_PATH};
pub use errors::{StoreError, StoreResult};
pub use recording::{RecordingStore, StoreCall};
pub use rows::RowSet;
pub use sqlite::SqliteStore;
pub use value::{ContentValues, SqlValue};

use crate::selection::{QueryStatement, Selection};

/// A relational store that hands out read and write handles
pub trait Store: Send + Sync {
    /// Open a handle that may only read
    fn open_for_read(&self) -> StoreResult<Box<dyn ReadHandle + '_>>;

    /// Open a handle that may write
    fn open_for_write(&self) -> StoreResult<Box<dyn WriteHandle + '_>>;
}

/// Read access to the store
pub trait ReadHandle {
    /// Run a select statement and materialize its rows
    fn query(&self, statement: &QueryStatement) -> StoreResult<RowSet>;
}

/// Write access to the store
pub trait WriteHandle {
    /// Insert a row, returning the new row id
    fn insert(&self, table: &str, values: &ContentValues) -> StoreResult<i64>;

    /// Update matching rows, returning the affected count
    fn update(&self, table: &str, values: &ContentValues, selection: &Selection)
        -> StoreResult<usize>;

    /// Delete matching rows, returning the affected count
    fn delete(&self, table: &str, selection: &Selection) -> StoreResult<usize>;
}

/// Schema access handed to lifecycle hooks
pub trait SchemaHandle {
    /// Execute one or more statements without results
    fn execute_batch(&self, sql: &str) -> StoreResult<()>;
}

/// Receiver of store lifecycle events
pub trait LifecycleCallback {
    /// The database was created from scratch
    fn on_database_create(&self, db: &dyn SchemaHandle) -> StoreResult<()>;

    /// The database must move from `old_version` to `new_version`
    fn on_database_upgrade(
        &self,
        db: &dyn SchemaHandle,
        old_version: u32,
        new_version: u32,
    ) -> StoreResult<()>;
}
