//! Per-table hooks plugged into [`super::SingleTable`]

use crate::errors::ProviderResult;
use crate::selection::ProjectionMap;
use crate::store::{ContentValues, SchemaHandle, StoreResult};

/// What differs from one table to the next
pub trait TableSchema: Send + Sync {
    /// Create the table in a fresh database
    fn create(&self, db: &dyn SchemaHandle) -> StoreResult<()>;

    /// Migrate the table from `old_version` to `new_version`
    fn upgrade(&self, db: &dyn SchemaHandle, old_version: u32, new_version: u32)
        -> StoreResult<()>;

    /// Columns callers may request, and how they map to the store
    fn projection_map(&self) -> ProjectionMap;

    /// Ordering used when a query supplies none
    fn default_sort_order(&self) -> Option<String>;

    /// Check values proposed for an insert.
    ///
    /// `Ok(false)` rejects with a generic message; an `Err` rejects with its
    /// own.
    fn check_insert_values(&self, values: &ContentValues) -> ProviderResult<bool>;
}
