//! # Table Handlers
//!
//! One handler per logical table. A handler classifies URIs against its own
//! three patterns, builds the selection for the matched pattern and runs the
//! operation against the store it is handed.

pub mod declared;
pub mod schema;
pub mod single;

pub use declared::{ColumnDef, DeclaredTable, TableDefinition};
pub use schema::TableSchema;
pub use single::{SingleTable, TableDescriptor};

use crate::errors::ProviderResult;
use crate::selection::{ProjectionMap, Selection};
use crate::store::{ContentValues, RowSet, SchemaHandle, Store, StoreResult};
use crate::uri::ResourceUri;

/// Contract every registered table fulfils
pub trait TableHandler: Send + Sync {
    /// Registry key
    fn table_name(&self) -> &str;

    /// Base URI of the table
    fn content_uri(&self) -> &ResourceUri;

    /// Column aliases callers may name, and their store expressions
    fn projection_map(&self) -> &ProjectionMap;

    /// MIME-style type of the rows `uri` addresses
    fn get_type(&self, uri: &ResourceUri) -> String;

    /// Select rows
    fn query(
        &self,
        store: &dyn Store,
        uri: &ResourceUri,
        projection: Option<&[String]>,
        selection: &Selection,
        sort_order: Option<&str>,
    ) -> ProviderResult<RowSet>;

    /// Insert a row, returning its URI
    fn insert(
        &self,
        store: &dyn Store,
        uri: &ResourceUri,
        values: Option<ContentValues>,
    ) -> ProviderResult<ResourceUri>;

    /// Update rows, returning the affected count
    fn update(
        &self,
        store: &dyn Store,
        uri: &ResourceUri,
        values: &ContentValues,
        selection: &Selection,
    ) -> ProviderResult<usize>;

    /// Delete rows, returning the affected count
    fn delete(
        &self,
        store: &dyn Store,
        uri: &ResourceUri,
        selection: &Selection,
    ) -> ProviderResult<usize>;

    /// Create this table's schema in a fresh database
    fn on_create(&self, db: &dyn SchemaHandle) -> StoreResult<()>;

    /// Migrate this table's schema
    fn on_upgrade(&self, db: &dyn SchemaHandle, old_version: u32, new_version: u32)
        -> StoreResult<()>;
}
