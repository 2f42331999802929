//! # Single Table Handler
//!
//! The shared access-pattern logic. Everything table-specific comes from the
//! [`TableSchema`] the handler wraps.

use tracing::warn;

use super::schema::TableSchema;
use super::TableHandler;
use crate::errors::{ProviderError, ProviderResult};
use crate::selection::{is_valid_identifier, ProjectionMap, QueryBuilder, Selection, ID_COLUMN};
use crate::store::{ContentValues, RowSet, SchemaHandle, SqlValue, Store, StoreResult};
use crate::uri::{extract_column_name, ResourceUri, UriMatch, UriMatcher};

/// Type prefix for URIs addressing one row
pub const ITEM_TYPE_PREFIX: &str = "vnd.cursor.item";

/// Type prefix for URIs addressing any number of rows
pub const DIR_TYPE_PREFIX: &str = "vnd.cursor.dir";

/// Immutable description of a handled table
#[derive(Debug, Clone)]
pub struct TableDescriptor {
    pub name: String,
    pub authority: String,
    pub content_uri: ResourceUri,
    pub projection_map: ProjectionMap,
    pub default_sort_order: Option<String>,
}

/// Handler for one table, parameterized by its schema hooks
pub struct SingleTable<S> {
    descriptor: TableDescriptor,
    matcher: UriMatcher,
    schema: S,
}

impl<S: TableSchema> SingleTable<S> {
    /// Create a handler for `table` under `authority`.
    ///
    /// The table name ends up in statement text, so it must be a bare
    /// identifier.
    pub fn new(
        authority: impl Into<String>,
        table: impl Into<String>,
        schema: S,
    ) -> ProviderResult<Self> {
        let authority = authority.into();
        let name = table.into();
        if !is_valid_identifier(&name) {
            return Err(ProviderError::invalid_argument(format!(
                "Invalid table name: {}",
                name
            )));
        }

        let matcher = UriMatcher::new(authority.clone(), name.clone());
        let descriptor = TableDescriptor {
            content_uri: ResourceUri::for_table(authority.clone(), name.clone()),
            projection_map: schema.projection_map(),
            default_sort_order: schema.default_sort_order(),
            name,
            authority,
        };

        Ok(Self {
            descriptor,
            matcher,
            schema,
        })
    }

    pub fn descriptor(&self) -> &TableDescriptor {
        &self.descriptor
    }

    /// Classify `uri` against this table's patterns
    pub fn classify(&self, uri: &ResourceUri) -> Option<UriMatch> {
        self.matcher.classify(uri)
    }

    /// Filter implied by the URI shape; `None` for the whole collection
    fn derived_selection(&self, uri: &ResourceUri) -> ProviderResult<Option<Selection>> {
        match self.classify(uri) {
            Some(UriMatch::Collection) => Ok(None),
            Some(UriMatch::ById) => {
                let id = uri
                    .parse_id()
                    .ok_or_else(|| ProviderError::unknown_resource(uri))?;
                Ok(Some(Selection::equals(ID_COLUMN, id)))
            }
            Some(UriMatch::ByColumn) => {
                let column = extract_column_name(uri).ok_or_else(|| {
                    ProviderError::invalid_argument(format!("no column name: {}", uri))
                })?;
                let target = self.filter_target(column)?;
                let value = uri.last_path_segment().unwrap_or_default();
                Ok(Some(Selection::equals(&target, SqlValue::from(value))))
            }
            None => Err(ProviderError::unknown_resource(uri)),
        }
    }

    /// Clause text for a caller-named filter column.
    ///
    /// The name is spliced into the clause, so it must be a bare identifier
    /// and, when the table declares a projection map, one of its aliases.
    fn filter_target(&self, column: &str) -> ProviderResult<String> {
        if !is_valid_identifier(column) {
            return Err(ProviderError::invalid_argument(format!(
                "Invalid column name: {}",
                column
            )));
        }

        let map = &self.descriptor.projection_map;
        if map.is_empty() {
            return Ok(column.to_string());
        }
        map.get(column).map(str::to_string).ok_or_else(|| {
            ProviderError::invalid_argument(format!(
                "Unknown column {} for table {}",
                column, self.descriptor.name
            ))
        })
    }

    fn check_value_columns(values: &ContentValues) -> ProviderResult<()> {
        match values.keys().find(|k| !is_valid_identifier(k)) {
            Some(bad) => Err(ProviderError::invalid_argument(format!(
                "Invalid column name: {}",
                bad
            ))),
            None => Ok(()),
        }
    }

    /// Derived filter AND the caller's selection
    fn conjoined_selection(
        &self,
        uri: &ResourceUri,
        selection: &Selection,
    ) -> ProviderResult<Selection> {
        Ok(match self.derived_selection(uri)? {
            Some(derived) => derived.and(selection.clone()),
            None => selection.clone(),
        })
    }
}

impl<S: TableSchema> TableHandler for SingleTable<S> {
    fn table_name(&self) -> &str {
        &self.descriptor.name
    }

    fn content_uri(&self) -> &ResourceUri {
        &self.descriptor.content_uri
    }

    fn projection_map(&self) -> &ProjectionMap {
        &self.descriptor.projection_map
    }

    fn get_type(&self, uri: &ResourceUri) -> String {
        let prefix = match self.classify(uri) {
            Some(UriMatch::ById) => ITEM_TYPE_PREFIX,
            _ => DIR_TYPE_PREFIX,
        };
        format!(
            "{}/vnd.{}.{}",
            prefix, self.descriptor.authority, self.descriptor.name
        )
    }

    fn query(
        &self,
        store: &dyn Store,
        uri: &ResourceUri,
        projection: Option<&[String]>,
        selection: &Selection,
        sort_order: Option<&str>,
    ) -> ProviderResult<RowSet> {
        let mut builder = QueryBuilder::new(&self.descriptor.name, &self.descriptor.projection_map);
        if let Some(derived) = self.derived_selection(uri)? {
            builder.append_where(derived);
        }

        let sort_order = sort_order
            .filter(|s| !s.trim().is_empty())
            .or(self.descriptor.default_sort_order.as_deref());
        let statement = builder.build(projection, selection, sort_order)?;

        let reader = store.open_for_read()?;
        Ok(reader.query(&statement)?)
    }

    fn insert(
        &self,
        store: &dyn Store,
        uri: &ResourceUri,
        values: Option<ContentValues>,
    ) -> ProviderResult<ResourceUri> {
        if self.classify(uri) != Some(UriMatch::Collection) {
            return Err(ProviderError::invalid_argument(format!("Unknown URI: {}", uri)));
        }

        let values = values.unwrap_or_default();
        Self::check_value_columns(&values)?;
        if !self.schema.check_insert_values(&values)? {
            return Err(ProviderError::invalid_argument("invalid content values"));
        }

        let writer = store.open_for_write()?;
        let row_id = writer
            .insert(&self.descriptor.name, &values)
            .map_err(|e| {
                warn!(
                    event = "INSERT_FAILED",
                    table = %self.descriptor.name,
                    error = %e,
                    "store rejected insert"
                );
                ProviderError::write_failure(uri)
            })?;
        if row_id <= 0 {
            return Err(ProviderError::write_failure(uri));
        }

        Ok(self.descriptor.content_uri.with_appended_id(row_id))
    }

    fn update(
        &self,
        store: &dyn Store,
        uri: &ResourceUri,
        values: &ContentValues,
        selection: &Selection,
    ) -> ProviderResult<usize> {
        let selection = self.conjoined_selection(uri, selection)?;
        if values.is_empty() {
            return Err(ProviderError::invalid_argument("Empty values"));
        }
        Self::check_value_columns(values)?;

        let writer = store.open_for_write()?;
        Ok(writer.update(&self.descriptor.name, values, &selection)?)
    }

    fn delete(
        &self,
        store: &dyn Store,
        uri: &ResourceUri,
        selection: &Selection,
    ) -> ProviderResult<usize> {
        let selection = self.conjoined_selection(uri, selection)?;

        let writer = store.open_for_write()?;
        Ok(writer.delete(&self.descriptor.name, &selection)?)
    }

    fn on_create(&self, db: &dyn SchemaHandle) -> StoreResult<()> {
        self.schema.create(db)
    }

    fn on_upgrade(
        &self,
        db: &dyn SchemaHandle,
        old_version: u32,
        new_version: u32,
    ) -> StoreResult<()> {
        self.schema.upgrade(db, old_version, new_version)
    }
}
