//! # Router
//!
//! Single entry point for resource operations. Resolves a URI to the handler
//! registered for its table, delegates, and signals observers after writes.

pub mod registry;

pub use registry::TableRegistry;

use std::sync::Arc;

use tracing::{debug, warn};

use crate::errors::ProviderResult;
use crate::notify::{ChangeKind, ChangeNotifier};
use crate::selection::Selection;
use crate::store::{ContentValues, RowSet, Store};
use crate::table::TableHandler;
use crate::uri::ResourceUri;

/// Dispatches operations to table handlers
pub struct TableRouter {
    registry: TableRegistry,
    store: Arc<dyn Store>,
    notifier: Arc<dyn ChangeNotifier>,
}

impl TableRouter {
    pub fn new(
        registry: TableRegistry,
        store: Arc<dyn Store>,
        notifier: Arc<dyn ChangeNotifier>,
    ) -> Self {
        Self {
            registry,
            store,
            notifier,
        }
    }

    pub fn registry(&self) -> &TableRegistry {
        &self.registry
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    /// Handler responsible for `uri`
    pub fn find_handler(&self, uri: &ResourceUri) -> ProviderResult<&Arc<dyn TableHandler>> {
        self.registry.find_handler(uri)
    }

    pub fn get_type(&self, uri: &ResourceUri) -> ProviderResult<String> {
        Ok(self.find_handler(uri)?.get_type(uri))
    }

    /// Select rows; the result observes `uri`
    pub fn query(
        &self,
        uri: &ResourceUri,
        projection: Option<&[String]>,
        selection: &Selection,
        sort_order: Option<&str>,
    ) -> ProviderResult<RowSet> {
        let handler = self.find_handler(uri)?;
        let mut rows = handler.query(self.store(), uri, projection, selection, sort_order)?;
        rows.set_notification_uri(uri.clone());
        debug!(event = "QUERY", uri = %uri, rows = rows.len());
        Ok(rows)
    }

    /// Insert a row and notify on its new URI
    pub fn insert(
        &self,
        uri: &ResourceUri,
        values: Option<ContentValues>,
    ) -> ProviderResult<ResourceUri> {
        let handler = self.find_handler(uri)?;
        let row_uri = handler.insert(self.store(), uri, values)?;
        self.notify_change(&row_uri, ChangeKind::Insert);
        Ok(row_uri)
    }

    /// Update rows and notify on `uri`
    pub fn update(
        &self,
        uri: &ResourceUri,
        values: &ContentValues,
        selection: &Selection,
    ) -> ProviderResult<usize> {
        let handler = self.find_handler(uri)?;
        let count = handler.update(self.store(), uri, values, selection)?;
        self.notify_change(uri, ChangeKind::Update);
        Ok(count)
    }

    /// Delete rows and notify on `uri`
    pub fn delete(&self, uri: &ResourceUri, selection: &Selection) -> ProviderResult<usize> {
        let handler = self.find_handler(uri)?;
        let count = handler.delete(self.store(), uri, selection)?;
        self.notify_change(uri, ChangeKind::Delete);
        Ok(count)
    }

    fn notify_change(&self, uri: &ResourceUri, kind: ChangeKind) {
        if let Err(e) = self.notifier.notify(uri, kind) {
            warn!(
                event = "CHANGE_NOTIFY_FAILED",
                uri = %uri,
                kind = %kind,
                code = e.code(),
                error = %e,
                "change notification dropped"
            );
        }
    }
}

impl std::fmt::Debug for TableRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableRouter")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
