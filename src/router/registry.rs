//! # Table Registry
//!
//! Maps the first path segment of a URI to the handler for that table.
//! Populated during construction, then shared read-only.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use crate::errors::{ProviderError, ProviderResult};
use crate::store::{LifecycleCallback, SchemaHandle, StoreResult};
use crate::table::TableHandler;
use crate::uri::{extract_table_name, ResourceUri};

/// Handlers keyed by table name
#[derive(Default)]
pub struct TableRegistry {
    handlers: HashMap<String, Arc<dyn TableHandler>>,
}

impl TableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under its table name, replacing any earlier one
    pub fn add_table_handler(&mut self, handler: Arc<dyn TableHandler>) {
        let name = handler.table_name().to_string();
        if self.handlers.contains_key(&name) {
            warn!(event = "TABLE_REPLACED", table = %name, "handler registered twice");
        }
        info!(event = "TABLE_REGISTERED", table = %name, uri = %handler.content_uri());
        self.handlers.insert(name, handler);
    }

    /// Builder form of [`Self::add_table_handler`]
    pub fn with(mut self, handler: impl TableHandler + 'static) -> Self {
        self.add_table_handler(Arc::new(handler));
        self
    }

    /// Handler for the table named by the first path segment of `uri`
    pub fn find_handler(&self, uri: &ResourceUri) -> ProviderResult<&Arc<dyn TableHandler>> {
        extract_table_name(uri)
            .and_then(|table| self.handlers.get(table))
            .ok_or_else(|| ProviderError::unknown_resource(uri))
    }

    pub fn handlers(&self) -> impl Iterator<Item = &Arc<dyn TableHandler>> {
        self.handlers.values()
    }

    /// Registered table names, sorted
    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl LifecycleCallback for TableRegistry {
    fn on_database_create(&self, db: &dyn SchemaHandle) -> StoreResult<()> {
        for handler in self.handlers() {
            handler.on_create(db)?;
        }
        Ok(())
    }

    fn on_database_upgrade(
        &self,
        db: &dyn SchemaHandle,
        old_version: u32,
        new_version: u32,
    ) -> StoreResult<()> {
        for handler in self.handlers() {
            handler.on_upgrade(db, old_version, new_version)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for TableRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableRegistry")
            .field("tables", &self.table_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::ProjectionMap;
    use crate::store::ContentValues;
    use crate::table::{SingleTable, TableSchema};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Hooks {
        creates: AtomicUsize,
        upgrades: Mutex<Vec<(u32, u32)>>,
    }

    struct CountingSchema(Arc<Hooks>);

    impl TableSchema for CountingSchema {
        fn create(&self, _db: &dyn SchemaHandle) -> StoreResult<()> {
            self.0.creates.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn upgrade(&self, _db: &dyn SchemaHandle, old: u32, new: u32) -> StoreResult<()> {
            self.0.upgrades.lock().unwrap().push((old, new));
            Ok(())
        }

        fn projection_map(&self) -> ProjectionMap {
            ProjectionMap::new()
        }

        fn default_sort_order(&self) -> Option<String> {
            None
        }

        fn check_insert_values(&self, _values: &ContentValues) -> ProviderResult<bool> {
            Ok(true)
        }
    }

    struct NoopHandle;

    impl SchemaHandle for NoopHandle {
        fn execute_batch(&self, _sql: &str) -> StoreResult<()> {
            Ok(())
        }
    }

    fn counted(tables: &[&str]) -> (TableRegistry, Vec<Arc<Hooks>>) {
        let mut registry = TableRegistry::new();
        let mut hooks = Vec::new();
        for table in tables {
            let h = Arc::new(Hooks::default());
            let handler =
                SingleTable::new("com.example.app", *table, CountingSchema(h.clone())).unwrap();
            registry.add_table_handler(Arc::new(handler));
            hooks.push(h);
        }
        (registry, hooks)
    }

    #[test]
    fn test_create_reaches_every_handler_once() {
        let (registry, hooks) = counted(&["notes", "tags", "labels"]);

        registry.on_database_create(&NoopHandle).unwrap();
        for h in &hooks {
            assert_eq!(h.creates.load(Ordering::SeqCst), 1);
            assert!(h.upgrades.lock().unwrap().is_empty());
        }
    }

    #[test]
    fn test_upgrade_reaches_every_handler_once() {
        let (registry, hooks) = counted(&["notes", "tags", "labels"]);

        registry.on_database_upgrade(&NoopHandle, 1, 4).unwrap();
        for h in &hooks {
            assert_eq!(*h.upgrades.lock().unwrap(), vec![(1, 4)]);
            assert_eq!(h.creates.load(Ordering::SeqCst), 0);
        }
    }

    #[test]
    fn test_replaced_handler_no_longer_receives_hooks() {
        let (mut registry, hooks) = counted(&["notes"]);
        let replacement = Arc::new(Hooks::default());
        let handler =
            SingleTable::new("com.example.app", "notes", CountingSchema(replacement.clone()))
                .unwrap();
        registry.add_table_handler(Arc::new(handler));

        registry.on_database_create(&NoopHandle).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(hooks[0].creates.load(Ordering::SeqCst), 0);
        assert_eq!(replacement.creates.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unregistered_table_is_unknown() {
        let (registry, _) = counted(&["notes"]);
        let uri = ResourceUri::parse("content://com.example.app/widgets").unwrap();
        assert!(matches!(
            registry.find_handler(&uri),
            Err(ProviderError::UnknownResource(_))
        ));
        assert_eq!(registry.table_names(), vec!["notes"]);
    }
}
