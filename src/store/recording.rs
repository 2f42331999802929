//! # Recording Store
//!
//! In-memory [`Store`] that records every call and answers with scripted
//! results. Used to observe exactly what the router sends to the engine.

use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;

use super::errors::{StoreError, StoreResult};
use super::rows::RowSet;
use super::value::ContentValues;
use super::{ReadHandle, Store, WriteHandle};
use crate::selection::{QueryStatement, Selection};

/// One call received by a [`RecordingStore`]
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    Query(QueryStatement),
    Insert {
        table: String,
        values: ContentValues,
    },
    Update {
        table: String,
        values: ContentValues,
        selection: Selection,
    },
    Delete {
        table: String,
        selection: Selection,
    },
}

impl StoreCall {
    pub fn is_mutation(&self) -> bool {
        !matches!(self, StoreCall::Query(_))
    }
}

/// Store double that records calls
#[derive(Debug)]
pub struct RecordingStore {
    calls: Mutex<Vec<StoreCall>>,
    rows: Mutex<RowSet>,
    next_insert_id: AtomicI64,
    affected: AtomicUsize,
}

impl Default for RecordingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingStore {
    /// Inserts return 1, updates and deletes report 1 affected row, queries
    /// return no rows
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            rows: Mutex::new(RowSet::default()),
            next_insert_id: AtomicI64::new(1),
            affected: AtomicUsize::new(1),
        }
    }

    /// Rows every query returns
    pub fn with_rows(self, rows: RowSet) -> Self {
        if let Ok(mut current) = self.rows.lock() {
            *current = rows;
        }
        self
    }

    /// Row id the next insert reports; non-positive values mimic a failed insert
    pub fn with_insert_id(self, id: i64) -> Self {
        self.next_insert_id.store(id, Ordering::SeqCst);
        self
    }

    /// Count every update and delete reports
    pub fn with_affected(self, count: usize) -> Self {
        self.affected.store(count, Ordering::SeqCst);
        self
    }

    /// Calls received so far
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Number of insert/update/delete calls received
    pub fn mutation_count(&self) -> usize {
        self.calls().iter().filter(|c| c.is_mutation()).count()
    }

    fn record(&self, call: StoreCall) -> StoreResult<()> {
        self.calls
            .lock()
            .map_err(|_| StoreError::Poisoned)?
            .push(call);
        Ok(())
    }
}

impl Store for RecordingStore {
    fn open_for_read(&self) -> StoreResult<Box<dyn ReadHandle + '_>> {
        Ok(Box::new(RecordingHandle { store: self }))
    }

    fn open_for_write(&self) -> StoreResult<Box<dyn WriteHandle + '_>> {
        Ok(Box::new(RecordingHandle { store: self }))
    }
}

struct RecordingHandle<'a> {
    store: &'a RecordingStore,
}

impl ReadHandle for RecordingHandle<'_> {
    fn query(&self, statement: &QueryStatement) -> StoreResult<RowSet> {
        self.store.record(StoreCall::Query(statement.clone()))?;
        let rows = self.store.rows.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(rows.clone())
    }
}

impl WriteHandle for RecordingHandle<'_> {
    fn insert(&self, table: &str, values: &ContentValues) -> StoreResult<i64> {
        self.store.record(StoreCall::Insert {
            table: table.to_string(),
            values: values.clone(),
        })?;
        Ok(self.store.next_insert_id.load(Ordering::SeqCst))
    }

    fn update(
        &self,
        table: &str,
        values: &ContentValues,
        selection: &Selection,
    ) -> StoreResult<usize> {
        self.store.record(StoreCall::Update {
            table: table.to_string(),
            values: values.clone(),
            selection: selection.clone(),
        })?;
        Ok(self.store.affected.load(Ordering::SeqCst))
    }

    fn delete(&self, table: &str, selection: &Selection) -> StoreResult<usize> {
        self.store.record(StoreCall::Delete {
            table: table.to_string(),
            selection: selection.clone(),
        })?;
        Ok(self.store.affected.load(Ordering::SeqCst))
    }
}
