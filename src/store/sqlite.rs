//! # SQLite Store
//!
//! [`Store`] backed by a single rusqlite connection.
//!
//! Opening runs the versioned lifecycle: `PRAGMA user_version` is compared
//! with the configured version and the callback's create or upgrade hook
//! runs inside the same transaction that records the new version.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{params_from_iter, Connection, ToSql};
use tracing::{debug, info};

use super::config::SqliteStoreConfig;
use super::errors::{StoreError, StoreResult};
use super::rows::RowSet;
use super::value::{ContentValues, SqlValue};
use super::{LifecycleCallback, ReadHandle, SchemaHandle, Store, WriteHandle};
use crate::selection::{QueryStatement, Selection};

/// SQLite-backed store.
///
/// Read and write handles share one connection; each handle holds the
/// connection lock for its lifetime.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    version: u32,
}

impl SqliteStore {
    /// Open the database and bring its schema to `config.version`
    pub fn open(config: &SqliteStoreConfig, callback: &dyn LifecycleCallback) -> StoreResult<Self> {
        let mut conn = if config.is_in_memory() {
            Connection::open_in_memory()?
        } else {
            Connection::open(&config.path)?
        };
        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;

        run_lifecycle(&mut conn, config.version, callback)?;

        Ok(Self {
            conn: Mutex::new(conn),
            version: config.version,
        })
    }

    /// Schema version the store was opened at
    pub fn version(&self) -> u32 {
        self.version
    }

    fn handle(&self) -> StoreResult<SqliteHandle<'_>> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(SqliteHandle { conn })
    }
}

impl Store for SqliteStore {
    fn open_for_read(&self) -> StoreResult<Box<dyn ReadHandle + '_>> {
        Ok(Box::new(self.handle()?))
    }

    fn open_for_write(&self) -> StoreResult<Box<dyn WriteHandle + '_>> {
        Ok(Box::new(self.handle()?))
    }
}

fn run_lifecycle(
    conn: &mut Connection,
    version: u32,
    callback: &dyn LifecycleCallback,
) -> StoreResult<()> {
    if version == 0 {
        return Err(StoreError::lifecycle("database version must be at least 1"));
    }

    let found: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    if found == version {
        return Ok(());
    }
    if found > version {
        return Err(StoreError::VersionDowngrade {
            found,
            configured: version,
        });
    }

    let tx = conn.transaction()?;
    if found == 0 {
        info!(event = "STORE_CREATED", version, "creating database schema");
        callback.on_database_create(&*tx)?;
    } else {
        info!(event = "STORE_UPGRADED", from = found, to = version, "upgrading database schema");
        callback.on_database_upgrade(&*tx, found, version)?;
    }
    tx.pragma_update(None, "user_version", version)?;
    tx.commit()?;
    Ok(())
}

impl SchemaHandle for Connection {
    fn execute_batch(&self, sql: &str) -> StoreResult<()> {
        debug!(sql, "executing schema batch");
        Connection::execute_batch(self, sql)?;
        Ok(())
    }
}

struct SqliteHandle<'a> {
    conn: MutexGuard<'a, Connection>,
}

impl ReadHandle for SqliteHandle<'_> {
    fn query(&self, statement: &QueryStatement) -> StoreResult<RowSet> {
        let sql = statement.to_sql();
        debug!(sql = %sql, "executing query");

        let mut stmt = self.conn.prepare(&sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let mut rows = stmt.query(params_from_iter(statement.selection.args().iter()))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(columns.len());
            for idx in 0..columns.len() {
                values.push(from_value_ref(row.get_ref(idx)?));
            }
            out.push(values);
        }

        Ok(RowSet::new(columns, out))
    }
}

impl WriteHandle for SqliteHandle<'_> {
    fn insert(&self, table: &str, values: &ContentValues) -> StoreResult<i64> {
        let sql = if values.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES", quote_ident(table))
        } else {
            let columns: Vec<String> = values.keys().map(quote_ident).collect();
            let placeholders = vec!["?"; values.len()].join(", ");
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                quote_ident(table),
                columns.join(", "),
                placeholders
            )
        };
        debug!(sql = %sql, "executing insert");

        self.conn
            .execute(&sql, params_from_iter(values.iter().map(|(_, v)| v)))?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update(
        &self,
        table: &str,
        values: &ContentValues,
        selection: &Selection,
    ) -> StoreResult<usize> {
        let assignments: Vec<String> = values
            .keys()
            .map(|k| format!("{} = ?", quote_ident(k)))
            .collect();
        let mut sql = format!("UPDATE {} SET {}", quote_ident(table), assignments.join(", "));
        if let Some(clause) = selection.clause() {
            sql.push_str(" WHERE ");
            sql.push_str(clause);
        }
        debug!(sql = %sql, "executing update");

        let args = values.iter().map(|(_, v)| v).chain(selection.args().iter());
        Ok(self.conn.execute(&sql, params_from_iter(args))?)
    }

    fn delete(&self, table: &str, selection: &Selection) -> StoreResult<usize> {
        let mut sql = format!("DELETE FROM {}", quote_ident(table));
        if let Some(clause) = selection.clause() {
            sql.push_str(" WHERE ");
            sql.push_str(clause);
        }
        debug!(sql = %sql, "executing delete");

        Ok(self
            .conn
            .execute(&sql, params_from_iter(selection.args().iter()))?)
    }
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::Borrowed(match self {
            SqlValue::Null => ValueRef::Null,
            SqlValue::Integer(n) => ValueRef::Integer(*n),
            SqlValue::Real(x) => ValueRef::Real(*x),
            SqlValue::Text(s) => ValueRef::Text(s.as_bytes()),
            SqlValue::Blob(b) => ValueRef::Blob(b),
        }))
    }
}

fn from_value_ref(value: ValueRef<'_>) -> SqlValue {
    match value {
        ValueRef::Null => SqlValue::Null,
        ValueRef::Integer(n) => SqlValue::Integer(n),
        ValueRef::Real(x) => SqlValue::Real(x),
        ValueRef::Text(t) => SqlValue::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => SqlValue::Blob(b.to_vec()),
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const CREATE_NOTES: &str =
        "CREATE TABLE notes (_id INTEGER PRIMARY KEY AUTOINCREMENT, title TEXT NOT NULL)";

    #[derive(Default)]
    struct CountingCallback {
        created: AtomicUsize,
        upgraded: AtomicUsize,
    }

    impl LifecycleCallback for CountingCallback {
        fn on_database_create(&self, db: &dyn SchemaHandle) -> StoreResult<()> {
            self.created.fetch_add(1, Ordering::SeqCst);
            db.execute_batch(CREATE_NOTES)
        }

        fn on_database_upgrade(
            &self,
            db: &dyn SchemaHandle,
            _old_version: u32,
            _new_version: u32,
        ) -> StoreResult<()> {
            self.upgraded.fetch_add(1, Ordering::SeqCst);
            db.execute_batch("ALTER TABLE notes ADD COLUMN body TEXT")
        }
    }

    fn select_all() -> QueryStatement {
        QueryStatement {
            table: "notes".to_string(),
            columns: vec!["_id".to_string(), "title".to_string()],
            selection: Selection::empty(),
            order_by: Some("_id".to_string()),
        }
    }

    #[test]
    fn test_insert_query_update_delete() {
        let callback = CountingCallback::default();
        let store = SqliteStore::open(&SqliteStoreConfig::in_memory(1), &callback).unwrap();
        assert_eq!(callback.created.load(Ordering::SeqCst), 1);

        let writer = store.open_for_write().unwrap();
        let id = writer
            .insert("notes", &ContentValues::new().with("title", "a"))
            .unwrap();
        assert_eq!(id, 1);
        let updated = writer
            .update(
                "notes",
                &ContentValues::new().with("title", "b"),
                &Selection::equals("_id", id),
            )
            .unwrap();
        assert_eq!(updated, 1);
        drop(writer);

        let reader = store.open_for_read().unwrap();
        let rows = reader.query(&select_all()).unwrap();
        assert_eq!(rows.columns(), &["_id", "title"]);
        assert_eq!(rows.get(0, "title"), Some(&SqlValue::from("b")));
        drop(reader);

        let writer = store.open_for_write().unwrap();
        assert_eq!(writer.delete("notes", &Selection::empty()).unwrap(), 1);
    }

    #[test]
    fn test_failed_insert_is_an_error() {
        let callback = CountingCallback::default();
        let store = SqliteStore::open(&SqliteStoreConfig::in_memory(1), &callback).unwrap();

        let writer = store.open_for_write().unwrap();
        // title is NOT NULL
        assert!(writer.insert("notes", &ContentValues::new()).is_err());
    }

    #[test]
    fn test_upgrade_and_downgrade() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.db");

        let callback = CountingCallback::default();
        drop(SqliteStore::open(&SqliteStoreConfig::new(&path, 1), &callback).unwrap());
        drop(SqliteStore::open(&SqliteStoreConfig::new(&path, 1), &callback).unwrap());
        assert_eq!(callback.created.load(Ordering::SeqCst), 1);
        assert_eq!(callback.upgraded.load(Ordering::SeqCst), 0);

        let store = SqliteStore::open(&SqliteStoreConfig::new(&path, 2), &callback).unwrap();
        assert_eq!(store.version(), 2);
        assert_eq!(callback.upgraded.load(Ordering::SeqCst), 1);
        drop(store);

        let result = SqliteStore::open(&SqliteStoreConfig::new(&path, 1), &callback);
        assert!(matches!(
            result,
            Err(StoreError::VersionDowngrade {
                found: 2,
                configured: 1
            })
        ));
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("notes"), "\"notes\"");
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }
}
