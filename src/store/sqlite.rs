//! Local SQLite backend
//!
//! Stores every table's rows as JSON documents in a single `records` table
//! keyed by (table, id). Queries are evaluated in memory with the same
//! semantics the hosted backend applies, so the rest of the application
//! cannot tell the two apart.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use serde_json::Value;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::{check_patch, Query, Row, Store, StoreError, StoreResult, Table};

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Create or open a database file
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        Self::with_connection(conn)
    }

    /// Volatile database, used by tests
    pub fn in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS records (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                tbl TEXT NOT NULL,
                id TEXT NOT NULL,
                data TEXT NOT NULL,
                UNIQUE (tbl, id)
            )",
            [],
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Lock(e.to_string()))
    }

    fn load_all(&self, table: Table) -> StoreResult<Vec<Row>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached("SELECT data FROM records WHERE tbl = ? ORDER BY seq")?;
        let docs = stmt
            .query_map(params![table.as_str()], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        docs.iter()
            .map(|doc| serde_json::from_str::<Row>(doc).map_err(StoreError::from))
            .collect()
    }

    fn insert_sync(&self, table: Table, mut row: Row) -> StoreResult<Row> {
        let id = match row.get("id") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::Null) | None => Uuid::new_v4().to_string(),
            Some(other) => other.to_string(),
        };
        row.insert("id".to_string(), Value::String(id.clone()));
        if !matches!(row.get("created_at"), Some(Value::String(_))) {
            row.insert(
                "created_at".to_string(),
                Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)),
            );
        }

        let data = serde_json::to_string(&row)?;
        self.lock()?.execute(
            "INSERT INTO records (tbl, id, data) VALUES (?, ?, ?)",
            params![table.as_str(), id, data],
        )?;

        Ok(row)
    }

    fn update_sync(&self, table: Table, id: &str, patch: Row) -> StoreResult<Row> {
        check_patch(&patch)?;

        let conn = self.lock()?;
        let existing: Option<String> = conn
            .query_row(
                "SELECT data FROM records WHERE tbl = ? AND id = ?",
                params![table.as_str(), id],
                |row| row.get(0),
            )
            .optional()?;

        let mut row: Row = match existing {
            Some(doc) => serde_json::from_str(&doc)?,
            None => return Err(StoreError::not_found(table.as_str(), id)),
        };
        for (column, value) in patch {
            row.insert(column, value);
        }

        conn.execute(
            "UPDATE records SET data = ? WHERE tbl = ? AND id = ?",
            params![serde_json::to_string(&row)?, table.as_str(), id],
        )?;

        Ok(row)
    }

    fn delete_sync(&self, table: Table, id: &str) -> StoreResult<()> {
        let changed = self.lock()?.execute(
            "DELETE FROM records WHERE tbl = ? AND id = ?",
            params![table.as_str(), id],
        )?;

        if changed == 0 {
            return Err(StoreError::not_found(table.as_str(), id));
        }
        Ok(())
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn select(&self, table: Table, query: &Query) -> StoreResult<Vec<Row>> {
        Ok(query.apply(self.load_all(table)?))
    }

    async fn insert(&self, table: Table, row: Row) -> StoreResult<Row> {
        self.insert_sync(table, row)
    }

    async fn update(&self, table: Table, id: &str, patch: Row) -> StoreResult<Row> {
        self.update_sync(table, id, patch)
    }

    async fn delete(&self, table: Table, id: &str) -> StoreResult<()> {
        self.delete_sync(table, id)
    }

    async fn ping(&self) -> StoreResult<()> {
        self.lock()?.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn row(v: Value) -> Row {
        v.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_created_at() {
        let store = SqliteStore::in_memory().unwrap();
        let stored = store
            .insert(Table::Leads, row(json!({"email": "a@b.co"})))
            .await
            .unwrap();

        let id = stored["id"].as_str().unwrap();
        assert!(Uuid::parse_str(id).is_ok());
        assert!(stored["created_at"].is_string());
    }

    #[tokio::test]
    async fn test_tables_are_isolated() {
        let store = SqliteStore::in_memory().unwrap();
        store.insert(Table::Leads, row(json!({"email": "a@b.co"}))).await.unwrap();

        let forms = store.select(Table::Forms, &Query::new()).await.unwrap();
        assert!(forms.is_empty());
        let leads = store.select(Table::Leads, &Query::new()).await.unwrap();
        assert_eq!(leads.len(), 1);
    }

    #[tokio::test]
    async fn test_update_merges_patch() {
        let store = SqliteStore::in_memory().unwrap();
        let stored = store
            .insert(Table::Leads, row(json!({"email": "a@b.co", "status": "new"})))
            .await
            .unwrap();
        let id = stored["id"].as_str().unwrap();

        let updated = store
            .update(Table::Leads, id, row(json!({"status": "qualified"})))
            .await
            .unwrap();
        assert_eq!(updated["status"], "qualified");
        assert_eq!(updated["email"], "a@b.co");
    }

    #[tokio::test]
    async fn test_update_rejects_immutable_columns() {
        let store = SqliteStore::in_memory().unwrap();
        let stored = store.insert(Table::Leads, row(json!({}))).await.unwrap();
        let id = stored["id"].as_str().unwrap();

        let err = store
            .update(Table::Leads, id, row(json!({"id": "other"})))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ImmutableColumn(_)));
    }

    #[tokio::test]
    async fn test_missing_rows_are_not_found() {
        let store = SqliteStore::in_memory().unwrap();
        let err = store
            .update(Table::Forms, "nope", row(json!({"name": "x"})))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));

        let err = store.delete(Table::Forms, "nope").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("agency.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.insert(Table::Themes, row(json!({"name": "Dark"}))).await.unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        let themes = store.select(Table::Themes, &Query::new()).await.unwrap();
        assert_eq!(themes.len(), 1);
        assert_eq!(themes[0]["name"], "Dark");
        store.ping().await.unwrap();
    }
}
