//! Backend store
//!
//! The hosted database is the system of record. Everything above this module
//! talks to it through the [`Store`] trait, which has two implementations:
//!
//! - [`RestStore`]: the hosted backend's PostgREST-style HTTP interface
//! - [`SqliteStore`]: a local SQLite document store for development and tests
//!
//! Rows are JSON objects. Each mutation targets a single row by id.

mod error;
mod query;
mod rest;
mod sqlite;
mod table;

pub use error::{StoreError, StoreResult};
pub use query::{Direction, Filter, Order, Query};
pub use rest::{RestStore, RestStoreConfig};
pub use sqlite::SqliteStore;
pub use table::Table;

pub(crate) use query::compare_values;

use async_trait::async_trait;

/// A single persisted record as returned by the backend
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Operations every backend supports
#[async_trait]
pub trait Store: Send + Sync {
    /// Fetch rows matching a query
    async fn select(&self, table: Table, query: &Query) -> StoreResult<Vec<Row>>;

    /// Insert one row, returning the stored representation
    async fn insert(&self, table: Table, row: Row) -> StoreResult<Row>;

    /// Merge a patch into the row with `id`, returning the stored representation
    async fn update(&self, table: Table, id: &str, patch: Row) -> StoreResult<Row>;

    /// Delete the row with `id`
    async fn delete(&self, table: Table, id: &str) -> StoreResult<()>;

    /// Cheap connectivity check
    async fn ping(&self) -> StoreResult<()>;

    /// Backend name for health output
    fn kind(&self) -> &'static str;
}

/// Columns the backend owns once a row exists
pub(crate) const IMMUTABLE_COLUMNS: [&str; 2] = ["id", "created_at"];

pub(crate) fn check_patch(patch: &Row) -> StoreResult<()> {
    for column in IMMUTABLE_COLUMNS {
        if patch.contains_key(column) {
            return Err(StoreError::ImmutableColumn(column.to_string()));
        }
    }
    Ok(())
}
