//! LanceDB connection helpers.

use arrow_array::RecordBatchIterator;
use arrow_schema::Schema;
use lancedb::{connect, Connection};
use std::sync::Arc;

use kbase_core::error::{Error, Result, Service};

pub(crate) fn index_err(e: impl std::fmt::Display) -> Error {
    Error::external(Service::VectorIndex, e)
}

pub async fn open_db(uri: &str) -> Result<Connection> {
    connect(uri).execute().await.map_err(index_err)
}

/// Create `name` with `schema` and no rows unless it already exists.
pub async fn ensure_table(conn: &Connection, name: &str, schema: Arc<Schema>) -> Result<()> {
    let names = conn.table_names().execute().await.map_err(index_err)?;
    if names.iter().any(|n| n == name) {
        return Ok(());
    }
    let iter = RecordBatchIterator::new(vec![].into_iter(), schema.clone());
    conn.create_table(name, Box::new(iter)).execute().await.map_err(index_err)?;
    tracing::info!(table = name, "created vector table");
    Ok(())
}
