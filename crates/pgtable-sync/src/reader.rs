//! Schema reader.
//!
//! Reads the live column definitions of a table from
//! `information_schema.columns`, ordered by physical position.

use pgtable_core::{Column, ColumnList, ObservedState, TableIdentity};
use tracing::debug;

use crate::connection::SqlConnection;
use crate::error::{Result, SyncError};

/// Catalog query for the columns of one table.
///
/// `sql_identifier` columns are cast to `text` so they decode as strings.
pub const COLUMNS_QUERY: &str = "SELECT column_name::text AS column_name, udt_name::text AS udt_name \
     FROM information_schema.columns \
     WHERE table_schema = $1 AND table_name = $2 \
     ORDER BY ordinal_position";

/// Reads live table schemas.
///
/// Nothing is cached: every call issues a fresh query.
pub struct SchemaReader<C> {
    conn: C,
}

impl<C: SqlConnection> SchemaReader<C> {
    /// Creates a new reader.
    pub fn new(conn: C) -> Self {
        Self { conn }
    }

    /// Reads the columns of `identity`.
    ///
    /// Types are the server's canonical names (`int4` for `int`), so they may
    /// differ in spelling from the declared ones. A table that does not exist
    /// yields an empty column list.
    pub async fn read(&self, identity: &TableIdentity) -> Result<ObservedState> {
        debug!(table = %identity, "Reading table columns");

        let rows = self
            .conn
            .query_columns(
                COLUMNS_QUERY,
                &[identity.namespace.as_str(), identity.table.as_str()],
            )
            .await
            .map_err(|source| SyncError::Read {
                table: identity.to_string(),
                source,
            })?;

        let columns: ColumnList = rows
            .into_iter()
            .map(|row| Column::new(row.column_name, row.udt_name))
            .collect();

        debug!(table = %identity, columns = columns.len(), "Read table columns");
        Ok(ObservedState::new(identity.clone(), columns))
    }
}
