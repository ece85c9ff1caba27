//! Database capabilities consumed by the reader and the reconciler.
//!
//! The engine needs exactly two things from the database: run a DDL
//! statement, and run the catalog query. [`SqlConnection`] captures both and
//! is implemented for [`PgPool`]. Connection lifecycle stays with whoever owns
//! the pool (see [`ConnectionRegistry`](crate::registry::ConnectionRegistry)).

use std::future::Future;

use futures::TryStreamExt;
use sqlx::postgres::PgPool;

/// One row of the column catalog query.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ColumnRow {
    /// Column name.
    pub column_name: String,
    /// Canonical type name reported by the server (e.g. `int4`).
    pub udt_name: String,
}

impl ColumnRow {
    /// Creates a new row.
    #[must_use]
    pub fn new(column_name: impl Into<String>, udt_name: impl Into<String>) -> Self {
        Self {
            column_name: column_name.into(),
            udt_name: udt_name.into(),
        }
    }
}

/// Step of a transactional batch that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStage {
    /// The transaction could not be opened. No statement ran.
    Begin,
    /// The statement at this index was rejected.
    Statement(usize),
    /// Every statement ran but the commit failed.
    Commit,
}

/// A transactional batch failed and was rolled back.
#[derive(Debug)]
pub struct BatchFailure {
    /// Where the batch stopped.
    pub stage: BatchStage,
    /// Underlying database error.
    pub source: sqlx::Error,
}

impl BatchFailure {
    /// Creates a failure at `stage`.
    pub fn new(stage: BatchStage, source: sqlx::Error) -> Self {
        Self { stage, source }
    }
}

/// Capabilities required from the backing store.
pub trait SqlConnection: Send + Sync {
    /// Runs a single statement that returns no rows.
    fn execute(&self, sql: &str) -> impl Future<Output = Result<(), sqlx::Error>> + Send;

    /// Runs `statements` in order inside one transaction.
    ///
    /// Either every statement is committed or none is.
    fn execute_in_transaction(
        &self,
        statements: &[String],
    ) -> impl Future<Output = Result<(), BatchFailure>> + Send;

    /// Runs a catalog query with text parameters and returns every row.
    ///
    /// The row stream must be fully drained or dropped before returning, on
    /// success and on failure alike.
    fn query_columns(
        &self,
        sql: &str,
        params: &[&str],
    ) -> impl Future<Output = Result<Vec<ColumnRow>, sqlx::Error>> + Send;
}

impl SqlConnection for PgPool {
    async fn execute(&self, sql: &str) -> Result<(), sqlx::Error> {
        // DDL takes no parameters; use the simple query protocol.
        sqlx::raw_sql(sql).execute(self).await?;
        Ok(())
    }

    async fn execute_in_transaction(&self, statements: &[String]) -> Result<(), BatchFailure> {
        let mut tx = self
            .begin()
            .await
            .map_err(|source| BatchFailure::new(BatchStage::Begin, source))?;

        for (index, sql) in statements.iter().enumerate() {
            // Dropping `tx` on error rolls the batch back. A bare `&str` with
            // no arguments goes over the simple query protocol.
            sqlx::Executor::execute(&mut *tx, sql.as_str())
                .await
                .map_err(|source| BatchFailure::new(BatchStage::Statement(index), source))?;
        }

        tx.commit()
            .await
            .map_err(|source| BatchFailure::new(BatchStage::Commit, source))
    }

    async fn query_columns(&self, sql: &str, params: &[&str]) -> Result<Vec<ColumnRow>, sqlx::Error> {
        let mut query = sqlx::query_as::<_, ColumnRow>(sql);
        for param in params {
            query = query.bind(*param);
        }

        let mut stream = query.fetch(self);
        let mut rows = Vec::new();
        while let Some(row) = stream.try_next().await? {
            rows.push(row);
        }
        Ok(rows)
    }
}

impl<T: SqlConnection> SqlConnection for &T {
    fn execute(&self, sql: &str) -> impl Future<Output = Result<(), sqlx::Error>> + Send {
        (**self).execute(sql)
    }

    fn execute_in_transaction(
        &self,
        statements: &[String],
    ) -> impl Future<Output = Result<(), BatchFailure>> + Send {
        (**self).execute_in_transaction(statements)
    }

    fn query_columns(
        &self,
        sql: &str,
        params: &[&str],
    ) -> impl Future<Output = Result<Vec<ColumnRow>, sqlx::Error>> + Send {
        (**self).query_columns(sql, params)
    }
}
