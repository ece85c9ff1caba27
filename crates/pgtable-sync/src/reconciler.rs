//! Schema reconciler.
//!
//! Plans statements with `pgtable-core` and applies them through a
//! [`SqlConnection`]. In the default [`ApplyMode::Sequential`] mode each
//! statement runs on its own: when statement *k* fails, statements *1..k-1*
//! stay applied, the rest never run, and the error reports what was applied.

use pgtable_core::{
    ColumnList, DesiredState, PriorState, Statement, TableIdentity, plan_columns, plan_create,
    plan_rename_table, plan_update,
};
use tracing::{debug, info, warn};

use crate::connection::{BatchFailure, BatchStage, SqlConnection};
use crate::error::{Result, SyncError};

/// How a batch of statements is executed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ApplyMode {
    /// One statement at a time; a failure leaves the earlier ones applied.
    #[default]
    Sequential,
    /// The whole batch in one transaction; a failure applies nothing.
    Transactional,
}

/// Outcome of a successful apply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Statements in the order they were applied (or would have been, in
    /// dry-run mode).
    pub statements: Vec<Statement>,
    /// Whether execution was skipped.
    pub dry_run: bool,
}

impl ApplyReport {
    /// Returns true if nothing needed to change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Rendered SQL of every statement.
    #[must_use]
    pub fn sql(&self) -> Vec<String> {
        self.statements.iter().map(Statement::to_sql).collect()
    }
}

/// Converges live tables to their declared state.
pub struct Reconciler<C> {
    conn: C,
    mode: ApplyMode,
    dry_run: bool,
}

impl<C: SqlConnection> Reconciler<C> {
    /// Creates a new reconciler in sequential mode.
    pub fn new(conn: C) -> Self {
        Self {
            conn,
            mode: ApplyMode::default(),
            dry_run: false,
        }
    }

    /// Sets the apply mode.
    #[must_use]
    pub fn mode(mut self, mode: ApplyMode) -> Self {
        self.mode = mode;
        self
    }

    /// Enables dry-run mode (statements are planned and logged, not executed).
    #[must_use]
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Returns whether dry-run mode is enabled.
    #[must_use]
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Returns the underlying connection.
    pub fn connection(&self) -> &C {
        &self.conn
    }

    /// Creates the table if it does not exist.
    ///
    /// An existing table is left untouched, whatever its columns.
    pub async fn create(&self, desired: &DesiredState) -> Result<ApplyReport> {
        info!(table = %desired.identity, columns = desired.columns.len(), "Creating table");
        let statement = plan_create(desired)?;
        self.apply(std::slice::from_ref(&statement)).await
    }

    /// Renames the table `current` to `new_name`.
    ///
    /// On failure the error is [`SyncError::RenameTable`], which carries the
    /// name the table still has.
    pub async fn rename_table(&self, current: &TableIdentity, new_name: &str) -> Result<ApplyReport> {
        info!(table = %current, new_name, "Renaming table");
        let statement = plan_rename_table(current, new_name)?;
        self.apply(std::slice::from_ref(&statement)).await
    }

    /// Converges the columns of `table` from `prior` to `desired`.
    pub async fn reconcile_columns(
        &self,
        table: &TableIdentity,
        prior: &ColumnList,
        desired: &ColumnList,
    ) -> Result<ApplyReport> {
        let statements = plan_columns(table, prior, desired)?;
        info!(table = %table, statements = statements.len(), "Reconciling columns");
        self.apply(&statements).await
    }

    /// Renames the table if needed, then converges its columns.
    pub async fn update(&self, prior: &PriorState, desired: &DesiredState) -> Result<ApplyReport> {
        let statements = plan_update(prior, desired)?;
        info!(
            table = %prior.identity,
            statements = statements.len(),
            "Updating table"
        );
        self.apply(&statements).await
    }

    /// Applies already planned statements in order.
    pub async fn apply(&self, statements: &[Statement]) -> Result<ApplyReport> {
        if self.dry_run {
            for statement in statements {
                info!(kind = statement.kind(), sql = %statement, "Dry run, not executing");
            }
            return Ok(ApplyReport {
                statements: statements.to_vec(),
                dry_run: true,
            });
        }

        match self.mode {
            ApplyMode::Sequential => self.apply_sequential(statements).await,
            ApplyMode::Transactional => self.apply_transactional(statements).await,
        }
    }

    async fn apply_sequential(&self, statements: &[Statement]) -> Result<ApplyReport> {
        let mut applied: Vec<Statement> = Vec::with_capacity(statements.len());

        for statement in statements {
            let sql = statement.to_sql();
            debug!(table = %statement.table(), kind = statement.kind(), sql = %sql, "Executing SQL");

            if let Err(source) = self.conn.execute(&sql).await {
                if !applied.is_empty() {
                    warn!(
                        applied = applied.len(),
                        skipped = statements.len() - applied.len() - 1,
                        "Batch interrupted, earlier statements remain applied"
                    );
                }
                return Err(failure(statement, sql, applied, source));
            }
            applied.push(statement.clone());
        }

        Ok(ApplyReport {
            statements: applied,
            dry_run: false,
        })
    }

    async fn apply_transactional(&self, statements: &[Statement]) -> Result<ApplyReport> {
        if statements.is_empty() {
            return Ok(ApplyReport::default());
        }

        let sql: Vec<String> = statements.iter().map(Statement::to_sql).collect();
        for (statement, sql) in statements.iter().zip(&sql) {
            debug!(
                table = %statement.table(),
                kind = statement.kind(),
                sql = %sql,
                "Queueing SQL in transaction"
            );
        }

        match self.conn.execute_in_transaction(&sql).await {
            Ok(()) => Ok(ApplyReport {
                statements: statements.to_vec(),
                dry_run: false,
            }),
            Err(BatchFailure { stage, source }) => {
                let failed = match stage {
                    BatchStage::Begin => None,
                    BatchStage::Statement(index) => statements.get(index).zip(sql.get(index)),
                    BatchStage::Commit => None,
                };
                if let Some((statement, sql)) = failed {
                    return Err(failure(statement, sql.clone(), Vec::new(), source));
                }
                let control = match stage {
                    BatchStage::Begin => "BEGIN",
                    _ => "COMMIT",
                };
                Err(SyncError::Execution {
                    sql: control.to_string(),
                    applied: Vec::new(),
                    source,
                })
            }
        }
    }
}

fn failure(statement: &Statement, sql: String, applied: Vec<Statement>, source: sqlx::Error) -> SyncError {
    match statement {
        Statement::RenameTable { table, new_name } => SyncError::RenameTable {
            old_name: table.table.clone(),
            new_name: new_name.clone(),
            sql,
            applied,
            source,
        },
        _ => SyncError::Execution {
            sql,
            applied,
            source,
        },
    }
}
