//! Resource lifecycle: create, read, update, delete.
//!
//! `delete` is logical only. It forgets the tracked record and never drops
//! the table; only `create` and `update` change the database.

use pgtable_core::DesiredState;
use tracing::{info, warn};

use crate::connection::SqlConnection;
use crate::error::{Result, SyncError};
use crate::reader::SchemaReader;
use crate::reconciler::Reconciler;
use crate::state::ResourceRecord;

/// A create that failed.
///
/// `record` is set when the table was created but could not be read back:
/// the table exists and must be tracked even though nothing was observed.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct CreateFailure {
    /// Record to persist, if the table was created.
    pub record: Option<ResourceRecord>,
    /// What went wrong.
    pub error: SyncError,
}

/// An update that failed, together with the state that actually exists.
///
/// `record.declared` reflects exactly the statements that were applied: the
/// old table name if the rename failed, and the replayed column list if the
/// batch stopped part-way.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct UpdateFailure {
    /// Record to persist.
    pub record: ResourceRecord,
    /// What went wrong.
    pub error: SyncError,
}

/// Manages one declared table.
pub struct TableResource<C> {
    reconciler: Reconciler<C>,
}

impl<C: SqlConnection> TableResource<C> {
    /// Creates a resource manager on top of `reconciler`.
    pub fn new(reconciler: Reconciler<C>) -> Self {
        Self { reconciler }
    }

    /// Returns the reconciler.
    pub fn reconciler(&self) -> &Reconciler<C> {
        &self.reconciler
    }

    /// Creates the table, then reads it back.
    pub async fn create(
        &self,
        desired: DesiredState,
    ) -> std::result::Result<ResourceRecord, CreateFailure> {
        if let Err(error) = self.reconciler.create(&desired).await {
            return Err(CreateFailure {
                record: None,
                error,
            });
        }

        let record = ResourceRecord::new(desired);
        match self.refresh(record.clone()).await {
            Ok(record) => Ok(record),
            Err(error) => {
                warn!(id = %record.id, "Table created but not read back");
                Err(CreateFailure {
                    record: Some(record),
                    error,
                })
            }
        }
    }

    /// Reads the live columns into the record.
    pub async fn read(&self, record: ResourceRecord) -> Result<ResourceRecord> {
        self.refresh(record).await
    }

    /// Converges the table from `record.declared` to `desired`, then reads it
    /// back.
    pub async fn update(
        &self,
        record: ResourceRecord,
        desired: DesiredState,
    ) -> std::result::Result<ResourceRecord, UpdateFailure> {
        if let Err(error) = self.reconciler.update(&record.declared, &desired).await {
            let applied = error.applied();
            if !applied.is_empty() {
                warn!(
                    id = %record.id,
                    applied = applied.len(),
                    "Update partially applied, recording applied statements only"
                );
            }
            let actual = record.declared.replay(applied);
            return Err(UpdateFailure {
                record: record.with_declared(actual),
                error,
            });
        }

        let updated = record.with_declared(desired);
        match self.refresh(updated.clone()).await {
            Ok(record) => Ok(record),
            Err(error) => Err(UpdateFailure {
                record: updated,
                error,
            }),
        }
    }

    /// Stops tracking the table. No statement is issued.
    pub fn delete(&self, record: ResourceRecord) {
        info!(
            id = %record.id,
            table = %record.declared.identity,
            "Forgetting table, the database is left unchanged"
        );
    }

    async fn refresh(&self, record: ResourceRecord) -> Result<ResourceRecord> {
        if self.reconciler.is_dry_run() {
            return Ok(record);
        }

        let reader = SchemaReader::new(self.reconciler.connection());
        let observed = reader.read(&record.declared.identity).await?;

        let declared: Vec<&str> = record.declared.columns.iter().map(|c| c.name.as_str()).collect();
        let live: Vec<&str> = observed.columns.iter().map(|c| c.name.as_str()).collect();
        if observed.columns.is_empty() {
            warn!(table = %record.declared.identity, "Table has no columns or does not exist");
        } else if declared != live {
            warn!(
                table = %record.declared.identity,
                declared = ?declared,
                live = ?live,
                "Live columns differ from the declaration"
            );
        }

        Ok(record.with_observed(observed))
    }
}
