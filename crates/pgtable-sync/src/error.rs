//! Error types for reconciliation.

use std::path::PathBuf;

use pgtable_core::{Statement, ValidationError};

/// Errors that can occur while reading or converging a table.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The declared table or its columns are invalid. Nothing was executed.
    #[error("Invalid table declaration: {0}")]
    Validation(#[from] ValidationError),

    /// A declared column type does not match the accepted pattern.
    #[error("Invalid type {column_type:?} for column {column:?}: use only lower-case alphabetical characters")]
    InvalidType {
        /// Column name.
        column: String,
        /// The rejected type.
        column_type: String,
    },

    /// The live column definitions could not be read.
    #[error("Error while looking for columns of table {table}: {source}")]
    Read {
        /// Table that was being read.
        table: String,
        /// Underlying database error.
        #[source]
        source: sqlx::Error,
    },

    /// A statement was rejected by the database.
    ///
    /// Statements in `applied` ran before the failure and remain in effect.
    #[error("Error running SQL statement {sql:?}: {source}")]
    Execution {
        /// The failing statement.
        sql: String,
        /// Statements applied before the failure.
        applied: Vec<Statement>,
        /// Underlying database error.
        #[source]
        source: sqlx::Error,
    },

    /// Renaming the table failed; the table keeps `old_name`.
    #[error("Error updating table name {old_name:?} to {new_name:?} with {sql:?}: {source}")]
    RenameTable {
        /// The name the table still has.
        old_name: String,
        /// The requested name.
        new_name: String,
        /// The failing statement.
        sql: String,
        /// Statements applied before the failure.
        applied: Vec<Statement>,
        /// Underlying database error.
        #[source]
        source: sqlx::Error,
    },

    /// Invalid connection settings.
    #[error("Invalid connection configuration: {0}")]
    InvalidConfig(String),

    /// The state file does not exist.
    #[error("State file not found: {0}")]
    StateNotFound(PathBuf),

    /// IO error (reading definitions, reading/writing state).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SyncError {
    /// Statements that were applied before this error occurred.
    ///
    /// Empty for every error raised before execution started, and for
    /// transactional batches, which are rolled back as a whole.
    #[must_use]
    pub fn applied(&self) -> &[Statement] {
        match self {
            Self::Execution { applied, .. } | Self::RenameTable { applied, .. } => applied,
            _ => &[],
        }
    }
}

/// Result type for reconciliation operations.
pub type Result<T> = std::result::Result<T, SyncError>;
