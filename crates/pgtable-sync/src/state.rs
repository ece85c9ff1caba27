//! Persisted resource state.
//!
//! After each successful run the accepted declaration is written to a JSON
//! state file. The next run plans from it rather than from the live catalog,
//! whose type names are normalized by the server.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use pgtable_core::{DesiredState, ObservedState};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SyncError};

/// Tracked state of one managed table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecord {
    /// Stable identifier, `namespace.table` at creation time.
    pub id: String,
    /// The declaration that is known to be applied. Used as the prior state
    /// of the next reconciliation.
    pub declared: DesiredState,
    /// Columns read back from the server after the last run.
    pub observed: Option<ObservedState>,
    /// When this record last changed.
    pub updated_at: DateTime<Utc>,
}

impl ResourceRecord {
    /// Creates a record for a freshly created table.
    #[must_use]
    pub fn new(declared: DesiredState) -> Self {
        Self {
            id: declared.identity.to_string(),
            declared,
            observed: None,
            updated_at: Utc::now(),
        }
    }

    /// Replaces the declared state.
    #[must_use]
    pub fn with_declared(mut self, declared: DesiredState) -> Self {
        self.declared = declared;
        self.updated_at = Utc::now();
        self
    }

    /// Replaces the observed state.
    #[must_use]
    pub fn with_observed(mut self, observed: ObservedState) -> Self {
        self.observed = Some(observed);
        self.updated_at = Utc::now();
        self
    }
}

/// A JSON file holding one [`ResourceRecord`].
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    /// Creates a handle for `path`. Nothing is read yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the state file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the record, or `None` if the file does not exist.
    pub fn load(&self) -> Result<Option<ResourceRecord>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Loads the record, failing if the file does not exist.
    pub fn load_required(&self) -> Result<ResourceRecord> {
        self.load()?
            .ok_or_else(|| SyncError::StateNotFound(self.path.clone()))
    }

    /// Writes the record, replacing any previous content.
    pub fn save(&self, record: &ResourceRecord) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(record)?;
        std::fs::write(&self.path, content)?;
        debug!(path = %self.path.display(), id = %record.id, "Saved state");
        Ok(())
    }

    /// Deletes the file. Returns whether it existed.
    pub fn remove(&self) -> Result<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
