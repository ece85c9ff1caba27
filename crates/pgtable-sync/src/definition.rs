//! Declared table definitions.
//!
//! A definition is the JSON document a user writes:
//!
//! ```json
//! {
//!   "schema": "public",
//!   "table": "users",
//!   "columns": [
//!     { "name": "id", "type": "int" },
//!     { "name": "name", "type": "text" }
//!   ]
//! }
//! ```

use std::path::Path;
use std::sync::LazyLock;

use pgtable_core::{ColumnList, DesiredState, TableIdentity};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};

static TYPE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[a-z]+$").expect("valid type pattern"));

/// A table declaration as written by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDefinition {
    /// Namespace the table lives in.
    pub schema: String,
    /// Table name.
    pub table: String,
    /// Columns in order.
    pub columns: ColumnList,
}

impl TableDefinition {
    /// Reads a definition from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parses a definition from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Checks column types and converts to the desired state.
    ///
    /// Types must be lower-case alphabetic (`int`, `text`, `bool`). Names are
    /// validated later, when statements are planned.
    pub fn into_state(self) -> Result<DesiredState> {
        if let Some(column) = self
            .columns
            .iter()
            .find(|c| !TYPE_PATTERN.is_match(&c.column_type))
        {
            return Err(SyncError::InvalidType {
                column: column.name.clone(),
                column_type: column.column_type.clone(),
            });
        }

        Ok(DesiredState::new(
            TableIdentity::new(self.schema, self.table),
            self.columns,
        ))
    }
}
