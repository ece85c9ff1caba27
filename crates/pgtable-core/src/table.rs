//! Table identity and table state.

use serde::{Deserialize, Serialize};

use crate::column::ColumnList;
use crate::error::{Result, ValidationError};
use crate::quote::quote_identifier;
use crate::statement::Statement;

/// Where a table lives: its namespace (PostgreSQL schema) and its name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableIdentity {
    /// Namespace, taken from trusted configuration and never quoted.
    pub namespace: String,
    /// Table name, always quoted in generated SQL.
    pub table: String,
}

impl TableIdentity {
    /// Creates a new table identity.
    #[must_use]
    pub fn new(namespace: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            table: table.into(),
        }
    }

    /// Returns `namespace."table"`, the name used in generated statements.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.namespace, quote_identifier(&self.table))
    }

    /// Returns the same identity with another table name.
    #[must_use]
    pub fn renamed(&self, table: impl Into<String>) -> Self {
        Self {
            namespace: self.namespace.clone(),
            table: table.into(),
        }
    }

    /// Checks that neither part is empty.
    pub fn validate(&self) -> Result<()> {
        if self.namespace.is_empty() {
            return Err(ValidationError::EmptyNamespace);
        }
        if self.table.is_empty() {
            return Err(ValidationError::EmptyTableName);
        }
        for name in [&self.namespace, &self.table] {
            if name.contains('\0') {
                return Err(ValidationError::NulInName { name: name.clone() });
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for TableIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.namespace, self.table)
    }
}

/// A table and its ordered columns.
///
/// The same shape describes what the caller wants ([`DesiredState`]), what
/// the database reports ([`ObservedState`]) and what was accepted by the
/// last successful reconciliation ([`PriorState`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableState {
    /// Table identity.
    pub identity: TableIdentity,
    /// Columns in physical order.
    pub columns: ColumnList,
}

/// The state the caller wants to exist.
pub type DesiredState = TableState;

/// The state read back from the live catalog.
pub type ObservedState = TableState;

/// The desired state accepted by the previous successful reconciliation.
pub type PriorState = TableState;

impl TableState {
    /// Creates a new table state.
    #[must_use]
    pub fn new(identity: TableIdentity, columns: ColumnList) -> Self {
        Self { identity, columns }
    }

    /// Validates the identity and the column list.
    pub fn validate(&self) -> Result<()> {
        self.identity.validate()?;
        self.columns.validate()
    }

    /// Returns the state obtained by applying `statements` to this one.
    ///
    /// Used after a partially applied batch: replaying the statements that
    /// did succeed yields the schema that actually exists, so the next plan is
    /// computed from a true baseline.
    #[must_use]
    pub fn replay<'a>(&self, statements: impl IntoIterator<Item = &'a Statement>) -> Self {
        let mut state = self.clone();
        for statement in statements {
            match statement {
                Statement::CreateTable { table, columns } => {
                    state.identity = table.clone();
                    state.columns = columns.clone();
                }
                Statement::RenameTable { table, new_name } => {
                    state.identity = table.renamed(new_name.clone());
                }
                Statement::AddColumn { column, .. } => state.columns.push(column.clone()),
                Statement::DropColumn { column_name, .. } => {
                    state.columns.remove_named(column_name);
                }
                Statement::RenameColumn {
                    old_name, new_name, ..
                } => {
                    if let Some(column) = state.columns.get_named_mut(old_name) {
                        column.name = new_name.clone();
                    }
                }
                Statement::AlterColumnType {
                    column_name,
                    new_type,
                    ..
                } => {
                    if let Some(column) = state.columns.get_named_mut(column_name) {
                        column.column_type = new_type.clone();
                    }
                }
            }
        }
        state
    }
}
