//! Reconciliation planner.
//!
//! Turns a previously declared and a newly declared table into the ordered
//! list of [`Statement`]s that converges the live table. Planning is pure:
//! nothing here touches a database, and every input is validated before the
//! first statement is built.
//!
//! Columns are compared by position, not by name. The Nth declared column is
//! compared with what the Nth declared column used to be:
//!
//! 1. Columns past the end of the shorter list are added (when the list grew)
//!    or dropped (when it shrank), in ascending position.
//! 2. Over the overlapping range, a name change yields `RENAME COLUMN` and a
//!    type change yields `ALTER COLUMN ... TYPE`. Both can fire for the same
//!    position; the rename comes first and the retype uses the new name.

use crate::column::ColumnList;
use crate::error::{Result, ValidationError};
use crate::statement::Statement;
use crate::table::{DesiredState, PriorState, TableIdentity};

// ================================================================
// Single-purpose plans
// ================================================================

/// Plans the creation of a table.
///
/// The result is always a single `CREATE TABLE IF NOT EXISTS`, so creating an
/// existing table is a no-op and never alters its columns.
pub fn plan_create(desired: &DesiredState) -> Result<Statement> {
    desired.validate()?;
    Ok(Statement::CreateTable {
        table: desired.identity.clone(),
        columns: desired.columns.clone(),
    })
}

/// Plans renaming the table `current` to `new_name`.
pub fn plan_rename_table(current: &TableIdentity, new_name: &str) -> Result<Statement> {
    current.validate()?;
    current.renamed(new_name).validate()?;
    Ok(Statement::RenameTable {
        table: current.clone(),
        new_name: new_name.to_string(),
    })
}

/// Plans the column changes that turn `prior` into `desired` on `table`.
///
/// Returns no statements when both lists are equal.
pub fn plan_columns(
    table: &TableIdentity,
    prior: &ColumnList,
    desired: &ColumnList,
) -> Result<Vec<Statement>> {
    table.validate()?;
    prior.validate()?;
    desired.validate()?;

    let mut statements = Vec::new();

    if desired.len() >= prior.len() {
        for column in desired.iter().skip(prior.len()) {
            statements.push(Statement::AddColumn {
                table: table.clone(),
                column: column.clone(),
            });
        }
    } else {
        for column in prior.iter().skip(desired.len()) {
            statements.push(Statement::DropColumn {
                table: table.clone(),
                column_name: column.name.clone(),
            });
        }
    }

    for (old, new) in prior.iter().zip(desired.iter()) {
        if old.name != new.name {
            statements.push(Statement::RenameColumn {
                table: table.clone(),
                old_name: old.name.clone(),
                new_name: new.name.clone(),
            });
        }
        if old.column_type != new.column_type {
            statements.push(Statement::AlterColumnType {
                table: table.clone(),
                column_name: new.name.clone(),
                new_type: new.column_type.clone(),
            });
        }
    }

    Ok(statements)
}

// ================================================================
// Full update
// ================================================================

/// Plans every statement needed to go from `prior` to `desired`.
///
/// A table rename, if any, comes first; the column statements that follow are
/// addressed to the new name.
pub fn plan_update(prior: &PriorState, desired: &DesiredState) -> Result<Vec<Statement>> {
    prior.identity.validate()?;
    desired.identity.validate()?;

    if prior.identity.namespace != desired.identity.namespace {
        return Err(ValidationError::NamespaceChanged {
            table: prior.identity.table.clone(),
            from: prior.identity.namespace.clone(),
            to: desired.identity.namespace.clone(),
        });
    }

    // Validate both lists before building anything, including the rename.
    prior.columns.validate()?;
    desired.columns.validate()?;

    let mut statements = Vec::new();
    if prior.identity.table != desired.identity.table {
        statements.push(plan_rename_table(
            &prior.identity,
            &desired.identity.table,
        )?);
    }
    statements.extend(plan_columns(
        &desired.identity,
        &prior.columns,
        &desired.columns,
    )?);
    Ok(statements)
}
