//! Schema-mutating statements and their SQL rendering.

use std::fmt;

use crate::column::{Column, ColumnList};
use crate::quote::quote_identifier;
use crate::table::TableIdentity;

/// A single DDL statement addressed to one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `CREATE TABLE IF NOT EXISTS`.
    CreateTable {
        /// Table to create.
        table: TableIdentity,
        /// Columns in declaration order.
        columns: ColumnList,
    },

    /// `ALTER TABLE ... RENAME TO`.
    RenameTable {
        /// Table under its current name.
        table: TableIdentity,
        /// New table name.
        new_name: String,
    },

    /// `ALTER TABLE ... ADD COLUMN`.
    AddColumn {
        /// Table name.
        table: TableIdentity,
        /// Column to add.
        column: Column,
    },

    /// `ALTER TABLE ... DROP COLUMN ... RESTRICT`.
    ///
    /// Never cascades: the statement fails if other objects depend on the
    /// column.
    DropColumn {
        /// Table name.
        table: TableIdentity,
        /// Column to drop.
        column_name: String,
    },

    /// `ALTER TABLE ... RENAME COLUMN`.
    RenameColumn {
        /// Table name.
        table: TableIdentity,
        /// Current column name.
        old_name: String,
        /// New column name.
        new_name: String,
    },

    /// `ALTER TABLE ... ALTER COLUMN ... TYPE ... USING`.
    AlterColumnType {
        /// Table name.
        table: TableIdentity,
        /// Column to retype.
        column_name: String,
        /// New SQL type.
        new_type: String,
    },
}

impl Statement {
    /// Short label for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreateTable { .. } => "create_table",
            Self::RenameTable { .. } => "rename_table",
            Self::AddColumn { .. } => "add_column",
            Self::DropColumn { .. } => "drop_column",
            Self::RenameColumn { .. } => "rename_column",
            Self::AlterColumnType { .. } => "alter_column_type",
        }
    }

    /// The table this statement is addressed to.
    #[must_use]
    pub fn table(&self) -> &TableIdentity {
        match self {
            Self::CreateTable { table, .. }
            | Self::RenameTable { table, .. }
            | Self::AddColumn { table, .. }
            | Self::DropColumn { table, .. }
            | Self::RenameColumn { table, .. }
            | Self::AlterColumnType { table, .. } => table,
        }
    }

    /// Renders the statement as PostgreSQL DDL.
    ///
    /// Table and column names are quoted; types are interpolated verbatim.
    #[must_use]
    pub fn to_sql(&self) -> String {
        match self {
            Self::CreateTable { table, columns } => {
                let defs: Vec<String> = columns
                    .iter()
                    .map(|c| format!("{} {}", quote_identifier(&c.name), c.column_type))
                    .collect();
                format!(
                    "CREATE TABLE IF NOT EXISTS {} ({})",
                    table.qualified_name(),
                    defs.join(", ")
                )
            }
            Self::RenameTable { table, new_name } => format!(
                "ALTER TABLE {} RENAME TO {}",
                table.qualified_name(),
                quote_identifier(new_name)
            ),
            Self::AddColumn { table, column } => format!(
                "ALTER TABLE {} ADD COLUMN {} {}",
                table.qualified_name(),
                quote_identifier(&column.name),
                column.column_type
            ),
            Self::DropColumn { table, column_name } => format!(
                "ALTER TABLE {} DROP COLUMN {} RESTRICT",
                table.qualified_name(),
                quote_identifier(column_name)
            ),
            Self::RenameColumn {
                table,
                old_name,
                new_name,
            } => format!(
                "ALTER TABLE {} RENAME COLUMN {} TO {}",
                table.qualified_name(),
                quote_identifier(old_name),
                quote_identifier(new_name)
            ),
            Self::AlterColumnType {
                table,
                column_name,
                new_type,
            } => {
                let column = quote_identifier(column_name);
                format!(
                    "ALTER TABLE {} ALTER COLUMN {column} TYPE {new_type} USING ({column}::{new_type})",
                    table.qualified_name()
                )
            }
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}
