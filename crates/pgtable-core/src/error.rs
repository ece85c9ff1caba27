//! Validation errors raised before any statement is built.

/// A declared table or column list that cannot be turned into DDL.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A column has an empty name.
    #[error("column at position {index} has an empty name")]
    EmptyColumnName {
        /// Position of the column in the declared list.
        index: usize,
    },

    /// Two columns share the same name.
    #[error("there is a duplicate column {name:?} (positions {first} and {second})")]
    DuplicateColumn {
        /// The repeated name.
        name: String,
        /// Position of the first occurrence.
        first: usize,
        /// Position of the repeated occurrence.
        second: usize,
    },

    /// A name contains a NUL character, which PostgreSQL identifiers cannot
    /// hold.
    #[error("name {name:?} contains a NUL character")]
    NulInName {
        /// The offending name.
        name: String,
    },

    /// The table name is empty.
    #[error("table name must not be empty")]
    EmptyTableName,

    /// The namespace is empty.
    #[error("namespace must not be empty")]
    EmptyNamespace,

    /// Moving a table to another namespace is not supported.
    #[error("cannot move table {table:?} from namespace {from:?} to {to:?}")]
    NamespaceChanged {
        /// Table name.
        table: String,
        /// Previously declared namespace.
        from: String,
        /// Newly declared namespace.
        to: String,
    },
}

/// Result type for planning operations.
pub type Result<T> = std::result::Result<T, ValidationError>;
