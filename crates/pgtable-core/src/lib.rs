//! # pgtable-core
//!
//! Column model and DDL planner for declaratively managed PostgreSQL tables.
//!
//! A table is described by its namespace, its name and an ordered list of
//! `(name, type)` columns. Given the previously accepted declaration and a new
//! one, the planner produces the minimal ordered list of statements (create,
//! rename table, add/drop/rename/retype column) that converges the live table.
//!
//! This crate performs no I/O. Executing the statements and reading the live
//! catalog is the job of `pgtable-sync`.
//!
//! ```rust
//! use pgtable_core::{ColumnList, TableIdentity, TableState, plan_update};
//!
//! let prior = TableState::new(
//!     TableIdentity::new("public", "users"),
//!     ColumnList::new().column("id", "int"),
//! );
//! let desired = TableState::new(
//!     TableIdentity::new("public", "users"),
//!     ColumnList::new().column("id", "int").column("name", "text"),
//! );
//!
//! let statements = plan_update(&prior, &desired).unwrap();
//! assert_eq!(
//!     statements[0].to_sql(),
//!     "ALTER TABLE public.\"users\" ADD COLUMN \"name\" text"
//! );
//! ```
//!
//! Drops always use `RESTRICT` and type changes always carry an explicit
//! `USING (<column>::<type>)` cast.

pub mod column;
pub mod error;
pub mod plan;
pub mod quote;
pub mod statement;
pub mod table;

pub use column::{Column, ColumnList};
pub use error::ValidationError;
pub use plan::{plan_columns, plan_create, plan_rename_table, plan_update};
pub use quote::quote_identifier;
pub use statement::Statement;
pub use table::{DesiredState, ObservedState, PriorState, TableIdentity, TableState};
