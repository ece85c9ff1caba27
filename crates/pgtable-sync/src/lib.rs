//! Converge live PostgreSQL tables to their declared column layout.
//!
//! `pgtable-sync` is the database side of `pgtable`. It reads the live
//! columns of a table from `information_schema.columns` and executes the
//! statements planned by [`pgtable_core`] against a connection pool.
//!
//! # Architecture
//!
//! - **Connection** - [`SqlConnection`](connection::SqlConnection), the two
//!   capabilities the engine needs: run DDL, run the catalog query
//! - **Reader** - reads the observed state of one table
//! - **Reconciler** - plans and applies create, rename and column changes
//! - **Lifecycle** - create/read/update/delete of a tracked table
//! - **Registry** - one shared pool per connection descriptor
//! - **State** - the JSON state file used as prior state between runs
//!
//! # Example
//!
//! ```rust,ignore
//! use pgtable_sync::prelude::*;
//!
//! let registry = ConnectionRegistry::new();
//! let pool = registry.connect(&ConnectionConfig::default())?;
//!
//! let desired = TableState::new(
//!     TableIdentity::new("public", "users"),
//!     ColumnList::new().column("id", "int").column("name", "text"),
//! );
//! let resource = TableResource::new(Reconciler::new(pool));
//! let record = resource.create(desired).await?;
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Show the statements a definition would run
//! pgtable-sync plan --definition users.json
//!
//! # Create or converge the table
//! pgtable-sync apply --definition users.json
//!
//! # Read the live columns
//! pgtable-sync read
//! ```

pub mod config;
pub mod connection;
pub mod definition;
pub mod error;
pub mod lifecycle;
pub mod reader;
pub mod reconciler;
pub mod registry;
pub mod state;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::ConnectionConfig;
    pub use crate::connection::{ColumnRow, SqlConnection};
    pub use crate::definition::TableDefinition;
    pub use crate::error::{Result, SyncError};
    pub use crate::lifecycle::{CreateFailure, TableResource, UpdateFailure};
    pub use crate::reader::SchemaReader;
    pub use crate::reconciler::{ApplyMode, ApplyReport, Reconciler};
    pub use crate::registry::ConnectionRegistry;
    pub use crate::state::{ResourceRecord, StateFile};
    pub use pgtable_core::{
        Column, ColumnList, DesiredState, ObservedState, PriorState, Statement, TableIdentity,
        TableState,
    };
}
