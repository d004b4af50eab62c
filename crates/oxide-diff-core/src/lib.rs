//! Schema diff engine for MySQL databases.
//!
//! `oxide-diff-core` compares the structure of a "current" database with a
//! "wanted" one and returns the ordered DDL statements that reconcile them,
//! along with a [`Severity`](severity::Severity) describing how risky
//! applying them would be.
//!
//! # Architecture
//!
//! - **Schema** - Immutable snapshot of tables, fields and indexes, built
//!   from plain definitions. Every DDL fragment is rendered at build time.
//! - **Dialect** - Renders those fragments (`MySqlRenderer`).
//! - **Differ** - Selects fragments and classifies the changes.
//! - **Severity** - Ordered risk levels and their exit codes.
//! - **Report** - Diagnostics and output formatting.
//!
//! The crate performs no I/O.
//!
//! # Example
//!
//! ```rust
//! use oxide_diff_core::prelude::*;
//!
//! let current = SchemaDef::new()
//!     .table(
//!         TableDef::new("users")
//!             .field(FieldDef::new("id", "int").not_null().auto_increment())
//!             .index(IndexDef::primary(["id"])),
//!     )
//!     .build(&MySqlRenderer)
//!     .unwrap();
//!
//! let wanted = SchemaDef::new()
//!     .table(
//!         TableDef::new("users")
//!             .field(FieldDef::new("id", "int").not_null().auto_increment())
//!             .field(FieldDef::new("email", "varchar(255)").not_null().default_value(""))
//!             .index(IndexDef::primary(["id"])),
//!     )
//!     .build(&MySqlRenderer)
//!     .unwrap();
//!
//! let result = Differ::new().diff(&current, &wanted).unwrap();
//! assert_eq!(result.severity(), Severity::Safe);
//! assert_eq!(
//!     result.sql(),
//!     "ALTER TABLE `users` ADD COLUMN `email` varchar(255) NOT NULL DEFAULT '';\n\n"
//! );
//! ```

pub mod dialect;
pub mod differ;
pub mod error;
pub mod report;
pub mod schema;
pub mod severity;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::dialect::{DdlRenderer, MySqlRenderer};
    pub use crate::differ::{DiffProfile, DiffResult, Differ};
    pub use crate::error::{DiffError, SchemaError, UnsupportedKind};
    pub use crate::report::{ColumnType, Diagnostic, DiffReport};
    pub use crate::schema::{
        Field, FieldDef, Index, IndexDef, Schema, SchemaDef, Table, TableDef,
    };
    pub use crate::severity::{Severity, FATAL_EXIT_CODE};
}

/// Compares two schemas with the strict profile.
///
/// # Errors
///
/// See [`Differ::diff`](differ::Differ::diff).
pub fn diff(
    current: &schema::Schema,
    wanted: &schema::Schema,
) -> error::Result<differ::DiffResult> {
    differ::Differ::new().diff(current, wanted)
}
