//! Error types for the schema model and the diff engine.

use std::fmt;

/// Errors raised while building a [`Schema`](crate::schema::Schema) from
/// extracted definitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// Two tables share the same name.
    #[error("Duplicate table '{0}'")]
    DuplicateTable(String),

    /// Two fields of a table share the same name.
    #[error("[Table={table}] Duplicate field '{field}'")]
    DuplicateField {
        /// Table owning the fields.
        table: String,
        /// The repeated field name.
        field: String,
    },

    /// Two indexes of a table share the same name.
    #[error("[Table={table}] Duplicate index '{index}'")]
    DuplicateIndex {
        /// Table owning the indexes.
        table: String,
        /// The repeated index name.
        index: String,
    },

    /// An index has no columns at all.
    #[error("[Table={table}] Index '{index}' has no columns")]
    EmptyIndex {
        /// Table owning the index.
        table: String,
        /// Index name.
        index: String,
    },

    /// Index column positions do not form the sequence `1..=N`.
    #[error("[Table={table}] Index '{index}' expects column position {expected}, found {found}")]
    NonContiguousIndex {
        /// Table owning the index.
        table: String,
        /// Index name.
        index: String,
        /// The position that should come next.
        expected: u32,
        /// The position actually found.
        found: u32,
    },
}

/// Table-level attribute that the diff engine refuses to reconcile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsupportedKind {
    /// Storage engine differs.
    Engine,
    /// Default table collation differs.
    Collation,
}

impl fmt::Display for UnsupportedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Engine => f.write_str("Engine"),
            Self::Collation => f.write_str("Collation"),
        }
    }
}

/// Fatal errors that abort a comparison.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiffError {
    /// An engine or collation change was requested on an existing table.
    #[error("[Table={table}] {kind} update not supported ('{current}' -> '{wanted}', detected in {phase})")]
    UnsupportedChange {
        /// Table name.
        table: String,
        /// Which attribute differs.
        kind: UnsupportedKind,
        /// Value in the current schema.
        current: String,
        /// Value in the wanted schema.
        wanted: String,
        /// Diff phase that detected the change.
        phase: &'static str,
    },
}

/// Result type for diff operations.
pub type Result<T> = std::result::Result<T, DiffError>;
