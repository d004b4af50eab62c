//! Error types for schema extraction.

use oxide_diff_core::error::SchemaError;

/// Errors that can occur while producing a schema snapshot.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// Database error during introspection.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// IO error (reading or writing snapshot files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A snapshot file is not valid JSON for the snapshot format.
    #[error("Invalid snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// Extracted definitions break a schema invariant.
    #[error("Invalid schema: {0}")]
    Schema(#[from] SchemaError),

    /// The source string is neither a MySQL URL nor a file path.
    #[error("Invalid source '{input}': {reason}")]
    InvalidSource {
        /// The source, with credentials removed.
        input: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// A view or other non-table object was found.
    #[error("[Table={table}] Only tables are supported, found {kind}")]
    UnsupportedObject {
        /// Object name.
        table: String,
        /// Object type as reported by the server.
        kind: String,
    },

    /// The server returned a value that cannot be mapped onto the model.
    #[error("[Table={table}] Unexpected {attribute}: {detail}")]
    InvalidValue {
        /// Table name.
        table: String,
        /// Attribute being read.
        attribute: &'static str,
        /// What was found.
        detail: String,
    },
}

/// Result type for extraction.
pub type Result<T> = std::result::Result<T, ExtractError>;
