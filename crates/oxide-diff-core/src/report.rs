//! Caller-facing output: diagnostics, the statement stream and the
//! machine-readable summary.

use std::fmt;

use serde::Serialize;

use crate::differ::DiffResult;
use crate::severity::Severity;

/// A column's type together with its collation, as shown in diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnType {
    /// Raw column type.
    pub sql_type: String,
    /// Column collation.
    pub collation: Option<String>,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.collation {
            Some(collation) => write!(f, "{} COLLATE {collation}", self.sql_type),
            None => f.write_str(&self.sql_type),
        }
    }
}

/// An advisory notice about a risky change. Never aborts a comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A table present in the current schema is dropped.
    TableDropped {
        /// Table name.
        table: String,
    },
    /// A column present in the current schema is dropped.
    FieldDropped {
        /// Table name.
        table: String,
        /// Column name.
        field: String,
    },
    /// A column's type or collation changes.
    FieldTypeChanged {
        /// Table name.
        table: String,
        /// Column name.
        field: String,
        /// Type in the current schema.
        from: ColumnType,
        /// Type in the wanted schema.
        to: ColumnType,
    },
}

impl Diagnostic {
    /// The table the notice is about.
    #[must_use]
    pub fn table(&self) -> &str {
        match self {
            Self::TableDropped { table }
            | Self::FieldDropped { table, .. }
            | Self::FieldTypeChanged { table, .. } => table,
        }
    }

    /// The column the notice is about, if any.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::TableDropped { .. } => None,
            Self::FieldDropped { field, .. } | Self::FieldTypeChanged { field, .. } => Some(field),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Table={}]", self.table())?;
        if let Some(field) = self.field() {
            write!(f, "[Field={field}]")?;
        }
        match self {
            Self::TableDropped { .. } => f.write_str("Table dropped"),
            Self::FieldDropped { .. } => f.write_str("Field dropped"),
            Self::FieldTypeChanged { from, to, .. } => {
                write!(f, "Field type has changed from {from} to {to}")
            }
        }
    }
}

/// Renders statements as a script: each one terminated by `;` and
/// followed by a blank line.
#[must_use]
pub fn render_statements<S: AsRef<str>>(statements: &[S]) -> String {
    statements
        .iter()
        .map(|s| format!("{};\n\n", s.as_ref()))
        .collect()
}

/// Serializable summary of a completed comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffReport {
    /// Highest severity reached.
    pub severity: Severity,
    /// Process exit code for `severity`.
    pub exit_code: u8,
    /// Statements in application order.
    pub statements: Vec<String>,
    /// Diagnostic lines in emission order.
    pub diagnostics: Vec<String>,
}

impl From<&DiffResult> for DiffReport {
    fn from(result: &DiffResult) -> Self {
        Self {
            severity: result.severity(),
            exit_code: result.severity().exit_code(),
            statements: result.statements().to_vec(),
            diagnostics: result.diagnostic_lines().collect(),
        }
    }
}
