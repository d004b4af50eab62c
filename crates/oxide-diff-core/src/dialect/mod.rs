//! DDL rendering.
//!
//! A renderer turns extracted definitions into the statement text attached
//! to each entity of a [`Schema`](crate::schema::Schema). It runs once per
//! entity when the snapshot is built; the diff engine only selects among the
//! rendered strings.

mod mysql;

pub use mysql::{is_temporal_default, MySqlRenderer};

use crate::schema::{FieldDef, IndexDef, TableDef};

/// Trait for dialect-specific DDL generation.
pub trait DdlRenderer {
    /// Quote an identifier (table, column or index name).
    fn quote_identifier(&self, name: &str) -> String {
        format!("`{}`", name.replace('`', "``"))
    }

    /// Renders a string as an escaped, quoted SQL literal.
    fn quote_literal(&self, value: &str) -> String {
        quote_literal(value)
    }

    /// Renders the column definition following the column name.
    fn field_definition(&self, field: &FieldDef) -> String;

    /// Renders an index line inside a CREATE TABLE body.
    fn index_definition(&self, index: &IndexDef) -> String;

    /// Renders the trailing table options of a CREATE TABLE.
    fn table_options(&self, table: &TableDef) -> String;

    /// Generates SQL for CREATE TABLE.
    fn create_table(&self, table: &TableDef) -> String {
        let mut sql = String::from("CREATE TABLE ");
        sql.push_str(&self.quote_identifier(&table.name));
        sql.push_str(" (\n");

        let lines: Vec<String> = table
            .fields
            .iter()
            .map(|f| {
                format!(
                    "  {} {}",
                    self.quote_identifier(&f.name),
                    self.field_definition(f)
                )
            })
            .chain(
                table
                    .indexes
                    .iter()
                    .map(|i| format!("  {}", self.index_definition(i))),
            )
            .collect();
        sql.push_str(&lines.join(",\n"));

        sql.push_str("\n) ");
        sql.push_str(&self.table_options(table));
        sql
    }

    /// Generates SQL for DROP TABLE.
    fn drop_table(&self, table: &str) -> String {
        format!("DROP TABLE {}", self.quote_identifier(table))
    }

    /// Generates SQL for ADD COLUMN.
    fn add_field(&self, table: &str, field: &FieldDef) -> String {
        format!(
            "ALTER TABLE {} ADD COLUMN {} {}",
            self.quote_identifier(table),
            self.quote_identifier(&field.name),
            self.field_definition(field)
        )
    }

    /// Generates SQL for DROP COLUMN.
    fn drop_field(&self, table: &str, field: &str) -> String {
        format!(
            "ALTER TABLE {} DROP COLUMN {}",
            self.quote_identifier(table),
            self.quote_identifier(field)
        )
    }

    /// Generates SQL changing a column to `field`'s definition.
    fn alter_field(&self, table: &str, field: &FieldDef) -> String;

    /// Generates SQL adding an index to an existing table.
    fn create_index(&self, table: &str, index: &IndexDef) -> String;

    /// Generates SQL removing an index from an existing table.
    fn drop_index(&self, table: &str, index: &IndexDef) -> String;
}

/// Escapes a string for use inside a single-quoted SQL literal.
///
/// The escaped set matches the MySQL client library: NUL, `\n`, `\r`, `\`,
/// `'`, `"` and Ctrl-Z.
#[must_use]
pub fn escape_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\0' => out.push_str("\\0"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\u{1a}' => out.push_str("\\Z"),
            _ => out.push(c),
        }
    }
    out
}

/// Escapes `value` and wraps it in single quotes.
#[must_use]
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", escape_string(value))
}
