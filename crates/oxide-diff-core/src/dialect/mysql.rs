//! MySQL rendering policy.
//!
//! Column changes use `MODIFY COLUMN` with the complete wanted definition,
//! so an alter statement always restates type, collation, nullability,
//! default, auto-increment and comment. Comments are omitted when empty,
//! which clears them on `MODIFY`.
//!
//! Column attributes outside that list are not modeled. An
//! `ON UPDATE CURRENT_TIMESTAMP` clause or a generated-column expression is
//! therefore dropped by any `ADD COLUMN` or `MODIFY COLUMN` rendered here;
//! only a server-reported `CREATE TABLE` text keeps them.

use crate::schema::{FieldDef, IndexDef, TableDef};

use super::DdlRenderer;

/// The canonical MySQL renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlRenderer;

impl MySqlRenderer {
    /// Creates a new MySQL renderer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Renders a raw default value: expressions and bit literals verbatim,
    /// anything else as a string literal. Numbers are quoted too: MySQL
    /// converts `'5'` on numeric columns.
    #[must_use]
    pub fn default_clause(&self, value: &str) -> String {
        if is_expression_default(value) || is_bit_literal(value) {
            value.to_string()
        } else {
            self.quote_literal(value)
        }
    }

    fn column_list(&self, index: &IndexDef) -> String {
        let quoted: Vec<String> = index
            .column_names()
            .map(|c| self.quote_identifier(c))
            .collect();
        format!("({})", quoted.join(","))
    }

    fn using_clause(index: &IndexDef) -> String {
        if index.index_type.is_empty() {
            String::new()
        } else {
            format!(" USING {}", index.index_type)
        }
    }

    /// `FULLTEXT` and `SPATIAL` are index kinds, not algorithms.
    fn keyword_kind(index: &IndexDef) -> Option<&'static str> {
        if index.index_type.eq_ignore_ascii_case("FULLTEXT") {
            Some("FULLTEXT")
        } else if index.index_type.eq_ignore_ascii_case("SPATIAL") {
            Some("SPATIAL")
        } else {
            None
        }
    }
}

fn is_expression_default(value: &str) -> bool {
    value.eq_ignore_ascii_case("NULL")
        || (value.starts_with('(') && value.ends_with(')'))
        || is_temporal_default(value)
}

/// Returns true for the temporal functions MySQL accepts as an unparenthesized
/// default, such as `CURRENT_TIMESTAMP` or `now(6)`.
#[must_use]
pub fn is_temporal_default(value: &str) -> bool {
    let upper = value.to_ascii_uppercase();
    let (head, tail) = match upper.find('(') {
        Some(pos) => upper.split_at(pos),
        None => (upper.as_str(), ""),
    };
    let known = matches!(
        head,
        "CURRENT_TIMESTAMP" | "LOCALTIME" | "LOCALTIMESTAMP" | "NOW" | "CURRENT_DATE"
    );
    let precision_ok = tail.is_empty()
        || tail
            .strip_prefix('(')
            .and_then(|t| t.strip_suffix(')'))
            .is_some_and(|digits| digits.chars().all(|c| c.is_ascii_digit()));
    known && precision_ok
}

fn is_bit_literal(value: &str) -> bool {
    value
        .strip_prefix("b'")
        .and_then(|v| v.strip_suffix('\''))
        .is_some_and(|bits| !bits.is_empty() && bits.chars().all(|c| c == '0' || c == '1'))
}

impl DdlRenderer for MySqlRenderer {
    fn field_definition(&self, field: &FieldDef) -> String {
        let mut parts = vec![field.sql_type.clone()];

        if let Some(collation) = &field.collation {
            parts.push(format!("COLLATE {collation}"));
        }

        parts.push(if field.nullable { "NULL" } else { "NOT NULL" }.to_string());

        if let Some(default) = &field.default {
            parts.push(format!("DEFAULT {}", self.default_clause(default)));
        }

        if field.auto_increment {
            parts.push("AUTO_INCREMENT".to_string());
        }

        if !field.comment.is_empty() {
            parts.push(format!("COMMENT {}", self.quote_literal(&field.comment)));
        }

        parts.join(" ")
    }

    fn index_definition(&self, index: &IndexDef) -> String {
        let columns = self.column_list(index);
        if index.is_primary() {
            return format!("PRIMARY KEY {columns}{}", Self::using_clause(index));
        }
        let name = self.quote_identifier(&index.name);
        match Self::keyword_kind(index) {
            Some(kind) => format!("{kind} KEY {name} {columns}"),
            None if index.unique => {
                format!("UNIQUE KEY {name} {columns}{}", Self::using_clause(index))
            }
            None => format!("KEY {name} {columns}{}", Self::using_clause(index)),
        }
    }

    fn table_options(&self, table: &TableDef) -> String {
        format!(
            "ENGINE={} DEFAULT COLLATE={}",
            table.engine, table.collation
        )
    }

    fn alter_field(&self, table: &str, field: &FieldDef) -> String {
        format!(
            "ALTER TABLE {} MODIFY COLUMN {} {}",
            self.quote_identifier(table),
            self.quote_identifier(&field.name),
            self.field_definition(field)
        )
    }

    fn create_index(&self, table: &str, index: &IndexDef) -> String {
        let table = self.quote_identifier(table);
        let columns = self.column_list(index);
        if index.is_primary() {
            return format!(
                "ALTER TABLE {table} ADD PRIMARY KEY{} {columns}",
                Self::using_clause(index)
            );
        }
        let name = self.quote_identifier(&index.name);
        match Self::keyword_kind(index) {
            Some(kind) => format!("ALTER TABLE {table} ADD {kind} INDEX {name} {columns}"),
            None => format!(
                "ALTER TABLE {table} ADD {}INDEX {name}{} {columns}",
                if index.unique { "UNIQUE " } else { "" },
                Self::using_clause(index)
            ),
        }
    }

    fn drop_index(&self, table: &str, index: &IndexDef) -> String {
        if index.is_primary() {
            format!("ALTER TABLE {} DROP PRIMARY KEY", self.quote_identifier(table))
        } else {
            format!(
                "ALTER TABLE {} DROP INDEX {}",
                self.quote_identifier(table),
                self.quote_identifier(&index.name)
            )
        }
    }
}
