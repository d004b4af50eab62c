//! Schema representation types.
//!
//! Extractors describe a database with the plain `*Def` records. Building a
//! [`Schema`] from them validates the naming invariants and renders every DDL
//! fragment the diff engine may later select, so the resulting snapshot is
//! immutable and never produces SQL on its own again.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::dialect::DdlRenderer;
use crate::error::SchemaError;

/// Name of the primary key index, as reported by MySQL.
pub const PRIMARY_INDEX: &str = "PRIMARY";

fn default_index_type() -> String {
    "BTREE".to_string()
}

/// Extracted description of a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Column name.
    pub name: String,
    /// Raw column type, e.g. `int(11) unsigned` or `varchar(64)`.
    #[serde(rename = "type")]
    pub sql_type: String,
    /// Column collation, `None` for non-textual types.
    #[serde(default)]
    pub collation: Option<String>,
    /// Whether the column accepts NULL.
    #[serde(default)]
    pub nullable: bool,
    /// Raw default value, `None` when the column has no default.
    #[serde(default)]
    pub default: Option<String>,
    /// Column comment; empty when there is none.
    #[serde(default)]
    pub comment: String,
    /// Whether the column is `AUTO_INCREMENT`.
    #[serde(default)]
    pub auto_increment: bool,
}

impl FieldDef {
    /// Creates a nullable column without default, comment or collation.
    #[must_use]
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            collation: None,
            nullable: true,
            default: None,
            comment: String::new(),
            auto_increment: false,
        }
    }

    /// Sets the column as NOT NULL.
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Sets the column collation.
    #[must_use]
    pub fn collation(mut self, collation: impl Into<String>) -> Self {
        self.collation = Some(collation.into());
        self
    }

    /// Sets the raw default value.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Sets the column comment.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Marks the column as `AUTO_INCREMENT`.
    #[must_use]
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }
}

/// Extracted description of an index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDef {
    /// Index name (`PRIMARY` for the primary key).
    pub name: String,
    /// Index algorithm, e.g. `BTREE`, `HASH` or `FULLTEXT`.
    #[serde(rename = "type", default = "default_index_type")]
    pub index_type: String,
    /// Indexed columns keyed by their 1-based position in the index.
    pub columns: BTreeMap<u32, String>,
    /// Whether the index enforces uniqueness.
    #[serde(default)]
    pub unique: bool,
}

impl IndexDef {
    /// Creates a non-unique BTREE index over `columns`, numbered from 1.
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            index_type: default_index_type(),
            columns: (1..).zip(columns.into_iter().map(Into::into)).collect(),
            unique: false,
        }
    }

    /// Creates the primary key index over `columns`.
    #[must_use]
    pub fn primary<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(PRIMARY_INDEX, columns).unique()
    }

    /// Marks the index as unique.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Sets the index algorithm.
    #[must_use]
    pub fn using(mut self, index_type: impl Into<String>) -> Self {
        self.index_type = index_type.into();
        self
    }

    /// Places `column` at `position`, replacing whatever was there.
    #[must_use]
    pub fn column_at(mut self, position: u32, column: impl Into<String>) -> Self {
        self.columns.insert(position, column.into());
        self
    }

    /// Returns the column names in index order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.values().map(String::as_str)
    }

    /// Returns whether this is the primary key.
    #[must_use]
    pub fn is_primary(&self) -> bool {
        self.name == PRIMARY_INDEX
    }
}

/// Extracted description of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDef {
    /// Table name.
    pub name: String,
    /// Storage engine.
    pub engine: String,
    /// Default table collation.
    pub collation: String,
    /// Columns in table order.
    #[serde(default)]
    pub fields: Vec<FieldDef>,
    /// Indexes in extraction order.
    #[serde(default)]
    pub indexes: Vec<IndexDef>,
    /// CREATE statement reported by the server, used verbatim when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_statement: Option<String>,
}

impl TableDef {
    /// Creates an empty InnoDB table with the `utf8mb4_general_ci` collation.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            engine: "InnoDB".to_string(),
            collation: "utf8mb4_general_ci".to_string(),
            fields: Vec::new(),
            indexes: Vec::new(),
            create_statement: None,
        }
    }

    /// Sets the storage engine.
    #[must_use]
    pub fn engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = engine.into();
        self
    }

    /// Sets the default table collation.
    #[must_use]
    pub fn collation(mut self, collation: impl Into<String>) -> Self {
        self.collation = collation.into();
        self
    }

    /// Appends a column.
    #[must_use]
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Appends an index.
    #[must_use]
    pub fn index(mut self, index: IndexDef) -> Self {
        self.indexes.push(index);
        self
    }

    /// Uses `sql` as the table's CREATE statement instead of rendering one.
    #[must_use]
    pub fn create_statement(mut self, sql: impl Into<String>) -> Self {
        self.create_statement = Some(sql.into());
        self
    }
}

/// Extracted description of a whole database. This is also the on-disk
/// snapshot format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDef {
    /// Tables in extraction order.
    pub tables: Vec<TableDef>,
}

impl SchemaDef {
    /// Creates an empty schema definition.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a table.
    #[must_use]
    pub fn table(mut self, table: TableDef) -> Self {
        self.tables.push(table);
        self
    }

    /// Validates the definitions and renders all DDL with `renderer`.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] when a name is repeated or an index's
    /// column positions are not `1..=N`.
    pub fn build(self, renderer: &impl DdlRenderer) -> Result<Schema, SchemaError> {
        Schema::build(self.tables, renderer)
    }
}

/// A column of a built [`Schema`], with its DDL fragments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    def: FieldDef,
    create_sql: String,
    drop_sql: String,
    alter_sql: String,
}

impl Field {
    fn build(table: &str, def: FieldDef, renderer: &impl DdlRenderer) -> Self {
        Self {
            create_sql: renderer.add_field(table, &def),
            drop_sql: renderer.drop_field(table, &def.name),
            alter_sql: renderer.alter_field(table, &def),
            def,
        }
    }

    /// Column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.def.name
    }

    /// Raw column type as reported by the server.
    #[must_use]
    pub fn sql_type(&self) -> &str {
        &self.def.sql_type
    }

    /// Column collation, if any.
    #[must_use]
    pub fn collation(&self) -> Option<&str> {
        self.def.collation.as_deref()
    }

    /// Whether the column accepts NULL.
    #[must_use]
    pub const fn nullable(&self) -> bool {
        self.def.nullable
    }

    /// Raw default value, unquoted.
    #[must_use]
    pub fn default_value(&self) -> Option<&str> {
        self.def.default.as_deref()
    }

    /// Column comment, empty when unset.
    #[must_use]
    pub fn comment(&self) -> &str {
        &self.def.comment
    }

    /// Whether the column is `AUTO_INCREMENT`.
    #[must_use]
    pub const fn auto_increment(&self) -> bool {
        self.def.auto_increment
    }

    /// `ALTER TABLE .. ADD COLUMN ..`
    #[must_use]
    pub fn create_sql(&self) -> &str {
        &self.create_sql
    }

    /// `ALTER TABLE .. DROP COLUMN ..`
    #[must_use]
    pub fn drop_sql(&self) -> &str {
        &self.drop_sql
    }

    /// `ALTER TABLE .. MODIFY COLUMN ..` restating the full definition.
    #[must_use]
    pub fn alter_sql(&self) -> &str {
        &self.alter_sql
    }
}

/// An index of a built [`Schema`], with its DDL fragments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    name: String,
    index_type: String,
    columns: Vec<String>,
    unique: bool,
    create_sql: String,
    drop_sql: String,
}

impl Index {
    fn build(table: &str, def: &IndexDef, renderer: &impl DdlRenderer) -> Result<Self, SchemaError> {
        if def.columns.is_empty() {
            return Err(SchemaError::EmptyIndex {
                table: table.to_string(),
                index: def.name.clone(),
            });
        }
        for (expected, &found) in (1..).zip(def.columns.keys()) {
            if expected != found {
                return Err(SchemaError::NonContiguousIndex {
                    table: table.to_string(),
                    index: def.name.clone(),
                    expected,
                    found,
                });
            }
        }

        Ok(Self {
            name: def.name.clone(),
            index_type: def.index_type.clone(),
            columns: def.columns.values().cloned().collect(),
            unique: def.unique,
            create_sql: renderer.create_index(table, def),
            drop_sql: renderer.drop_index(table, def),
        })
    }

    /// Index name, `PRIMARY` for the primary key.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Index algorithm.
    #[must_use]
    pub fn index_type(&self) -> &str {
        &self.index_type
    }

    /// Indexed columns, position 1 first.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Whether the index enforces uniqueness.
    #[must_use]
    pub const fn unique(&self) -> bool {
        self.unique
    }

    /// `ALTER TABLE .. ADD .. INDEX ..` or `ADD PRIMARY KEY`.
    #[must_use]
    pub fn create_sql(&self) -> &str {
        &self.create_sql
    }

    /// `ALTER TABLE .. DROP INDEX ..` or `DROP PRIMARY KEY`.
    #[must_use]
    pub fn drop_sql(&self) -> &str {
        &self.drop_sql
    }

    /// Returns whether two same-named indexes differ in algorithm, ordered
    /// columns or uniqueness.
    #[must_use]
    pub fn differs_from(&self, other: &Self) -> bool {
        self.index_type != other.index_type
            || self.columns != other.columns
            || self.unique != other.unique
    }
}

/// A table of a built [`Schema`], with its DDL fragments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    name: String,
    engine: String,
    collation: String,
    fields: Vec<Field>,
    indexes: Vec<Index>,
    create_sql: String,
    drop_sql: String,
}

impl Table {
    fn build(def: TableDef, renderer: &impl DdlRenderer) -> Result<Self, SchemaError> {
        let mut seen = HashSet::new();
        if let Some(dup) = def.fields.iter().find(|f| !seen.insert(f.name.as_str())) {
            return Err(SchemaError::DuplicateField {
                table: def.name.clone(),
                field: dup.name.clone(),
            });
        }
        let mut seen = HashSet::new();
        if let Some(dup) = def.indexes.iter().find(|i| !seen.insert(i.name.as_str())) {
            return Err(SchemaError::DuplicateIndex {
                table: def.name.clone(),
                index: dup.name.clone(),
            });
        }

        let indexes = def
            .indexes
            .iter()
            .map(|i| Index::build(&def.name, i, renderer))
            .collect::<Result<Vec<_>, _>>()?;
        let create_sql = def
            .create_statement
            .clone()
            .unwrap_or_else(|| renderer.create_table(&def));
        let drop_sql = renderer.drop_table(&def.name);
        let fields = def
            .fields
            .into_iter()
            .map(|f| Field::build(&def.name, f, renderer))
            .collect();

        Ok(Self {
            name: def.name,
            engine: def.engine,
            collation: def.collation,
            fields,
            indexes,
            create_sql,
            drop_sql,
        })
    }

    /// Table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Storage engine.
    #[must_use]
    pub fn engine(&self) -> &str {
        &self.engine
    }

    /// Default table collation.
    #[must_use]
    pub fn collation(&self) -> &str {
        &self.collation
    }

    /// Columns in table order.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Indexes in extraction order.
    #[must_use]
    pub fn indexes(&self) -> &[Index] {
        &self.indexes
    }

    /// Gets a column by exact name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Gets an index by exact name.
    #[must_use]
    pub fn index(&self, name: &str) -> Option<&Index> {
        self.indexes.iter().find(|i| i.name() == name)
    }

    /// `CREATE TABLE` text, verbatim from the server when available.
    #[must_use]
    pub fn create_sql(&self) -> &str {
        &self.create_sql
    }

    /// `DROP TABLE ..`
    #[must_use]
    pub fn drop_sql(&self) -> &str {
        &self.drop_sql
    }
}

/// An immutable snapshot of a database's tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    tables: Vec<Table>,
}

impl Schema {
    /// Validates `tables` and renders all DDL with `renderer`.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] when a table, field or index name is
    /// repeated, or an index's column positions are not `1..=N`.
    pub fn build<I>(tables: I, renderer: &impl DdlRenderer) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = TableDef>,
    {
        let mut seen = HashSet::new();
        let mut built = Vec::new();
        for def in tables {
            if !seen.insert(def.name.clone()) {
                return Err(SchemaError::DuplicateTable(def.name));
            }
            built.push(Table::build(def, renderer)?);
        }
        Ok(Self { tables: built })
    }

    /// Tables in extraction order.
    #[must_use]
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Gets a table by exact name.
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name() == name)
    }

    /// Number of tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
