//! MySQL introspection.
//!
//! Reads `information_schema` for one database and turns the rows into
//! [`TableDef`]s. Every string column is cast to `CHAR` so that servers
//! returning binary metadata still decode as text.

use std::collections::BTreeMap;

use oxide_diff_core::dialect::is_temporal_default;
use oxide_diff_core::schema::{FieldDef, IndexDef, TableDef};
use sqlx::mysql::{MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::Row;
use tracing::debug;

use crate::error::{ExtractError, Result};

const TABLES_SQL: &str = "\
SELECT CAST(TABLE_NAME AS CHAR) AS name,
       CAST(TABLE_TYPE AS CHAR) AS kind,
       CAST(ENGINE AS CHAR) AS engine,
       CAST(TABLE_COLLATION AS CHAR) AS collation
FROM information_schema.TABLES
WHERE TABLE_SCHEMA = ?
ORDER BY TABLE_NAME";

const COLUMNS_SQL: &str = "\
SELECT CAST(COLUMN_NAME AS CHAR) AS name,
       CAST(COLUMN_TYPE AS CHAR) AS column_type,
       CAST(COLLATION_NAME AS CHAR) AS collation,
       CAST(IS_NULLABLE AS CHAR) AS nullable,
       CAST(COLUMN_DEFAULT AS CHAR) AS default_value,
       CAST(COLUMN_COMMENT AS CHAR) AS comment,
       CAST(EXTRA AS CHAR) AS extra
FROM information_schema.COLUMNS
WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
ORDER BY ORDINAL_POSITION";

const INDEXES_SQL: &str = "\
SELECT CAST(INDEX_NAME AS CHAR) AS name,
       CAST(INDEX_TYPE AS CHAR) AS index_type,
       CAST(SEQ_IN_INDEX AS SIGNED) AS seq,
       CAST(COLUMN_NAME AS CHAR) AS column_name,
       CAST(NON_UNIQUE AS SIGNED) AS non_unique
FROM information_schema.STATISTICS
WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
ORDER BY INDEX_NAME = 'PRIMARY' DESC, INDEX_NAME, SEQ_IN_INDEX";

/// One row of `information_schema.TABLES`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub name: String,
    pub kind: String,
    pub engine: Option<String>,
    pub collation: Option<String>,
}

/// One row of `information_schema.COLUMNS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRow {
    pub name: String,
    pub column_type: String,
    pub collation: Option<String>,
    /// `YES` or `NO`.
    pub nullable: String,
    pub default_value: Option<String>,
    pub comment: String,
    pub extra: String,
}

/// One row of `information_schema.STATISTICS`: a single column of an index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRow {
    pub name: String,
    pub index_type: String,
    pub seq: i64,
    /// `None` for functional key parts.
    pub column_name: Option<String>,
    pub non_unique: i64,
}

impl TableRow {
    fn from_row(row: &MySqlRow) -> Result<Self> {
        Ok(Self {
            name: row.try_get("name")?,
            kind: row.try_get("kind")?,
            engine: row.try_get("engine")?,
            collation: row.try_get("collation")?,
        })
    }
}

impl ColumnRow {
    fn from_row(row: &MySqlRow) -> Result<Self> {
        Ok(Self {
            name: row.try_get("name")?,
            column_type: row.try_get("column_type")?,
            collation: row.try_get("collation")?,
            nullable: row.try_get("nullable")?,
            default_value: row.try_get("default_value")?,
            comment: row.try_get::<Option<String>, _>("comment")?.unwrap_or_default(),
            extra: row.try_get::<Option<String>, _>("extra")?.unwrap_or_default(),
        })
    }

    /// Converts the row into a field definition.
    ///
    /// Expression defaults (`DEFAULT_GENERATED` in `EXTRA`) are reported
    /// without their parentheses; they are restored here unless the value is
    /// a temporal function, which MySQL accepts bare.
    #[must_use]
    pub fn into_field_def(self) -> FieldDef {
        let extra = self.extra.to_ascii_lowercase();
        let generated = extra.contains("default_generated");
        let default = self.default_value.map(|value| {
            if generated && !is_temporal_default(&value) && !value.starts_with('(') {
                format!("({value})")
            } else {
                value
            }
        });

        FieldDef {
            auto_increment: extra.contains("auto_increment"),
            nullable: self.nullable == "YES",
            name: self.name,
            sql_type: self.column_type,
            collation: self.collation,
            default,
            comment: self.comment,
        }
    }
}

impl IndexRow {
    fn from_row(row: &MySqlRow) -> Result<Self> {
        Ok(Self {
            name: row.try_get("name")?,
            index_type: row.try_get("index_type")?,
            seq: row.try_get("seq")?,
            column_name: row.try_get("column_name")?,
            non_unique: row.try_get("non_unique")?,
        })
    }
}

/// Groups per-column index rows into index definitions, keeping the order
/// in which each index first appears.
///
/// # Errors
///
/// Fails on functional key parts and out-of-range positions.
pub fn group_indexes(table: &str, rows: Vec<IndexRow>) -> Result<Vec<IndexDef>> {
    let mut indexes: Vec<IndexDef> = Vec::new();

    for row in rows {
        let position = u32::try_from(row.seq).map_err(|_| ExtractError::InvalidValue {
            table: table.to_string(),
            attribute: "index position",
            detail: format!("{} in index '{}'", row.seq, row.name),
        })?;
        let column = row.column_name.ok_or_else(|| ExtractError::InvalidValue {
            table: table.to_string(),
            attribute: "index part",
            detail: format!(
                "expression at position {position} in index '{}', only columns are supported",
                row.name
            ),
        })?;

        match indexes.iter_mut().find(|i| i.name == row.name) {
            Some(index) => {
                index.columns.insert(position, column);
            }
            None => indexes.push(IndexDef {
                name: row.name,
                index_type: row.index_type,
                columns: BTreeMap::from([(position, column)]),
                unique: row.non_unique == 0,
            }),
        }
    }

    Ok(indexes)
}

/// Assembles a table definition from its introspection rows.
///
/// # Errors
///
/// Fails if the object is not a base table or lacks an engine or collation.
pub fn table_def(
    table: TableRow,
    columns: Vec<ColumnRow>,
    indexes: Vec<IndexRow>,
    create_statement: Option<String>,
) -> Result<TableDef> {
    if table.kind != "BASE TABLE" {
        return Err(ExtractError::UnsupportedObject {
            table: table.name,
            kind: table.kind,
        });
    }
    let missing = |attribute| ExtractError::InvalidValue {
        table: table.name.clone(),
        attribute,
        detail: "NULL".to_string(),
    };
    let engine = table.engine.clone().ok_or_else(|| missing("engine"))?;
    let collation = table.collation.clone().ok_or_else(|| missing("collation"))?;

    Ok(TableDef {
        indexes: group_indexes(&table.name, indexes)?,
        fields: columns.into_iter().map(ColumnRow::into_field_def).collect(),
        name: table.name,
        engine,
        collation,
        create_statement,
    })
}

/// Introspects databases on one MySQL server.
pub struct MySqlExtractor {
    pool: MySqlPool,
}

impl MySqlExtractor {
    /// Connects to the server at `url`.
    ///
    /// # Errors
    ///
    /// Returns the connection error.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(2)
            .connect(url)
            .await?;
        Ok(Self { pool })
    }

    /// Reads every table of `database`.
    ///
    /// # Errors
    ///
    /// Fails on query errors and on any object that is not a base table.
    pub async fn extract(&self, database: &str) -> Result<Vec<TableDef>> {
        let table_rows = sqlx::query(TABLES_SQL)
            .bind(database)
            .fetch_all(&self.pool)
            .await?;

        let mut tables = Vec::with_capacity(table_rows.len());
        for row in &table_rows {
            let table = TableRow::from_row(row)?;
            debug!(table = %table.name, kind = %table.kind, "introspecting");

            let columns = sqlx::query(COLUMNS_SQL)
                .bind(database)
                .bind(&table.name)
                .fetch_all(&self.pool)
                .await?
                .iter()
                .map(ColumnRow::from_row)
                .collect::<Result<Vec<_>>>()?;

            let indexes = sqlx::query(INDEXES_SQL)
                .bind(database)
                .bind(&table.name)
                .fetch_all(&self.pool)
                .await?
                .iter()
                .map(IndexRow::from_row)
                .collect::<Result<Vec<_>>>()?;

            let create_statement = if table.kind == "BASE TABLE" {
                Some(self.show_create_table(database, &table.name).await?)
            } else {
                None
            };

            tables.push(table_def(table, columns, indexes, create_statement)?);
        }

        Ok(tables)
    }

    async fn show_create_table(&self, database: &str, table: &str) -> Result<String> {
        let sql = format!(
            "SHOW CREATE TABLE `{}`.`{}`",
            database.replace('`', "``"),
            table.replace('`', "``")
        );
        let row = sqlx::query(&sql).fetch_one(&self.pool).await?;
        Ok(row.try_get(1)?)
    }
}
