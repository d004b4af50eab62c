//! Schema extraction from live databases and snapshot files.

pub mod mysql;
pub mod snapshot;

use oxide_diff_core::prelude::{MySqlRenderer, Schema, SchemaDef};
use tracing::{debug, info};

pub use mysql::MySqlExtractor;

use crate::error::Result;
use crate::source::Source;

/// Reads the raw definitions of every table in `source`.
///
/// # Errors
///
/// Fails on connection, query, file or parse errors, and when the source
/// contains objects other than base tables.
pub async fn extract(source: &Source) -> Result<SchemaDef> {
    info!(%source, "Extracting schema");
    let def = match source {
        Source::MySql { url, database } => {
            let extractor = MySqlExtractor::connect(url).await?;
            SchemaDef {
                tables: extractor.extract(database).await?,
            }
        }
        Source::Snapshot(path) => snapshot::read(path)?,
    };
    debug!(%source, tables = def.tables.len(), "Extraction complete");
    Ok(def)
}

/// Extracts `source` and builds an immutable [`Schema`] with MySQL DDL.
///
/// # Errors
///
/// Fails if extraction fails or the definitions are inconsistent.
pub async fn load_schema(source: &Source) -> Result<Schema> {
    let schema = extract(source).await?.build(&MySqlRenderer)?;
    debug!(%source, tables = schema.len(), "Schema built");
    Ok(schema)
}
