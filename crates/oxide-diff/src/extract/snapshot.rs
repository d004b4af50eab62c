//! JSON schema snapshots.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use oxide_diff_core::schema::SchemaDef;

use crate::error::Result;

/// Reads a snapshot from `path`.
///
/// # Errors
///
/// Fails if the file cannot be opened or is not a valid snapshot.
pub fn read(path: &Path) -> Result<SchemaDef> {
    let file = File::open(path)?;
    from_reader(BufReader::new(file))
}

/// Parses a snapshot from any reader.
///
/// # Errors
///
/// Fails if the content is not a valid snapshot.
pub fn from_reader(reader: impl Read) -> Result<SchemaDef> {
    Ok(serde_json::from_reader(reader)?)
}

/// Writes `schema` as pretty-printed JSON followed by a newline.
///
/// # Errors
///
/// Fails on serialization or I/O errors.
pub fn to_writer(schema: &SchemaDef, mut writer: impl Write) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, schema)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Writes `schema` to `path`, replacing any existing file.
///
/// # Errors
///
/// Fails on serialization or I/O errors.
pub fn write(schema: &SchemaDef, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    to_writer(schema, BufWriter::new(file))
}
