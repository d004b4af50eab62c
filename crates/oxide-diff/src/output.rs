//! Writing diff results.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use clap::ValueEnum;
use oxide_diff_core::prelude::{DiffReport, DiffResult};

/// Output format of the `diff` command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Semicolon-terminated statements separated by blank lines.
    #[default]
    Sql,
    /// A JSON report with severity, exit code, statements and diagnostics.
    Json,
}

/// Writes `result` in `format` to `writer`.
///
/// # Errors
///
/// Returns any I/O or serialization error.
pub fn render(result: &DiffResult, format: Format, mut writer: impl Write) -> io::Result<()> {
    match format {
        Format::Sql => writer.write_all(result.sql().as_bytes())?,
        Format::Json => {
            serde_json::to_writer_pretty(&mut writer, &DiffReport::from(result))?;
            writer.write_all(b"\n")?;
        }
    }
    writer.flush()
}

/// Writes `result` to `out_file`, or to stdout when no file is given.
///
/// The file is only created once the result is complete, so a failed
/// comparison never leaves a partial file behind.
///
/// # Errors
///
/// Returns any I/O or serialization error.
pub fn write(result: &DiffResult, format: Format, out_file: Option<&Path>) -> io::Result<()> {
    match out_file {
        Some(path) => render(result, format, BufWriter::new(File::create(path)?)),
        None => render(result, format, io::stdout().lock()),
    }
}
