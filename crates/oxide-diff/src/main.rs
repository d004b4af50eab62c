//! oxide-diff CLI
//!
//! Compares the structure of two MySQL databases and prints the DDL that
//! turns the current one into the wanted one. The exit code tells how risky
//! applying that DDL is.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use oxide_diff::extract::{self, snapshot};
use oxide_diff::output::{self, Format};
use oxide_diff::source::Source;
use oxide_diff_core::prelude::*;

/// Schema diff for MySQL databases.
#[derive(Parser)]
#[command(name = "oxide-diff")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the statements that turn `current` into `wanted`.
    ///
    /// Exit codes: 0 no change, 1 safe, 2 performance risk, 4 data
    /// alteration, 5 data loss, 10 error.
    Diff {
        /// Database currently deployed (mysql:// URL or snapshot file).
        #[arg(short, long, env = "OXIDE_DIFF_CURRENT")]
        current: Source,

        /// Database to converge to (mysql:// URL or snapshot file).
        #[arg(short, long, env = "OXIDE_DIFF_WANTED")]
        wanted: Source,

        /// Write the result to a file instead of stdout.
        #[arg(short, long)]
        out_file: Option<PathBuf>,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = Format::Sql)]
        format: Format,

        /// Do not compare indexes.
        #[arg(long)]
        no_index_diff: bool,

        /// Treat every field change as a data alteration.
        #[arg(long)]
        coarse_fields: bool,
    },

    /// Save the structure of a database as a JSON snapshot.
    Snapshot {
        /// Database to read (mysql:// URL or snapshot file).
        #[arg(short, long)]
        source: Source,

        /// Write the snapshot to a file instead of stdout.
        #[arg(short, long)]
        out_file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Error when setting up logging: {err}");
        return ExitCode::from(FATAL_EXIT_CODE);
    }

    match run(cli.command).await {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            error!("{err:#}");
            ExitCode::from(FATAL_EXIT_CODE)
        }
    }
}

async fn run(command: Commands) -> anyhow::Result<u8> {
    match command {
        Commands::Diff {
            current,
            wanted,
            out_file,
            format,
            no_index_diff,
            coarse_fields,
        } => {
            let profile = DiffProfile::strict()
                .with_index_diff(!no_index_diff)
                .with_field_split(!coarse_fields);
            diff(&current, &wanted, profile, format, out_file.as_deref()).await
        }

        Commands::Snapshot { source, out_file } => {
            let def = extract::extract(&source)
                .await
                .context("Error when fetching database schema")?;
            let written = match &out_file {
                Some(path) => snapshot::write(&def, path),
                None => snapshot::to_writer(&def, std::io::stdout().lock()),
            };
            written.context("Error when writing snapshot")?;
            info!(tables = def.tables.len(), "Snapshot written");
            Ok(0)
        }
    }
}

async fn diff(
    current: &Source,
    wanted: &Source,
    profile: DiffProfile,
    format: Format,
    out_file: Option<&Path>,
) -> anyhow::Result<u8> {
    let (current, wanted) = tokio::try_join!(
        extract::load_schema(current),
        extract::load_schema(wanted)
    )
    .context("Error when fetching database schema")?;
    if wanted.is_empty() && !current.is_empty() {
        warn!(
            tables = current.len(),
            "Wanted schema has no tables, every current table will be dropped"
        );
    }

    let result = Differ::with_profile(profile)
        .diff(&current, &wanted)
        .context("Error when comparing databases")?;

    for line in result.diagnostic_lines() {
        eprintln!("{line}");
    }
    output::write(&result, format, out_file)
        .context("Error when writing result")?;

    let severity = result.severity();
    info!(
        %severity,
        statements = result.statements().len(),
        "Comparison complete"
    );
    Ok(severity.exit_code())
}
