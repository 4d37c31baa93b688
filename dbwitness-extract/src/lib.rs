//! Library module for dbwitness-extract
//!
//! This module exposes the CLI surface and output writers for testing
//! purposes. The main binary functionality is in main.rs.

pub mod output;

use clap::Parser;
use dbwitness_core::{EntityClass, ExtractionRequest, Result};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// CLI argument structure
#[derive(Parser)]
#[command(name = "dbwitness-extract")]
#[command(about = "Forensic ground-truth extraction from SQLite databases")]
#[command(version)]
#[command(long_about = "
dbwitness-extract - Forensic ground-truth extraction

Scans every user table of a SQLite database for three evidence classes:
- Identifier: emails, phone numbers, UUIDs, IPv4 addresses, URLs
- Temporal:   Unix-epoch instants (seconds or milliseconds) and ISO-8601 text
- Relational: id-like column pairs implying record-to-record links

Every record carries exact provenance (table, column, row identity). The
database is opened read-only and is never mutated.

EXAMPLES:
  dbwitness-extract msgstore.db
  dbwitness-extract --entities identifier,temporal --out gt.csv sms.db
  dbwitness-extract --limit 100 --out preview.json huge.db
")]
pub struct Cli {
    /// Path to the evidence database (.db/.sqlite file or sqlite:// URL)
    #[arg(help = "SQLite database to scan")]
    pub database: String,

    /// Entity classes to extract
    #[arg(
        long,
        default_value = "all",
        help = "Comma list: identifier,temporal,relational or 'all'"
    )]
    pub entities: String,

    /// Output file path
    #[arg(
        short,
        long,
        default_value = "ground_truth.json",
        help = "Output file path (.json or .csv)"
    )]
    pub out: PathBuf,

    /// Per-column scan limit
    #[arg(long, help = "Optional per-column row limit for quick previews")]
    pub limit: Option<u32>,

    /// Increase verbosity
    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, help = "Suppress all output except errors")]
    pub quiet: bool,
}

/// Builds an extraction request from the `--entities` argument.
///
/// # Errors
/// Returns a configuration error when the argument names an unknown
/// entity class.
pub fn parse_request(entities: &str, limit: Option<u32>) -> Result<ExtractionRequest> {
    let mut request = if entities.trim().eq_ignore_ascii_case("all") {
        ExtractionRequest::all()
    } else {
        let classes = entities
            .split(',')
            .map(str::parse::<EntityClass>)
            .collect::<Result<BTreeSet<_>>>()?;
        ExtractionRequest::for_classes(classes)
    };
    request.limit = limit;
    Ok(request)
}
