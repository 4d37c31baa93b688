//! Ground-truth evidence extraction tool.
//!
//! Opens one SQLite database extracted from a device or application image,
//! runs the dbwitness engine over it, and writes the provenance-tagged
//! record set to JSON or CSV. The output is deterministic for an unchanged
//! database, so it can be used as the scoring baseline for agent trials.

use clap::Parser;
use dbwitness_core::{Extractor, Result, init_logging};
use dbwitness_extract::{Cli, output, parse_request};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet)?;

    let request = parse_request(&cli.entities, cli.limit)?;

    info!("Target: {}", cli.database);
    info!("Output: {}", cli.out.display());

    let extractor = Extractor::open(&cli.database).await.map_err(|e| {
        error!("Failed to open database: {}", e);
        e
    })?;

    let report = extractor.extract(&request).await.map_err(|e| {
        error!("Extraction failed: {}", e);
        e
    })?;

    output::write_records(&report.records, &cli.out).await?;
    extractor.close().await;

    info!("Wrote {} records to {}", report.records.len(), cli.out.display());

    if !cli.quiet {
        println!("Wrote {} records to {}", report.records.len(), cli.out.display());
        println!("Identifier: {}", report.summary.identifiers);
        println!("Temporal:   {}", report.summary.temporals);
        println!("Relational: {}", report.summary.relationals);

        if !report.summary.skipped_tables.is_empty() {
            println!("Skipped tables:");
            for skipped in &report.summary.skipped_tables {
                println!("  {} ({})", skipped.table, skipped.reason);
            }
        }
    }

    Ok(())
}
