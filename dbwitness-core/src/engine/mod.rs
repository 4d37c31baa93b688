//! The generalized evidence-extraction engine.
//!
//! # Module Structure
//! - `connection`: read-only SQLite access (no pooling needed)
//! - `schema`: table/column introspection via sqlite_master and PRAGMAs
//! - `identity`: per-row identity resolution (declared key or rowid)
//! - `stream`: (identity, value) streaming with optional scan limits
//! - `detectors`: identifier, temporal, and relational detector families
//! - `dedup`: full-key deduplication with first-seen ordering
//!
//! # Execution Model
//! One extractor owns one database handle for the duration of a run. All
//! passes execute sequentially: introspection, then per table an identity
//! probe followed by the requested detector families. Re-running over an
//! unchanged database yields an identical record list.
//!
//! # Failure Containment
//! Only a failed database open aborts a run. Unreadable table metadata,
//! unprobeable row identity, and per-column query failures downgrade to
//! logged skips recorded in the run summary; partial results always win
//! over total failure.

pub mod connection;
pub mod detectors;
pub mod identity;

mod dedup;
mod schema;
mod stream;

#[cfg(test)]
mod tests;

use crate::Result;
use crate::models::{
    EntityClass, ExtractionReport, ExtractionRequest, ExtractionSummary, SkippedTable,
};
use detectors::DetectorConfig;
use sqlx::SqlitePool;

/// Evidence extractor bound to a single database.
pub struct Extractor {
    /// Single read-only connection to the evidence database
    pub(crate) pool: SqlitePool,
    /// Display name of the database (file name or `:memory:`)
    pub(crate) database_name: String,
    /// Immutable detector configuration shared by all passes
    pub(crate) config: DetectorConfig,
}

impl std::fmt::Debug for Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extractor")
            .field("database_name", &self.database_name)
            .finish_non_exhaustive()
    }
}

impl Extractor {
    /// Display name of the database this extractor is bound to.
    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    /// The active detector configuration.
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Mutable access to the detector configuration, for tuning knobs such
    /// as the relational pair cap before a run.
    pub fn config_mut(&mut self) -> &mut DetectorConfig {
        &mut self.config
    }

    /// The underlying connection pool. Exposed for harnesses that verify
    /// records against the source database.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Runs one extraction over the database.
    ///
    /// Tables are processed in name order; per table the identifier,
    /// temporal, and relational passes run in that order, each gated by the
    /// request. The returned records are deduplicated on the full six-field
    /// key with first-seen order preserved.
    ///
    /// # Errors
    /// Returns an error only when the database itself cannot be
    /// introspected; table-level failures are downgraded to summary entries.
    pub async fn extract(&self, request: &ExtractionRequest) -> Result<ExtractionReport> {
        let start = std::time::Instant::now();
        tracing::info!(
            "Starting evidence extraction for database: {}",
            self.database_name
        );

        let mut skipped: Vec<SkippedTable> = Vec::new();
        let tables = schema::introspect_tables(&self.pool, &self.config, &mut skipped).await?;
        tracing::debug!("Introspected {} tables", tables.len());

        let mut collected = Vec::new();

        for table in &tables {
            let identity_expr = identity::identity_expression(&table.primary_key);

            // Identity correctness is mandatory; a table whose identity
            // expression cannot be evaluated is excluded, never guessed at
            if let Err(e) = self.probe_identity(&table.name, &identity_expr).await {
                tracing::warn!("Skipping table '{}': {}", table.name, e);
                skipped.push(SkippedTable {
                    table: table.name.clone(),
                    reason: format!("row identity not resolvable: {}", e),
                });
                continue;
            }

            if request.wants(EntityClass::Identifier) {
                collected.extend(
                    detectors::identifier::scan_table(
                        &self.pool,
                        &self.config,
                        table,
                        &identity_expr,
                        request.limit,
                    )
                    .await,
                );
            }

            if request.wants(EntityClass::Temporal) {
                collected.extend(
                    detectors::temporal::scan_table(
                        &self.pool,
                        &self.config,
                        table,
                        &identity_expr,
                        request.limit,
                    )
                    .await,
                );
            }

            if request.wants(EntityClass::Relational) {
                collected.extend(
                    detectors::relational::scan_table(
                        &self.pool,
                        &self.config,
                        table,
                        &identity_expr,
                        request.limit,
                    )
                    .await,
                );
            }
        }

        let records = dedup::dedupe(collected);

        let mut summary = ExtractionSummary {
            skipped_tables: skipped,
            ..ExtractionSummary::default()
        };
        for record in &records {
            match record.entity_type {
                EntityClass::Identifier => summary.identifiers += 1,
                EntityClass::Temporal => summary.temporals += 1,
                EntityClass::Relational => summary.relationals += 1,
            }
        }

        tracing::info!(
            "Evidence extraction completed in {:.2}s - {} identifier, {} temporal, {} relational records ({} tables skipped)",
            start.elapsed().as_secs_f64(),
            summary.identifiers,
            summary.temporals,
            summary.relationals,
            summary.skipped_tables.len()
        );

        Ok(ExtractionReport { records, summary })
    }

    /// Verifies that the table's identity expression is evaluable before
    /// any detector pass touches the table.
    async fn probe_identity(&self, table: &str, identity_expr: &str) -> Result<()> {
        let query = format!(
            "SELECT {} FROM {} LIMIT 1",
            identity_expr,
            quote_ident(table)
        );
        sqlx::query(&query)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                crate::error::DbWitnessError::query_failed(format!(
                    "identity probe failed for table '{}': {}",
                    table, e
                ))
            })?;
        Ok(())
    }
}

/// Quotes an identifier SQLite-style, doubling embedded double quotes.
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
