//! Schema introspection for evidence databases.
//!
//! Enumerates user tables from `sqlite_master` and collects per-table
//! column metadata via `PRAGMA table_info`, folding declared types into
//! normalized type classes and classifying column names into capability
//! hints. All reads are SELECT/PRAGMA only.

use super::identity;
use crate::Result;
use crate::engine::detectors::DetectorConfig;
use crate::models::{Column, SkippedTable, Table, TypeClass};
use sqlx::{Row, SqlitePool};

/// Enumerates user tables with column metadata and resolved row identity.
///
/// Internal `sqlite_%` tables are excluded; the listing is ordered by name
/// so that scan order (and therefore output order) is deterministic. A
/// table whose metadata cannot be read is recorded in `skipped` and left
/// out of the result; only the top-level enumeration failing is fatal.
pub(crate) async fn introspect_tables(
    pool: &SqlitePool,
    config: &DetectorConfig,
    skipped: &mut Vec<SkippedTable>,
) -> Result<Vec<Table>> {
    let tables_query = r#"
        SELECT name
        FROM sqlite_master
        WHERE type = 'table'
        AND name NOT LIKE 'sqlite_%'
        ORDER BY name
    "#;

    let table_rows = sqlx::query(tables_query)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            crate::error::DbWitnessError::introspection_failed("Failed to enumerate tables", e)
        })?;

    let mut tables = Vec::new();

    for row in &table_rows {
        let table_name: String = row.try_get("name").map_err(|e| {
            crate::error::DbWitnessError::introspection_failed("Failed to parse table name", e)
        })?;

        let columns = match collect_table_columns(pool, config, &table_name).await {
            Ok(columns) => columns,
            Err(e) => {
                tracing::warn!("Skipping table '{}': {}", table_name, e);
                skipped.push(SkippedTable {
                    table: table_name,
                    reason: format!("unreadable metadata: {}", e),
                });
                continue;
            }
        };

        let primary_key = identity::resolve_primary_key(&columns);

        tracing::debug!(
            "Introspected table '{}' with {} columns, identity {:?}",
            table_name,
            columns.len(),
            primary_key
        );

        tables.push(Table {
            name: table_name,
            columns,
            primary_key,
        });
    }

    Ok(tables)
}

/// Collects column metadata for a single table.
async fn collect_table_columns(
    pool: &SqlitePool,
    config: &DetectorConfig,
    table_name: &str,
) -> Result<Vec<Column>> {
    let columns_query = format!("PRAGMA table_info('{}')", table_name.replace('\'', "''"));

    let column_rows = sqlx::query(&columns_query)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            crate::error::DbWitnessError::introspection_failed(
                format!("Failed to collect columns for table '{}'", table_name),
                e,
            )
        })?;

    let mut columns = Vec::new();

    for row in &column_rows {
        let name: String = row.try_get("name").unwrap_or_default();
        let declared_type: String = row.try_get("type").unwrap_or_default();
        let pk: i32 = row.try_get("pk").unwrap_or(0);

        let type_class = TypeClass::from_declared(&declared_type);
        let hints = config.classify(&name);

        columns.push(Column {
            name,
            declared_type,
            type_class,
            pk_ordinal: pk.max(0) as u32,
            hints,
        });
    }

    Ok(columns)
}
