//! Relational detector: heuristic discovery of id-like column pairs.
//!
//! Link candidates are found by naming convention alone; the detector
//! never inspects declared foreign-key constraints. Within a table, every
//! ordered pair of link-named columns is scored by how strongly the two
//! names match the source-side and destination-side vocabularies; pairs
//! with no vocabulary support on either side are dropped, and the rest is
//! capped to bound combinatorial growth on wide tables.

use super::DetectorConfig;
use crate::engine::stream;
use crate::models::{EntityClass, EvidenceRecord, Table};
use sqlx::{Row, SqlitePool};

/// Scans a table for relational evidence.
///
/// For each retained pair, every row with both sides non-null emits one
/// record with subtype `"<a>-><b>"` and value `"<va>-><vb>"`. A failing
/// pair query is logged and skipped; the table's other pairs still run.
pub(crate) async fn scan_table(
    pool: &SqlitePool,
    config: &DetectorConfig,
    table: &Table,
    identity_expr: &str,
    limit: Option<u32>,
) -> Vec<EvidenceRecord> {
    let mut records = Vec::new();

    for (source, dest) in candidate_pairs(config, table) {
        let rows = match fetch_pair(pool, &table.name, &source, &dest, identity_expr, limit).await
        {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(
                    "Relational pass skipping pair '{}.{}->{}': {}",
                    table.name,
                    source,
                    dest,
                    e
                );
                continue;
            }
        };

        for (rid, value_a, value_b) in rows {
            records.push(EvidenceRecord {
                entity_type: EntityClass::Relational,
                subtype: format!("{}->{}", source, dest),
                value: format!("{}->{}", value_a, value_b),
                raw: None,
                table: table.name.clone(),
                rowid: rid,
                column: format!("{},{}", source, dest),
            });
        }
    }

    records
}

/// Selects and ranks the ordered column pairs worth scanning.
///
/// Pair score = source-side rank of the first column + destination-side
/// rank of the second (rank = vocabulary length minus index of the first
/// contained keyword, zero when none matches). Zero-score pairs are not
/// plausible links and are discarded before the cap is applied.
pub(crate) fn candidate_pairs(config: &DetectorConfig, table: &Table) -> Vec<(String, String)> {
    let link_columns: Vec<&str> = table
        .columns
        .iter()
        .filter(|c| c.hints.relation)
        .map(|c| c.name.as_str())
        .collect();

    if link_columns.len() < 2 {
        return Vec::new();
    }

    let mut scored: Vec<(&str, &str, usize)> = Vec::new();
    for a in &link_columns {
        for b in &link_columns {
            if a == b {
                continue;
            }
            let score =
                keyword_rank(a, config.source_priority) + keyword_rank(b, config.dest_priority);
            if score > 0 {
                scored.push((a, b, score));
            }
        }
    }

    // Stable sort keeps column order as the tie-break, so output is
    // deterministic for equal scores
    scored.sort_by(|x, y| y.2.cmp(&x.2));
    scored.truncate(config.max_relational_pairs);

    scored
        .into_iter()
        .map(|(a, b, _)| (a.to_string(), b.to_string()))
        .collect()
}

/// Rank of the first vocabulary keyword contained in a column name:
/// vocabulary length minus keyword index, or zero when none matches.
pub(crate) fn keyword_rank(name: &str, keywords: &[&str]) -> usize {
    let n = name.to_lowercase();
    for (index, keyword) in keywords.iter().enumerate() {
        if n.contains(keyword) {
            return keywords.len() - index;
        }
    }
    0
}

/// Fetches `(identity, source value, dest value)` for rows where both link
/// columns are non-null.
async fn fetch_pair(
    pool: &SqlitePool,
    table: &str,
    source: &str,
    dest: &str,
    identity_expr: &str,
    limit: Option<u32>,
) -> crate::Result<Vec<(String, String, String)>> {
    let limit_clause = limit.map(|n| format!(" LIMIT {}", n)).unwrap_or_default();
    let query = format!(
        "SELECT {} AS __rid, {} AS __a, {} AS __b FROM {} WHERE {} IS NOT NULL AND {} IS NOT NULL{}",
        identity_expr,
        crate::engine::quote_ident(source),
        crate::engine::quote_ident(dest),
        crate::engine::quote_ident(table),
        crate::engine::quote_ident(source),
        crate::engine::quote_ident(dest),
        limit_clause
    );

    let rows = sqlx::query(&query).fetch_all(pool).await.map_err(|e| {
        crate::error::DbWitnessError::introspection_failed(
            format!(
                "Failed to scan pair '{}','{}' of table '{}'",
                source, dest, table
            ),
            e,
        )
    })?;

    let mut out = Vec::with_capacity(rows.len());
    for row in &rows {
        let rid: Option<String> = row.try_get("__rid").unwrap_or(None);
        let Some(rid) = rid else {
            continue;
        };
        let (Some(a), Some(b)) = (
            stream::decode_cell(row, "__a").and_then(|c| c.display_string()),
            stream::decode_cell(row, "__b").and_then(|c| c.display_string()),
        ) else {
            continue;
        };
        out.push((rid, a, b));
    }

    Ok(out)
}
