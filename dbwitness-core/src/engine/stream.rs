//! Row streaming for detector passes.
//!
//! Streams `(row identity, cell value)` pairs for one column at a time.
//! Only non-null cells are yielded, and the identity expression is always
//! selected as text. SQLite is dynamically typed, so cell decoding tries a
//! chain of types; values SQLite can render as text arrive as text, which
//! is what the pattern detectors scan.

use crate::Result;
use sqlx::{Row, SqlitePool};

/// A decoded cell value.
///
/// The text variant dominates in practice (SQLite coerces numerics to text
/// on read); the numeric variants are kept so epoch candidates survive
/// drivers that decode strictly. BLOBs are carried but never scanned.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CellValue {
    Text(String),
    Integer(i64),
    Real(f64),
    Bool(bool),
    Blob,
}

impl CellValue {
    /// The cell rendered as the string the detectors scan. `None` for
    /// BLOBs, which are excluded from pattern matching.
    pub(crate) fn display_string(&self) -> Option<String> {
        match self {
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Integer(i) => Some(i.to_string()),
            CellValue::Real(f) => Some(f.to_string()),
            CellValue::Bool(b) => Some(b.to_string()),
            CellValue::Blob => None,
        }
    }

    /// The cell as an integer epoch candidate, if it has one.
    ///
    /// Text is parsed as an integer first and as a float second, truncating
    /// toward zero, so both `"1700000000"` and REAL-typed `1700000000.0`
    /// (rendered `"1700000000.0"`) qualify.
    pub(crate) fn epoch_candidate(&self) -> Option<i64> {
        match self {
            CellValue::Integer(i) => Some(*i),
            CellValue::Real(f) if f.is_finite() => Some(*f as i64),
            CellValue::Text(s) => {
                let trimmed = s.trim();
                if let Ok(i) = trimmed.parse::<i64>() {
                    Some(i)
                } else if let Ok(f) = trimmed.parse::<f64>()
                    && f.is_finite()
                {
                    Some(f as i64)
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

/// Streams `(identity, value)` pairs for one column of one table.
///
/// The query shape is
/// `SELECT <identity> AS __rid, "col" AS __val FROM "t" WHERE "col" IS NOT NULL [LIMIT n]`.
/// Rows whose identity resolves to NULL (a nullable declared key) are
/// dropped; provenance is never approximated. Errors here are table-level
/// (e.g. a virtual table incompatible with the selection); the caller
/// downgrades them to a logged skip.
pub(crate) async fn stream_column(
    pool: &SqlitePool,
    table: &str,
    column: &str,
    identity_expr: &str,
    limit: Option<u32>,
) -> Result<Vec<(String, CellValue)>> {
    let limit_clause = limit.map(|n| format!(" LIMIT {}", n)).unwrap_or_default();
    let query = format!(
        "SELECT {} AS __rid, {} AS __val FROM {} WHERE {} IS NOT NULL{}",
        identity_expr,
        super::quote_ident(column),
        super::quote_ident(table),
        super::quote_ident(column),
        limit_clause
    );

    let rows = sqlx::query(&query).fetch_all(pool).await.map_err(|e| {
        crate::error::DbWitnessError::introspection_failed(
            format!("Failed to stream column '{}' of table '{}'", column, table),
            e,
        )
    })?;

    let mut out = Vec::with_capacity(rows.len());
    for row in &rows {
        let rid: Option<String> = row.try_get("__rid").unwrap_or(None);
        let Some(rid) = rid else {
            tracing::trace!(
                "Dropping row of '{}' with null identity (nullable declared key)",
                table
            );
            continue;
        };
        if let Some(value) = decode_cell(row, "__val") {
            out.push((rid, value));
        }
    }

    Ok(out)
}

/// Decodes a result cell by trying types in order of likelihood.
pub(crate) fn decode_cell(row: &sqlx::sqlite::SqliteRow, name: &str) -> Option<CellValue> {
    if let Ok(Some(v)) = row.try_get::<Option<String>, _>(name) {
        return Some(CellValue::Text(v));
    }
    if let Ok(Some(v)) = row.try_get::<Option<i64>, _>(name) {
        return Some(CellValue::Integer(v));
    }
    if let Ok(Some(v)) = row.try_get::<Option<f64>, _>(name) {
        return Some(CellValue::Real(v));
    }
    if let Ok(Some(v)) = row.try_get::<Option<bool>, _>(name) {
        return Some(CellValue::Bool(v));
    }
    if let Ok(Some(_)) = row.try_get::<Option<Vec<u8>>, _>(name) {
        return Some(CellValue::Blob);
    }
    None
}
