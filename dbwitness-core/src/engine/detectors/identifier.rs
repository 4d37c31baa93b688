//! Identifier detectors: email, UUID, phone, IPv4, URL.
//!
//! A column enters this pass when its type class is Text or its name
//! carries an identifier hint. Several detectors may fire on the same cell
//! (a URL embedding an IP reports both); distinct subtypes never collapse
//! during deduplication because the subtype is part of the full key.

use super::DetectorConfig;
use crate::engine::stream;
use crate::models::{Column, EntityClass, EvidenceRecord, Table, TypeClass};
use sqlx::SqlitePool;

/// Scans all identifier-eligible columns of a table.
///
/// Column-level streaming failures are logged and skip only that column;
/// the pass continues with the table's remaining columns.
pub(crate) async fn scan_table(
    pool: &SqlitePool,
    config: &DetectorConfig,
    table: &Table,
    identity_expr: &str,
    limit: Option<u32>,
) -> Vec<EvidenceRecord> {
    let mut records = Vec::new();

    for column in &table.columns {
        if !applies_to(column) {
            continue;
        }

        let rows =
            match stream::stream_column(pool, &table.name, &column.name, identity_expr, limit)
                .await
            {
                Ok(rows) => rows,
                Err(e) => {
                    tracing::warn!(
                        "Identifier pass skipping column '{}.{}': {}",
                        table.name,
                        column.name,
                        e
                    );
                    continue;
                }
            };

        for (rid, cell) in &rows {
            let Some(text) = cell.display_string() else {
                continue;
            };
            for (subtype, value) in scan_text(config, column, &text) {
                records.push(EvidenceRecord {
                    entity_type: EntityClass::Identifier,
                    subtype: subtype.to_string(),
                    value,
                    raw: None,
                    table: table.name.clone(),
                    rowid: rid.clone(),
                    column: column.name.clone(),
                });
            }
        }
    }

    records
}

/// Whether a column is eligible for the identifier pass.
fn applies_to(column: &Column) -> bool {
    column.type_class == TypeClass::Text
        || column.hints.email
        || column.hints.phone
        || column.hints.uuid
}

/// Runs every identifier detector over one cell, returning (subtype,
/// normalized value) pairs in detector order.
pub(crate) fn scan_text(
    config: &DetectorConfig,
    column: &Column,
    text: &str,
) -> Vec<(&'static str, String)> {
    let mut findings = Vec::new();

    for m in config.email_re.find_iter(text) {
        findings.push(("Email", m.as_str().to_string()));
    }

    // UUIDs are case-normalized to lowercase on output
    for m in config.uuid_re.find_iter(text) {
        findings.push(("UUID", m.as_str().to_lowercase()));
    }

    // Broad net: any digit makes a cell a phone candidate; the digit-count
    // filter discards the rest
    if (column.hints.phone || text.chars().any(|c| c.is_ascii_digit()))
        && let Some(normalized) = normalize_phone(text)
    {
        findings.push(("Phone", normalized));
    }

    for m in config.ipv4_re.find_iter(text) {
        findings.push(("IPv4", m.as_str().to_string()));
    }

    for m in config.url_re.find_iter(text) {
        findings.push(("URL", m.as_str().to_string()));
    }

    findings
}

/// Normalizes a phone candidate to `+` plus its digits.
///
/// Accepts only candidates whose digit count lies in [10, 15] (E.164);
/// everything else is discarded, not reported.
pub(crate) fn normalize_phone(text: &str) -> Option<String> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    if digits.len() < 10 || digits.len() > 15 {
        return None;
    }
    Some(format!("+{}", digits))
}
