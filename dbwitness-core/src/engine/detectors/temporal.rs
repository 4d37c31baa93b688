//! Temporal detectors: Unix-epoch instants and ISO-8601 text timestamps.
//!
//! Two signals select columns independently: a time-related column name, or
//! a numeric type class. The name widens which columns are scanned, but a
//! value must still pass the plausibility window to be reported as an
//! epoch, so small integer IDs and large unrelated counters stay out by
//! construction. This is a deliberate precision/recall trade-off, not a
//! general epoch parser.

use super::DetectorConfig;
use crate::engine::stream;
use crate::models::{EntityClass, EvidenceRecord, Table, TypeClass};
use sqlx::SqlitePool;

/// Scans all temporal-eligible columns of a table.
///
/// Per column, epoch findings precede ISO findings so output order is
/// stable. Column-level streaming failures skip only that column.
pub(crate) async fn scan_table(
    pool: &SqlitePool,
    config: &DetectorConfig,
    table: &Table,
    identity_expr: &str,
    limit: Option<u32>,
) -> Vec<EvidenceRecord> {
    let mut records = Vec::new();

    for column in &table.columns {
        let numeric_eligible = column.type_class.is_numeric() || column.hints.time;
        let text_eligible = column.type_class == TypeClass::Text || column.hints.time;
        if !numeric_eligible && !text_eligible {
            continue;
        }

        let rows =
            match stream::stream_column(pool, &table.name, &column.name, identity_expr, limit)
                .await
            {
                Ok(rows) => rows,
                Err(e) => {
                    tracing::warn!(
                        "Temporal pass skipping column '{}.{}': {}",
                        table.name,
                        column.name,
                        e
                    );
                    continue;
                }
            };

        if numeric_eligible {
            for (rid, cell) in &rows {
                let Some(candidate) = cell.epoch_candidate() else {
                    continue;
                };
                let Some(instant) = epoch_to_instant(config, candidate) else {
                    continue;
                };
                records.push(EvidenceRecord {
                    entity_type: EntityClass::Temporal,
                    subtype: "UnixEpoch".to_string(),
                    value: instant,
                    raw: cell.display_string(),
                    table: table.name.clone(),
                    rowid: rid.clone(),
                    column: column.name.clone(),
                });
            }
        }

        if text_eligible {
            for (rid, cell) in &rows {
                let Some(text) = cell.display_string() else {
                    continue;
                };
                if config.iso8601_re.is_match(&text) {
                    records.push(EvidenceRecord {
                        entity_type: EntityClass::Temporal,
                        subtype: "ISO8601".to_string(),
                        // Reported verbatim, not reformatted
                        value: text,
                        raw: None,
                        table: table.name.clone(),
                        rowid: rid.clone(),
                        column: column.name.clone(),
                    });
                }
            }
        }
    }

    records
}

/// Normalizes a plausible epoch value to a canonical RFC 3339 UTC instant.
///
/// Magnitudes above the millisecond threshold are divided by 1000 first.
/// The resulting seconds must fall strictly inside the 2000-01-01 to
/// 2030-01-01 window; everything else returns `None` and is discarded.
pub(crate) fn epoch_to_instant(config: &DetectorConfig, value: i64) -> Option<String> {
    let (secs, millis) = if value.unsigned_abs() > config.millis_threshold.unsigned_abs() {
        (value / 1000, value % 1000)
    } else {
        (value, 0)
    };

    if secs <= config.epoch_lower || secs >= config.epoch_upper {
        return None;
    }

    // secs is positive here, so the millisecond remainder is non-negative
    let nanos = u32::try_from(millis).ok()? * 1_000_000;
    let instant = chrono::DateTime::from_timestamp(secs, nanos)?;
    Some(instant.to_rfc3339())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_seconds_and_millis_converge() {
        let config = DetectorConfig::new();
        let from_secs = epoch_to_instant(&config, 1_700_000_000).unwrap();
        let from_millis = epoch_to_instant(&config, 1_700_000_000_000).unwrap();
        assert_eq!(from_secs, from_millis);
        assert_eq!(from_secs, "2023-11-14T22:13:20+00:00");
    }

    #[test]
    fn test_epoch_window_is_strict() {
        let config = DetectorConfig::new();
        // Bounds themselves are excluded
        assert_eq!(epoch_to_instant(&config, 946_684_800), None);
        assert_eq!(epoch_to_instant(&config, 1_893_456_000), None);
        // Just inside
        assert!(epoch_to_instant(&config, 946_684_801).is_some());
        assert!(epoch_to_instant(&config, 1_893_455_999).is_some());
    }

    #[test]
    fn test_small_ids_and_large_counters_rejected() {
        let config = DetectorConfig::new();
        assert_eq!(epoch_to_instant(&config, 1), None);
        assert_eq!(epoch_to_instant(&config, 42), None);
        assert_eq!(epoch_to_instant(&config, -1_700_000_000), None);
        // Milliseconds of a post-2030 instant
        assert_eq!(epoch_to_instant(&config, 2_000_000_000_000), None);
    }

    #[test]
    fn test_millisecond_remainder_is_kept() {
        let config = DetectorConfig::new();
        let instant = epoch_to_instant(&config, 1_700_000_000_123).unwrap();
        assert!(instant.starts_with("2023-11-14T22:13:20.123"));
    }

    #[test]
    fn test_iso8601_shapes() {
        let config = DetectorConfig::new();
        assert!(config.iso8601_re.is_match("2023-11-14"));
        assert!(config.iso8601_re.is_match("2023-11-14 22:13:20"));
        assert!(config.iso8601_re.is_match("2023-11-14T22:13:20.123Z"));
        assert!(config.iso8601_re.is_match("2023-11-14T22:13:20+01:00"));
        assert!(config.iso8601_re.is_match("logged at 2023-11-14T22:13:20"));
        assert!(!config.iso8601_re.is_match("14/11/2023"));
        assert!(!config.iso8601_re.is_match("1700000000"));
    }
}
