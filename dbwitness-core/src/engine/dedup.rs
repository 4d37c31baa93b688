//! Deduplication of evidence records.
//!
//! Records are identical only when the full six-field key matches; the
//! same value found in two rows, two columns, or by two detectors is not a
//! duplicate. First-seen order is preserved, which together with the
//! deterministic table/row iteration order makes extraction output
//! reproducible across runs, as required for it to serve as a baseline.

use crate::models::{EntityClass, EvidenceRecord};
use std::collections::HashSet;

/// Removes records whose full (class, subtype, value, table, rowid, column)
/// key was already seen, keeping the first occurrence.
pub(crate) fn dedupe(records: Vec<EvidenceRecord>) -> Vec<EvidenceRecord> {
    let mut seen: HashSet<(EntityClass, String, String, String, String, String)> =
        HashSet::with_capacity(records.len());
    let mut out = Vec::with_capacity(records.len());

    for record in records {
        let key = (
            record.entity_type,
            record.subtype.clone(),
            record.value.clone(),
            record.table.clone(),
            record.rowid.clone(),
            record.column.clone(),
        );
        if seen.insert(key) {
            out.push(record);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(subtype: &str, value: &str, rowid: &str, column: &str) -> EvidenceRecord {
        EvidenceRecord {
            entity_type: EntityClass::Identifier,
            subtype: subtype.to_string(),
            value: value.to_string(),
            raw: None,
            table: "t".to_string(),
            rowid: rowid.to_string(),
            column: column.to_string(),
        }
    }

    #[test]
    fn test_exact_duplicates_collapse() {
        let records = vec![
            record("Email", "a@b.com", "1", "body"),
            record("Email", "a@b.com", "1", "body"),
        ];
        assert_eq!(dedupe(records).len(), 1);
    }

    #[test]
    fn test_any_differing_field_is_kept() {
        let records = vec![
            record("Email", "a@b.com", "1", "body"),
            record("Email", "a@b.com", "2", "body"),    // different row
            record("Email", "a@b.com", "1", "subject"), // different column
            record("URL", "a@b.com", "1", "body"),      // different subtype
        ];
        assert_eq!(dedupe(records).len(), 4);
    }

    #[test]
    fn test_first_seen_order_preserved() {
        let records = vec![
            record("Email", "c@d.org", "1", "body"),
            record("Email", "a@b.com", "1", "body"),
            record("Email", "c@d.org", "1", "body"),
        ];
        let deduped = dedupe(records);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].value, "c@d.org");
        assert_eq!(deduped[1].value, "a@b.com");
    }
}
