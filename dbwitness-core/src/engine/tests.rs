//! Engine-level tests over in-memory databases.
//!
//! These tests exercise the full pipeline (introspection, identity
//! resolution, streaming, detection, deduplication) against fixture
//! databases built through a writable pool, then wrapped by an extractor.

use super::Extractor;
use crate::models::{EntityClass, ExtractionRequest};
use sqlx::SqlitePool;

async fn memory_pool() -> SqlitePool {
    sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap()
}

async fn messages_fixture() -> Extractor {
    let pool = memory_pool().await;
    sqlx::query(
        "CREATE TABLE messages (
            id INTEGER PRIMARY KEY,
            sender_id INT,
            recipient_id INT,
            body TEXT,
            sent_at INTEGER
        )",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "INSERT INTO messages (id, sender_id, recipient_id, body, sent_at)
         VALUES (1, 10, 20, 'contact me at a@b.com', 1700000000)",
    )
    .execute(&pool)
    .await
    .unwrap();
    Extractor::from_pool(pool, ":memory:")
}

// =============================================================================
// End-to-End Scenario
// =============================================================================

#[tokio::test]
async fn test_messages_scenario_yields_exactly_three_records() {
    let extractor = messages_fixture().await;
    let report = extractor.extract(&ExtractionRequest::all()).await.unwrap();

    assert_eq!(report.records.len(), 3, "records: {:?}", report.records);

    let email = report
        .records
        .iter()
        .find(|r| r.entity_type == EntityClass::Identifier)
        .unwrap();
    assert_eq!(email.subtype, "Email");
    assert_eq!(email.value, "a@b.com");
    assert_eq!(email.table, "messages");
    assert_eq!(email.rowid, "1");
    assert_eq!(email.column, "body");

    let epoch = report
        .records
        .iter()
        .find(|r| r.entity_type == EntityClass::Temporal)
        .unwrap();
    assert_eq!(epoch.subtype, "UnixEpoch");
    assert_eq!(epoch.value, "2023-11-14T22:13:20+00:00");
    assert_eq!(epoch.raw.as_deref(), Some("1700000000"));
    assert_eq!(epoch.rowid, "1");
    assert_eq!(epoch.column, "sent_at");

    let link = report
        .records
        .iter()
        .find(|r| r.entity_type == EntityClass::Relational)
        .unwrap();
    assert_eq!(link.subtype, "sender_id->recipient_id");
    assert_eq!(link.value, "10->20");
    assert_eq!(link.rowid, "1");
    assert_eq!(link.column, "sender_id,recipient_id");

    assert_eq!(report.summary.identifiers, 1);
    assert_eq!(report.summary.temporals, 1);
    assert_eq!(report.summary.relationals, 1);
    assert!(report.summary.skipped_tables.is_empty());
}

#[tokio::test]
async fn test_requested_classes_gate_the_passes() {
    let extractor = messages_fixture().await;
    let request = ExtractionRequest::for_classes([EntityClass::Temporal]);
    let report = extractor.extract(&request).await.unwrap();

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].entity_type, EntityClass::Temporal);
    assert_eq!(report.summary.identifiers, 0);
    assert_eq!(report.summary.relationals, 0);
}

// =============================================================================
// Determinism
// =============================================================================

#[tokio::test]
async fn test_extraction_is_idempotent() {
    let extractor = messages_fixture().await;
    let first = extractor.extract(&ExtractionRequest::all()).await.unwrap();
    let second = extractor.extract(&ExtractionRequest::all()).await.unwrap();
    assert_eq!(first.records, second.records);
}

#[tokio::test]
async fn test_no_two_records_share_the_full_key() {
    let pool = memory_pool().await;
    sqlx::query(
        "CREATE TABLE notes (
            id INTEGER PRIMARY KEY,
            body TEXT,
            mirror TEXT,
            created_at INTEGER
        )",
    )
    .execute(&pool)
    .await
    .unwrap();
    // Same values across rows and columns; only full-key duplicates collapse
    sqlx::query(
        "INSERT INTO notes (id, body, mirror, created_at) VALUES
            (1, 'a@b.com and a@b.com', 'a@b.com', 1700000000),
            (2, 'a@b.com', 'a@b.com', 1700000000)",
    )
    .execute(&pool)
    .await
    .unwrap();

    let extractor = Extractor::from_pool(pool, ":memory:");
    let report = extractor.extract(&ExtractionRequest::all()).await.unwrap();

    let mut keys: Vec<_> = report.records.iter().map(|r| r.dedup_key()).collect();
    let total = keys.len();
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), total);

    // Row 1 body mentions the address twice: one record. Four distinct
    // (row, column) provenances for the same address survive dedup.
    let emails = report
        .records
        .iter()
        .filter(|r| r.subtype == "Email")
        .count();
    assert_eq!(emails, 4);
}

// =============================================================================
// Row Identity
// =============================================================================

#[tokio::test]
async fn test_composite_key_identities_are_distinct() {
    let pool = memory_pool().await;
    sqlx::query(
        "CREATE TABLE membership (
            a INTEGER,
            b TEXT,
            contact TEXT,
            PRIMARY KEY (a, b)
        )",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "INSERT INTO membership (a, b, contact) VALUES
            (1, 'x', 'm@n.com'),
            (1, 'y', 'm@n.com')",
    )
    .execute(&pool)
    .await
    .unwrap();

    let extractor = Extractor::from_pool(pool, ":memory:");
    let report = extractor.extract(&ExtractionRequest::all()).await.unwrap();

    let mut rowids: Vec<&str> = report
        .records
        .iter()
        .filter(|r| r.subtype == "Email")
        .map(|r| r.rowid.as_str())
        .collect();
    rowids.sort();
    assert_eq!(rowids, vec!["1|x", "1|y"]);
}

#[tokio::test]
async fn test_rowid_fallback_for_keyless_table() {
    let pool = memory_pool().await;
    sqlx::query("CREATE TABLE logs (note TEXT)")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO logs (note) VALUES ('ping c@d.org'), ('pong e@f.org')")
        .execute(&pool)
        .await
        .unwrap();

    let extractor = Extractor::from_pool(pool, ":memory:");
    let report = extractor.extract(&ExtractionRequest::all()).await.unwrap();

    let rowids: Vec<&str> = report
        .records
        .iter()
        .filter(|r| r.subtype == "Email")
        .map(|r| r.rowid.as_str())
        .collect();
    assert_eq!(rowids, vec!["1", "2"]);
}

// =============================================================================
// Scan Limits
// =============================================================================

#[tokio::test]
async fn test_scan_limit_caps_rows_considered() {
    let pool = memory_pool().await;
    sqlx::query("CREATE TABLE contacts (id INTEGER PRIMARY KEY, email TEXT)")
        .execute(&pool)
        .await
        .unwrap();
    for i in 1..=5 {
        sqlx::query("INSERT INTO contacts (id, email) VALUES (?, ?)")
            .bind(i)
            .bind(format!("user{}@example.com", i))
            .execute(&pool)
            .await
            .unwrap();
    }

    let extractor = Extractor::from_pool(pool, ":memory:");

    let limited = extractor
        .extract(&ExtractionRequest::for_classes([EntityClass::Identifier]).with_limit(3))
        .await
        .unwrap();
    let emails = limited.records.iter().filter(|r| r.subtype == "Email").count();
    assert_eq!(emails, 3);

    // A limit above the row count never truncates available matches
    let generous = extractor
        .extract(&ExtractionRequest::for_classes([EntityClass::Identifier]).with_limit(10))
        .await
        .unwrap();
    let emails = generous.records.iter().filter(|r| r.subtype == "Email").count();
    assert_eq!(emails, 5);
}

// =============================================================================
// Temporal Normalization
// =============================================================================

#[tokio::test]
async fn test_epoch_encodings_converge_end_to_end() {
    let pool = memory_pool().await;
    sqlx::query(
        "CREATE TABLE events (
            id INTEGER PRIMARY KEY,
            t_sec INTEGER,
            t_ms INTEGER
        )",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query("INSERT INTO events (id, t_sec, t_ms) VALUES (1, 1700000000, 1700000000000)")
        .execute(&pool)
        .await
        .unwrap();

    let extractor = Extractor::from_pool(pool, ":memory:");
    let report = extractor
        .extract(&ExtractionRequest::for_classes([EntityClass::Temporal]))
        .await
        .unwrap();

    let values: Vec<&str> = report
        .records
        .iter()
        .filter(|r| r.subtype == "UnixEpoch")
        .map(|r| r.value.as_str())
        .collect();
    assert_eq!(values.len(), 2);
    assert!(values.iter().all(|v| *v == "2023-11-14T22:13:20+00:00"));

    let raws: Vec<Option<&str>> = report
        .records
        .iter()
        .filter(|r| r.subtype == "UnixEpoch")
        .map(|r| r.raw.as_deref())
        .collect();
    assert!(raws.contains(&Some("1700000000")));
    assert!(raws.contains(&Some("1700000000000")));
}

#[tokio::test]
async fn test_name_hint_alone_does_not_force_epoch_findings() {
    let pool = memory_pool().await;
    // A time-named column holding values outside the plausibility window
    sqlx::query("CREATE TABLE t (id INTEGER PRIMARY KEY, duration INTEGER, created TEXT)")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO t (id, duration, created) VALUES (1, 45, '2023-11-14T22:13:20Z')")
        .execute(&pool)
        .await
        .unwrap();

    let extractor = Extractor::from_pool(pool, ":memory:");
    let report = extractor
        .extract(&ExtractionRequest::for_classes([EntityClass::Temporal]))
        .await
        .unwrap();

    // duration=45 fails the window despite the name hint; the text column
    // still reports through the ISO path, verbatim
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].subtype, "ISO8601");
    assert_eq!(report.records[0].value, "2023-11-14T22:13:20Z");
    assert_eq!(report.records[0].column, "created");
}
