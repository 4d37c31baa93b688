//! Evidence-extraction engine for dbwitness.
//!
//! This crate turns an arbitrary SQLite database, typically extracted from
//! a device or application image, into a deduplicated, provenance-tagged
//! set of forensic evidence records: identifiers (emails, phone numbers,
//! UUIDs, IPs, URLs), temporal values in multiple encodings, and relational
//! links between records. Every record carries the (table, column, row
//! identity) triple proving where its value was found, so the output can
//! serve as a trustworthy scoring baseline for downstream agents.
//!
//! # Guarantees
//! - The source database is opened read-only and never mutated
//! - Output is deterministic: unchanged database, identical record list
//! - Every record is backed by an observed cell, never synthesized
//! - No error from one table terminates processing of its siblings
//!
//! # Example
//! ```rust,no_run
//! use dbwitness_core::{ExtractionRequest, Extractor};
//!
//! # async fn run() -> dbwitness_core::Result<()> {
//! let extractor = Extractor::open("/evidence/msgstore.db").await?;
//! let report = extractor.extract(&ExtractionRequest::all()).await?;
//! for record in &report.records {
//!     println!("{} {} at {}.{} row {}",
//!         record.entity_type, record.value,
//!         record.table, record.column, record.rowid);
//! }
//! # Ok(())
//! # }
//! ```

pub mod engine;
pub mod error;
pub mod logging;
pub mod models;

// Re-export commonly used types
pub use engine::Extractor;
pub use engine::detectors::DetectorConfig;
pub use error::{DbWitnessError, Result};
pub use logging::init_logging;
pub use models::{
    Column, ColumnHints, EntityClass, EvidenceRecord, ExtractionReport, ExtractionRequest,
    ExtractionSummary, PrimaryKeySpec, SkippedTable, Table, TypeClass,
};
