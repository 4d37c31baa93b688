//! Core data models for evidence extraction.
//!
//! These types describe the introspected shape of a database (tables,
//! columns, resolved row identity) and the provenance-tagged evidence
//! records the engine produces. All output-facing models serialize with
//! stable field names; compatible re-implementations must preserve them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The three evidence classes the engine extracts.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum EntityClass {
    Identifier,
    Temporal,
    Relational,
}

impl std::fmt::Display for EntityClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityClass::Identifier => write!(f, "Identifier"),
            EntityClass::Temporal => write!(f, "Temporal"),
            EntityClass::Relational => write!(f, "Relational"),
        }
    }
}

impl std::str::FromStr for EntityClass {
    type Err = crate::error::DbWitnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "identifier" | "identifiers" => Ok(EntityClass::Identifier),
            "temporal" => Ok(EntityClass::Temporal),
            "relational" => Ok(EntityClass::Relational),
            other => Err(crate::error::DbWitnessError::configuration(format!(
                "Unknown entity class: '{}'",
                other
            ))),
        }
    }
}

/// Normalized storage-type class of a column.
///
/// SQLite type affinity is string-based; the fold keeps the original
/// declared type verbatim when no known class matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeClass {
    Text,
    Integer,
    Real,
    Other(String),
}

impl TypeClass {
    /// Folds a declared SQLite type string into a type class.
    ///
    /// Contains CHAR/TEXT/CLOB → Text; contains INT → Integer; contains
    /// REAL/FLOA/DOUB → Real; anything else is retained verbatim.
    pub fn from_declared(declared: &str) -> Self {
        let t = declared.to_uppercase();
        if t.contains("CHAR") || t.contains("TEXT") || t.contains("CLOB") {
            TypeClass::Text
        } else if t.contains("INT") {
            TypeClass::Integer
        } else if t.contains("REAL") || t.contains("FLOA") || t.contains("DOUB") {
            TypeClass::Real
        } else {
            TypeClass::Other(declared.to_string())
        }
    }

    /// True for Integer and Real columns, the candidates for epoch probing.
    pub fn is_numeric(&self) -> bool {
        matches!(self, TypeClass::Integer | TypeClass::Real)
    }
}

/// Capability flags derived from a column name, computed once per column
/// and reused by every detector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnHints {
    pub email: bool,
    pub phone: bool,
    pub uuid: bool,
    pub time: bool,
    pub relation: bool,
}

/// Column metadata as introspected from the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub declared_type: String,
    pub type_class: TypeClass,
    /// 1-based position within the declared primary key; 0 when the column
    /// is not a key member (mirrors `PRAGMA table_info` semantics).
    pub pk_ordinal: u32,
    pub hints: ColumnHints,
}

impl Column {
    pub fn is_primary_key(&self) -> bool {
        self.pk_ordinal > 0
    }
}

/// Table metadata with its resolved row-identity strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub primary_key: PrimaryKeySpec,
}

/// How a stable per-row identity is derived for a table.
///
/// Every row must yield exactly one resolvable identity value, never null
/// and never ambiguous within the table during a single scan. Tables where no
/// strategy holds (no declared key and no implicit rowid) are skipped rather
/// than given a guessed identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrimaryKeySpec {
    /// A single declared primary-key column
    SingleColumn(String),
    /// A composite key; identity is the ordered text-cast concatenation of
    /// the member values joined by [`crate::engine::identity::IDENTITY_SEPARATOR`]
    CompositeColumns(Vec<String>),
    /// No declared key; the storage engine's implicit rowid is used
    RowIdentityFallback,
}

/// One unit of extracted evidence with full provenance.
///
/// Serialized field names are part of the external contract:
/// `entity_type`, `subtype`, `value`, optional `raw`, `table`, `rowid`,
/// `column`. `rowid` is always text to avoid precision loss on composite
/// keys. For relational evidence `column` holds the comma-joined pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceRecord {
    pub entity_type: EntityClass,
    pub subtype: String,
    pub value: String,
    /// Original cell value for findings that were normalized (epoch
    /// instants); kept for auditability.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    pub table: String,
    pub rowid: String,
    pub column: String,
}

impl EvidenceRecord {
    /// The full identity key used for deduplication. Two records are
    /// duplicates only when all six fields match.
    pub fn dedup_key(&self) -> (EntityClass, &str, &str, &str, &str, &str) {
        (
            self.entity_type,
            self.subtype.as_str(),
            self.value.as_str(),
            self.table.as_str(),
            self.rowid.as_str(),
            self.column.as_str(),
        )
    }
}

/// What to extract and how much of each column to scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRequest {
    /// Entity classes to extract
    pub classes: BTreeSet<EntityClass>,
    /// Optional per-column row limit (quick previews); `None` scans all rows
    pub limit: Option<u32>,
}

impl ExtractionRequest {
    /// Requests all three entity classes with no scan limit.
    pub fn all() -> Self {
        Self {
            classes: [
                EntityClass::Identifier,
                EntityClass::Temporal,
                EntityClass::Relational,
            ]
            .into_iter()
            .collect(),
            limit: None,
        }
    }

    /// Requests a specific set of classes with no scan limit.
    pub fn for_classes(classes: impl IntoIterator<Item = EntityClass>) -> Self {
        Self {
            classes: classes.into_iter().collect(),
            limit: None,
        }
    }

    /// Sets the per-column scan limit.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn wants(&self, class: EntityClass) -> bool {
        self.classes.contains(&class)
    }
}

impl Default for ExtractionRequest {
    fn default() -> Self {
        Self::all()
    }
}

/// A table excluded from the scan, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedTable {
    pub table: String,
    pub reason: String,
}

/// Per-class counts and skip reasons for one extraction run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionSummary {
    pub identifiers: usize,
    pub temporals: usize,
    pub relationals: usize,
    pub skipped_tables: Vec<SkippedTable>,
}

impl ExtractionSummary {
    pub fn count(&self, class: EntityClass) -> usize {
        match class {
            EntityClass::Identifier => self.identifiers,
            EntityClass::Temporal => self.temporals,
            EntityClass::Relational => self.relationals,
        }
    }
}

/// The result of one extraction run: deduplicated records in first-seen
/// order plus the run summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub records: Vec<EvidenceRecord>,
    pub summary: ExtractionSummary,
}
