//! Evidence detectors.
//!
//! # Module Structure
//! - `identifier`: email / UUID / phone / IPv4 / URL pattern detectors
//! - `temporal`: epoch and ISO-8601 timestamp detection
//! - `relational`: heuristic discovery of id-like column pairs
//!
//! All detectors are driven by a single immutable [`DetectorConfig`] built
//! once per extractor and passed explicitly. There is no mutable global
//! state, so concurrent extractors over different databases never interact.

pub mod identifier;
pub mod relational;
pub mod temporal;

use crate::models::ColumnHints;
use regex::Regex;

/// Standard local@domain.tld shape.
const EMAIL_PATTERN: &str = r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b";

/// Canonical 8-4-4-4-12 grouping with RFC 4122 version and variant nibbles.
const UUID_PATTERN: &str =
    r"\b[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[1-5][0-9a-fA-F]{3}-[89abAB][0-9a-fA-F]{3}-[0-9a-fA-F]{12}\b";

/// Dotted-quad shape; octet ranges are not validated.
const IPV4_PATTERN: &str = r"\b(?:\d{1,3}\.){3}\d{1,3}\b";

const URL_PATTERN: &str = r"https?://(?:[-\w.]|(?:%[\da-fA-F]{2}))+";

/// Date-only, or date+time with optional fractional seconds and zone offset.
const ISO8601_PATTERN: &str =
    r"\b\d{4}-\d{2}-\d{2}(?:[ T]\d{2}:\d{2}:\d{2}(?:\.\d+)?(?:Z|[+-]\d{2}:\d{2})?)?\b";

/// Column names suggesting a record-to-record link: a link vocabulary word
/// at a token start, with the name ending in `id`.
const RELATION_PATTERN: &str =
    r"(?i)(?:^|_)(?:user|sender|from|src|author|owner|recipient|to|dst|peer).*id$";

const EMAIL_NAME_HINTS: &[&str] = &["email", "e_mail", "mail"];
const PHONE_NAME_HINTS: &[&str] = &["phone", "tel", "mobile", "msisdn"];
const UUID_NAME_HINTS: &[&str] = &["uuid", "guid"];
const TIME_NAME_HINTS: &[&str] = &["time", "date", "timestamp", "created", "modified", "duration"];

/// Source-side link vocabulary, strongest first.
const SOURCE_PRIORITY: &[&str] = &["sender", "from", "src", "author", "owner", "user"];
/// Destination-side link vocabulary, strongest first.
const DEST_PRIORITY: &[&str] = &["recipient", "to", "dst", "peer", "user"];

/// 2000-01-01T00:00:00Z; epoch values at or below this are not timestamps.
const EPOCH_LOWER_BOUND: i64 = 946_684_800;
/// 2030-01-01T00:00:00Z; epoch values at or above this are not timestamps.
const EPOCH_UPPER_BOUND: i64 = 1_893_456_000;
/// Magnitudes above this are millisecond encodings.
const MILLIS_THRESHOLD: i64 = 1_000_000_000_000;

/// Immutable detector configuration: compiled patterns, name vocabularies,
/// epoch bounds, and the relational pair cap.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    pub(crate) email_re: Regex,
    pub(crate) uuid_re: Regex,
    pub(crate) ipv4_re: Regex,
    pub(crate) url_re: Regex,
    pub(crate) iso8601_re: Regex,
    pub(crate) relation_re: Regex,

    pub(crate) email_hints: &'static [&'static str],
    pub(crate) phone_hints: &'static [&'static str],
    pub(crate) uuid_hints: &'static [&'static str],
    pub(crate) time_hints: &'static [&'static str],

    pub(crate) source_priority: &'static [&'static str],
    pub(crate) dest_priority: &'static [&'static str],

    pub(crate) epoch_lower: i64,
    pub(crate) epoch_upper: i64,
    pub(crate) millis_threshold: i64,

    /// Upper bound on retained relational pairs per table. The default of
    /// two bounds combinatorial growth on wide tables; tune against real
    /// schemas with many candidate link columns.
    pub max_relational_pairs: usize,
}

impl DetectorConfig {
    /// Builds the default configuration.
    ///
    /// # Panics
    /// Only if a built-in pattern fails to compile, which is a programming
    /// error caught by the test suite.
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self {
            email_re: Regex::new(EMAIL_PATTERN).expect("built-in email pattern"),
            uuid_re: Regex::new(UUID_PATTERN).expect("built-in uuid pattern"),
            ipv4_re: Regex::new(IPV4_PATTERN).expect("built-in ipv4 pattern"),
            url_re: Regex::new(URL_PATTERN).expect("built-in url pattern"),
            iso8601_re: Regex::new(ISO8601_PATTERN).expect("built-in iso8601 pattern"),
            relation_re: Regex::new(RELATION_PATTERN).expect("built-in relation pattern"),
            email_hints: EMAIL_NAME_HINTS,
            phone_hints: PHONE_NAME_HINTS,
            uuid_hints: UUID_NAME_HINTS,
            time_hints: TIME_NAME_HINTS,
            source_priority: SOURCE_PRIORITY,
            dest_priority: DEST_PRIORITY,
            epoch_lower: EPOCH_LOWER_BOUND,
            epoch_upper: EPOCH_UPPER_BOUND,
            millis_threshold: MILLIS_THRESHOLD,
            max_relational_pairs: 2,
        }
    }

    /// Classifies a column name into capability hints.
    ///
    /// Pure duck-typing on the name; computed once per column during
    /// introspection and reused by every detector pass.
    pub fn classify(&self, name: &str) -> ColumnHints {
        let n = name.to_lowercase();
        ColumnHints {
            email: self.email_hints.iter().any(|h| n.contains(h)),
            phone: self.phone_hints.iter().any(|h| n.contains(h)),
            uuid: self.uuid_hints.iter().any(|h| n.contains(h)),
            time: self.time_hints.iter().any(|h| n.contains(h)),
            relation: self.relation_re.is_match(name),
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self::new()
    }
}
