//! SQLite connection handling for evidence databases.
//!
//! Forensic images are file-based, so connection handling is simple: one
//! read-only connection per database, no pooling. In-memory databases are
//! supported for tests and harnesses.
//!
//! # Connection Modes
//! - File-based: `sqlite:///path/to/evidence.db` or a bare `.db`/`.sqlite` path
//! - In-memory: `sqlite::memory:` or `:memory:`

use super::Extractor;
use crate::Result;
use crate::engine::detectors::DetectorConfig;
use sqlx::SqlitePool;
use url::Url;

impl Extractor {
    /// Opens an evidence database read-only and prepares an extractor.
    ///
    /// # Connection String Formats
    /// - `sqlite:///path/to/evidence.db` - Absolute file path
    /// - `/path/to/evidence.db`, `./image.sqlite` - Bare file path
    /// - `sqlite::memory:` or `:memory:` - In-memory database
    ///
    /// # Errors
    /// Returns [`crate::error::DbWitnessError::Connection`] if the file is
    /// missing, corrupt, or encrypted, and a configuration error if the
    /// connection string format is invalid. A failed open aborts only this
    /// database's run; batch callers continue with their next database.
    pub async fn open(connection_string: &str) -> Result<Self> {
        validate_connection_string(connection_string)?;
        let pool = open_read_only(connection_string).await?;

        Ok(Self {
            pool,
            database_name: extract_database_name(connection_string),
            config: DetectorConfig::new(),
        })
    }

    /// Wraps an already-open pool (tests and harnesses that build their own
    /// fixture databases). The caller retains responsibility for the pool
    /// being exclusively owned for the duration of the run.
    pub fn from_pool(pool: SqlitePool, database_name: impl Into<String>) -> Self {
        Self {
            pool,
            database_name: database_name.into(),
            config: DetectorConfig::new(),
        }
    }

    /// Checks if the connection is to an in-memory database.
    pub fn is_in_memory(&self) -> bool {
        self.database_name == ":memory:"
    }

    /// Closes the connection gracefully.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Validates a SQLite connection string format.
///
/// # Errors
/// Returns a configuration error if the string is neither `:memory:`, a
/// recognizable database file path, nor a `sqlite:` URL.
pub fn validate_connection_string(connection_string: &str) -> Result<()> {
    if connection_string == ":memory:" {
        return Ok(());
    }

    // Bare file path (e.g. "/evidence/msgstore.db")
    if connection_string.ends_with(".db")
        || connection_string.ends_with(".sqlite")
        || connection_string.ends_with(".sqlite3")
    {
        return Ok(());
    }

    if connection_string.starts_with("sqlite:") {
        if connection_string.contains(":memory:") || connection_string.contains("mode=memory") {
            return Ok(());
        }

        if let Ok(url) = Url::parse(connection_string) {
            if url.scheme() != "sqlite" {
                return Err(crate::error::DbWitnessError::configuration(
                    "Connection string must use sqlite:// scheme",
                ));
            }
            return Ok(());
        }

        if connection_string.starts_with("sqlite://") {
            return Ok(());
        }
    }

    Err(crate::error::DbWitnessError::configuration(
        "Invalid SQLite connection string: expected sqlite:// URL, database file path, or :memory:",
    ))
}

/// Extracts a display name for the database from the connection string.
pub(crate) fn extract_database_name(connection_string: &str) -> String {
    if connection_string == ":memory:" || connection_string.contains(":memory:") {
        return ":memory:".to_string();
    }

    if let Some(stripped) = connection_string.strip_prefix("sqlite://") {
        let path = stripped.split('?').next().unwrap_or(stripped);
        if let Some(filename) = path.rsplit('/').next()
            && !filename.is_empty()
        {
            return filename.to_string();
        }
    }

    if let Some(filename) = connection_string.rsplit('/').next()
        && !filename.is_empty()
    {
        return filename.to_string();
    }

    "main".to_string()
}

/// Opens a single read-only connection to the database.
///
/// Read-only is mandatory for file-based databases: the source image is a
/// forensic artifact and must never be mutated. In-memory databases are
/// opened writable (there is nothing to protect and fixtures need DDL).
async fn open_read_only(connection_string: &str) -> Result<SqlitePool> {
    use sqlx::sqlite::SqliteConnectOptions;
    use std::str::FromStr;

    let normalized = normalize_connection_string(connection_string);
    let in_memory = normalized.contains(":memory:") || normalized.contains("mode=memory");

    let mut options = SqliteConnectOptions::from_str(&normalized).map_err(|e| {
        crate::error::DbWitnessError::configuration(format!(
            "Invalid SQLite connection string: {}",
            e
        ))
    })?;

    if !in_memory {
        options = options.read_only(true);
    }

    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(crate::error::DbWitnessError::connection_failed)?;

    Ok(pool)
}

/// Normalizes a connection string to SQLite URL format.
fn normalize_connection_string(connection_string: &str) -> String {
    if connection_string == ":memory:" {
        return "sqlite::memory:".to_string();
    }

    if connection_string.starts_with("sqlite:") {
        return connection_string.to_string();
    }

    format!("sqlite://{}", connection_string)
}
