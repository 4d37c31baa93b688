//! Error types for evidence extraction.
//!
//! Only database-open failures abort a run. Everything below that level
//! (unreadable table metadata, a table the streamer cannot select from)
//! downgrades to a logged skip so that partial results survive; a partial
//! baseline is always preferable to no baseline.

use thiserror::Error;

/// Main error type for dbwitness operations.
#[derive(Debug, Error)]
pub enum DbWitnessError {
    /// Database could not be opened (missing, corrupt, or encrypted file)
    #[error("Database open failed: {context}")]
    Connection {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Schema introspection failed at the database level
    #[error("Schema introspection failed: {context}")]
    Introspection {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Query execution failure that could not be downgraded to a table skip
    #[error("Query execution failed: {context}")]
    QueryExecution { context: String },

    /// Configuration or validation error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// I/O operation failed
    #[error("I/O operation failed: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Serialization or deserialization failed
    #[error("Serialization failed: {context}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results with DbWitnessError
pub type Result<T> = std::result::Result<T, DbWitnessError>;

impl DbWitnessError {
    /// Creates a connection error with context
    pub fn connection_failed<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Connection {
            context: "Database open failed".to_string(),
            source: Box::new(error),
        }
    }

    /// Creates an introspection error with context
    pub fn introspection_failed<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Introspection {
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a query execution error
    pub fn query_failed(context: impl Into<String>) -> Self {
        Self::QueryExecution {
            context: context.into(),
        }
    }

    /// Creates a serialization error
    pub fn serialization(context: impl Into<String>, error: serde_json::Error) -> Self {
        Self::Serialization {
            context: context.into(),
            source: error,
        }
    }
}
