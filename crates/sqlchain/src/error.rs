//! Error types for sqlchain

use thiserror::Error;

/// Result type alias for sqlchain operations
pub type ChainResult<T> = Result<T, ChainError>;

/// Error types for building and executing statements
#[derive(Debug, Error)]
pub enum ChainError {
    /// The connection could not be established
    #[error("Connection error: {0}")]
    Connection(String),

    /// The driver rejected a compiled statement
    #[error("{message}. ({sql})")]
    Statement { message: String, sql: String },

    /// Transaction sequencing error
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// Builder state cannot be compiled
    #[error("Validation error: {0}")]
    Validation(String),

    /// Result cache store error
    #[error("Cache error: {0}")]
    Cache(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl ChainError {
    /// Create a statement failure carrying the offending SQL
    pub fn statement(message: impl Into<String>, sql: impl Into<String>) -> Self {
        Self::Statement {
            message: message.into(),
            sql: sql.into(),
        }
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Check if this is a statement execution failure
    pub fn is_statement(&self) -> bool {
        matches!(self, Self::Statement { .. })
    }

    /// Check if this is a connection failure
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// The SQL text attached to a statement failure, if any.
    pub fn sql(&self) -> Option<&str> {
        match self {
            Self::Statement { sql, .. } => Some(sql),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ChainError {
    fn from(err: std::io::Error) -> Self {
        Self::Cache(err.to_string())
    }
}

impl From<serde_json::Error> for ChainError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for ChainError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for ChainError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Other(err.to_string())
    }
}
