//! Error types for the purchase store
//!
//! This module defines all error types that can occur while talking to the store
//! or validating a purchase form.

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Error types for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Query execution error
    #[error("Query execution error: {0}")]
    QueryError(String),

    /// Query timeout
    #[error("Query timeout after {timeout_ms}ms")]
    QueryTimeout { timeout_ms: u64 },

    /// A storage-enforced rule rejected the write (CHECK, UNIQUE, NOT NULL, ...)
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Transaction state misuse (begin twice, commit after rollback, ...)
    #[error("Transaction error: {0}")]
    TransactionError(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// SQLite error
    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    SqliteError(rusqlite::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl StoreError {
    /// Create a new connection error
    pub fn connection<S: Into<String>>(msg: S) -> Self {
        StoreError::ConnectionError(msg.into())
    }

    /// Create a new query error
    pub fn query<S: Into<String>>(msg: S) -> Self {
        StoreError::QueryError(msg.into())
    }

    /// Create a query timeout error
    pub fn query_timeout(timeout_ms: u64) -> Self {
        StoreError::QueryTimeout { timeout_ms }
    }

    /// Create a new constraint violation error
    pub fn constraint<S: Into<String>>(msg: S) -> Self {
        StoreError::ConstraintViolation(msg.into())
    }

    /// Create a new transaction error
    pub fn transaction<S: Into<String>>(msg: S) -> Self {
        StoreError::TransactionError(msg.into())
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        StoreError::ConfigError(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        StoreError::Other(msg.into())
    }

    /// True when the store rejected a well-formed write because of a stored rule
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, StoreError::ConstraintViolation(_))
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(rusqlite::ErrorCode::ConstraintViolation) => {
                StoreError::ConstraintViolation(err.to_string())
            }
            _ => StoreError::SqliteError(err),
        }
    }
}

/// Rejections raised while turning a purchase form into a request
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Customer id was empty or whitespace
    #[error("customer id must not be empty")]
    EmptyCustomerId,

    /// Quantity was zero or negative
    #[error("quantity must be positive, got {0}")]
    NonPositiveQuantity(i64),
}
