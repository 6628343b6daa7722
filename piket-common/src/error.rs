//! Common error types for Piket

use thiserror::Error;

/// Common result type for Piket operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the Piket crates
///
/// Each variant maps to one class of client-visible failure; the HTTP layer
/// decides the status code from the variant alone.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Missing or malformed field in a request
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Required query parameter absent or unparsable
    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    /// Date range with start after end
    #[error("Invalid range: {start} is after {end}")]
    InvalidRange { start: String, end: String },

    /// Bad credentials or missing/expired session
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Authenticated, but not allowed to do this
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Uniqueness violation
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Convert a UNIQUE constraint failure into `Conflict`, pass anything else through
    #[cfg(feature = "sqlx")]
    pub fn conflict_on_unique(err: sqlx::Error, message: impl Into<String>) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return Error::Conflict(message.into());
            }
        }
        Error::Database(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_range_message() {
        let err = Error::InvalidRange {
            start: "2024-05-10".into(),
            end: "2024-05-01".into(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid range: 2024-05-10 is after 2024-05-01"
        );
    }
}
