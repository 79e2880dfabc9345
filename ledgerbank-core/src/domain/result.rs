//! Result and error types for the core library

use thiserror::Error;

/// Core library error type
///
/// Every operation resolves to one of three kinds: a business rule the
/// caller's input or requested action violated, a missing record, or an
/// infrastructure failure. Store failures are classified where they occur
/// and passed through unchanged.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an unexpected (infrastructure) error
    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self::Unexpected(msg.into())
    }
}

impl From<duckdb::Error> for Error {
    fn from(e: duckdb::Error) -> Self {
        Self::Unexpected(e.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Unexpected(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Unexpected(e.to_string())
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_carries_kind() {
        let err = Error::validation("insufficient balance");
        assert_eq!(err.to_string(), "Validation error: insufficient balance");

        let err = Error::not_found("account not found");
        assert_eq!(err.to_string(), "Not found: account not found");

        let err = Error::unexpected("connection lost");
        assert_eq!(err.to_string(), "Unexpected error: connection lost");
    }

    #[test]
    fn test_io_error_classified_as_unexpected() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let err: Error = io.into();
        assert!(matches!(err, Error::Unexpected(msg) if msg.contains("disk gone")));
    }
}
