//! Common error types for subaudit

use thiserror::Error;

/// Common result type for subaudit operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while parsing or producing contract artifacts
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Submission key does not follow `<timestamp>:<task>:<language>`
    #[error("Invalid submission key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    /// File-store entry carries a suffix that maps to no status
    #[error("Unrecognized status suffix '.{suffix}' on '{name}'")]
    UnknownSuffix { name: String, suffix: String },

    /// Log line does not carry the expected structure
    #[error("Malformed log line: {0}")]
    MalformedLine(String),

    /// Log line is well-formed but its tag belongs to another component
    #[error("Unrelated log line (tag '{0}')")]
    UnrelatedLine(String),
}

impl Error {
    pub(crate) fn invalid_key(key: &str, reason: impl Into<String>) -> Self {
        Error::InvalidKey {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}
