//! Error types for subaudit
//!
//! Severity mapping:
//! - Fatal for the whole run: [`AuditError`] (unrecognized store suffix,
//!   unreadable sources, bad configuration, output failures)
//! - Per-contestant warnings: [`crate::scanner::ScanWarning`] and missing
//!   sources, logged and skipped
//! - Per-submission anomalies: [`crate::checker::Anomaly`], reported only

use std::path::PathBuf;

use thiserror::Error;

use crate::scanner::ScanError;

/// Result type for audit operations
pub type Result<T> = std::result::Result<T, AuditError>;

#[derive(Debug, Error)]
pub enum AuditError {
    /// Configuration file missing, unreadable or invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Source directory does not exist or is not a directory
    #[error("Source directory not found: {0}")]
    SourceDirMissing(PathBuf),

    /// Contestant filter names no directory under the source directory
    #[error("Contestant '{0}' not found in source directory")]
    UnknownContestant(String),

    /// A scanner hit an unrecoverable inconsistency
    #[error("Fatal scan error for contestant '{contestant}': {source}")]
    Scan {
        contestant: String,
        #[source]
        source: ScanError,
    },

    /// IO error (listing contestants, writing instructions)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
