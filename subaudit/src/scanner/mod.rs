//! Source scanners
//!
//! Each scanner reads one contestant-scoped location and reports what it sees
//! into the [`Ledger`]: look up (or create) the record for the event's key,
//! then write or update the observation for its own [`Source`].
//!
//! Malformed input never aborts a scan; it is recorded as a [`ScanWarning`]
//! and logged, and so is a single store entry that cannot be read. Only
//! [`ScanError`]s stop a scan, and of those only an unrecognized store suffix
//! aborts the run (see [`ScanError::is_fatal`]).

mod event_log;
mod storage;

pub use event_log::LogScanner;
pub use storage::StorageScanner;

use std::fmt;
use std::path::{Path, PathBuf};

use subaudit_common::{Source, SubmissionKey, SubmissionStatus};
use thiserror::Error;

use crate::ledger::Ledger;

/// Scanner errors
#[derive(Debug, Error)]
pub enum ScanError {
    /// The source's file or directory does not exist
    #[error("{source_name} not found at {path}")]
    SourceMissing { source_name: Source, path: PathBuf },

    /// The source exists but cannot be read as a whole
    #[error("{source_name} at {path} is unreadable: {source}")]
    Unreadable {
        source_name: Source,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File-store entry with a valid key but an unrecognized status suffix
    #[error("Unrecognized status suffix '.{suffix}' on file-store entry {path}")]
    UnknownSuffix { path: PathBuf, suffix: String },
}

impl ScanError {
    /// Whether the error must abort the whole run.
    ///
    /// An absent or unreadable source only degrades the contestant's audit.
    /// An unrecognized suffix means the store's status encoding is not
    /// understood, so nothing derived from it can be trusted.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ScanError::UnknownSuffix { .. })
    }
}

/// Non-fatal finding while scanning
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanWarning {
    /// Line lacking the expected structure
    MalformedLine { line: usize, reason: String },
    /// Well-formed line emitted by another component
    UnrelatedLine { line: usize, tag: String },
    /// Second initial event for a key; the first one is kept
    DuplicateInitial { key: SubmissionKey },
    /// Follow-up event without a prior initial event for the key
    OrphanFollowUp {
        key: SubmissionKey,
        status: SubmissionStatus,
    },
    /// Two different terminal statuses for one key; the first one is kept
    StatusConflict {
        key: SubmissionKey,
        kept: SubmissionStatus,
        ignored: SubmissionStatus,
    },
    /// File-store entry whose name is not a submission key
    StrayEntry { name: String, reason: String },
    /// Second file-store entry for the same key; the first one is kept
    DuplicateEntry { key: SubmissionKey, name: String },
    /// File-store entry whose metadata or content cannot be read
    UnreadableEntry { name: String, reason: String },
}

impl fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanWarning::MalformedLine { line, reason } => {
                write!(f, "line {}: ignoring malformed line: {}", line, reason)
            }
            ScanWarning::UnrelatedLine { line, tag } => {
                write!(f, "line {}: ignoring line with unexpected tag '{}'", line, tag)
            }
            ScanWarning::DuplicateInitial { key } => {
                write!(f, "duplicate hash event for {}, keeping the first", key)
            }
            ScanWarning::OrphanFollowUp { key, status } => write!(
                f,
                "{} event for {} without prior hash event (out of order or lost)",
                status, key
            ),
            ScanWarning::StatusConflict { key, kept, ignored } => write!(
                f,
                "conflicting statuses for {}: keeping {}, ignoring {}",
                key, kept, ignored
            ),
            ScanWarning::StrayEntry { name, reason } => {
                write!(f, "skipping stray entry '{}': {}", name, reason)
            }
            ScanWarning::DuplicateEntry { key, name } => write!(
                f,
                "duplicate entry '{}' for {}, keeping the first",
                name, key
            ),
            ScanWarning::UnreadableEntry { name, reason } => {
                write!(f, "skipping unreadable entry '{}': {}", name, reason)
            }
        }
    }
}

/// What one scanner saw in one location
#[derive(Debug, Clone)]
pub struct ScanSummary {
    pub source: Source,
    /// Entries or events applied to the ledger
    pub applied: usize,
    pub warnings: Vec<ScanWarning>,
}

impl ScanSummary {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            applied: 0,
            warnings: Vec::new(),
        }
    }

    /// Record and log a warning
    pub fn warn(&mut self, warning: ScanWarning) {
        tracing::warn!(source = %self.source, "{}", warning);
        self.warnings.push(warning);
    }
}

/// A reader for one of the three sources
pub trait SourceScanner {
    /// Source identity this scanner writes observations for
    fn source(&self) -> Source;

    /// Scan `location` and report everything recognized into `ledger`
    fn scan(&self, location: &Path, ledger: &mut Ledger) -> Result<ScanSummary, ScanError>;
}
