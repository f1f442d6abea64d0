//! Event log scanner (local and remote)
//!
//! Reads a log line by line. Initial `Hash` events create the source's
//! observation; follow-up events set its terminal status. Anything else is
//! warned about and skipped.

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;

use subaudit_common::{Error as ContractError, LogEvent, LogMessage, Source, SubmissionStatus};
use tracing::debug;

use super::{ScanError, ScanSummary, ScanWarning, SourceScanner};
use crate::ledger::{Ledger, Observation, StatusUpdate};

/// Scanner for one event log. The same format serves both the local log and
/// its remote mirror; only the source identity differs.
#[derive(Debug, Clone)]
pub struct LogScanner {
    source: Source,
    tag: String,
}

impl LogScanner {
    pub fn new(source: Source, tag: impl Into<String>) -> Self {
        Self {
            source,
            tag: tag.into(),
        }
    }

    fn apply(&self, event: LogEvent, ledger: &mut Ledger, summary: &mut ScanSummary) {
        let LogEvent {
            timestamp,
            key,
            message,
            ..
        } = event;

        let status = match message {
            LogMessage::Hash(hash) => {
                let slot = ledger.upsert(key.clone()).observations.slot_mut(self.source);
                if slot.is_some() {
                    summary.warn(ScanWarning::DuplicateInitial { key });
                    return;
                }
                *slot = Some(Observation::new(timestamp, Some(hash)));
                summary.applied += 1;
                return;
            }
            LogMessage::Submitted => SubmissionStatus::Submitted,
            LogMessage::Rejected { .. } => SubmissionStatus::Rejected,
            LogMessage::RecordedLocally => SubmissionStatus::RecordedLocally,
        };

        let existing = ledger
            .get_mut(&key)
            .and_then(|record| record.observations.slot_mut(self.source).as_mut());
        let Some(observation) = existing else {
            summary.warn(ScanWarning::OrphanFollowUp { key, status });
            return;
        };

        match observation.apply_status(status) {
            StatusUpdate::Applied => summary.applied += 1,
            StatusUpdate::Unchanged => {
                debug!(source = %self.source, key = %key, status = %status, "Repeated status event");
            }
            StatusUpdate::Conflict { kept } => {
                summary.warn(ScanWarning::StatusConflict {
                    key,
                    kept,
                    ignored: status,
                });
            }
        }
    }
}

impl SourceScanner for LogScanner {
    fn source(&self) -> Source {
        self.source
    }

    fn scan(&self, location: &Path, ledger: &mut Ledger) -> Result<ScanSummary, ScanError> {
        let file = File::open(location).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ScanError::SourceMissing {
                source_name: self.source,
                path: location.to_path_buf(),
            },
            _ => ScanError::Unreadable {
                source_name: self.source,
                path: location.to_path_buf(),
                source: e,
            },
        })?;

        let mut summary = ScanSummary::new(self.source);
        let mut reader = BufReader::new(file);
        let mut buffer = Vec::new();
        let mut line_no = 0usize;

        loop {
            buffer.clear();
            let read = reader
                .read_until(b'\n', &mut buffer)
                .map_err(|e| ScanError::Unreadable {
                    source_name: self.source,
                    path: location.to_path_buf(),
                    source: e,
                })?;
            if read == 0 {
                break;
            }
            line_no += 1;

            let line = String::from_utf8_lossy(&buffer);
            if line.trim().is_empty() {
                continue;
            }

            match LogEvent::parse(&line, &self.tag) {
                Ok(event) => self.apply(event, ledger, &mut summary),
                Err(ContractError::UnrelatedLine(tag)) => {
                    summary.warn(ScanWarning::UnrelatedLine { line: line_no, tag });
                }
                Err(e) => summary.warn(ScanWarning::MalformedLine {
                    line: line_no,
                    reason: e.to_string(),
                }),
            }
        }

        debug!(
            source = %self.source,
            lines = line_no,
            applied = summary.applied,
            "Log scanned"
        );
        Ok(summary)
    }
}
