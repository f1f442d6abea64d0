//! Event log line format
//!
//! One event per line: `<timestamp> <tag>: Submission <key>: <body>` where the
//! body is one of
//! - `Hash <hex>` (initial event, carries the content digest)
//! - `Submitted to server`
//! - `Rejected by server: <detail>`
//! - `Recording locally`
//!
//! The rejection detail is free text and is kept verbatim, never parsed.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::hash::is_hex_digest;
use crate::time::parse_log_timestamp;
use crate::{Error, Result, SubmissionKey, SubmissionStatus};

/// Tag written by the submission client
pub const DEFAULT_TAG: &str = "submit";

const SUBMISSION_PREFIX: &str = "Submission ";
const HASH_PREFIX: &str = "Hash ";
const SUBMITTED_PHRASE: &str = "Submitted to server";
const REJECTED_PHRASE: &str = "Rejected by server";
const RECORDED_LOCALLY_PHRASE: &str = "Recording locally";

/// Message body of a submission event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogMessage {
    /// Initial event carrying the content digest
    Hash(String),
    Submitted,
    Rejected { detail: String },
    RecordedLocally,
}

impl LogMessage {
    /// Terminal status carried by a follow-up event, `None` for the initial event
    pub fn status(&self) -> Option<SubmissionStatus> {
        match self {
            LogMessage::Hash(_) => None,
            LogMessage::Submitted => Some(SubmissionStatus::Submitted),
            LogMessage::Rejected { .. } => Some(SubmissionStatus::Rejected),
            LogMessage::RecordedLocally => Some(SubmissionStatus::RecordedLocally),
        }
    }

    fn parse(body: &str) -> Option<Self> {
        if let Some(hex) = body.strip_prefix(HASH_PREFIX) {
            return is_hex_digest(hex).then(|| LogMessage::Hash(hex.to_string()));
        }
        if body == SUBMITTED_PHRASE {
            return Some(LogMessage::Submitted);
        }
        if body == RECORDED_LOCALLY_PHRASE {
            return Some(LogMessage::RecordedLocally);
        }
        let rest = body.strip_prefix(REJECTED_PHRASE)?;
        let detail = if rest.is_empty() {
            ""
        } else {
            rest.strip_prefix(':')?.trim()
        };
        Some(LogMessage::Rejected {
            detail: detail.to_string(),
        })
    }
}

impl fmt::Display for LogMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogMessage::Hash(hex) => write!(f, "{}{}", HASH_PREFIX, hex),
            LogMessage::Submitted => f.write_str(SUBMITTED_PHRASE),
            LogMessage::Rejected { detail } => write!(f, "{}: {}", REJECTED_PHRASE, detail),
            LogMessage::RecordedLocally => f.write_str(RECORDED_LOCALLY_PHRASE),
        }
    }
}

/// One parsed submission event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub tag: String,
    pub key: SubmissionKey,
    pub message: LogMessage,
}

impl LogEvent {
    /// Parse a line, accepting only events emitted under `expected_tag`
    pub fn parse(line: &str, expected_tag: &str) -> Result<Self> {
        let line = line.trim_end();
        let malformed = || Error::MalformedLine(line.to_string());

        let (stamp, rest) = line.split_once(' ').ok_or_else(malformed)?;
        let timestamp = parse_log_timestamp(stamp).ok_or_else(malformed)?;
        let (tag, message) = rest.split_once(": ").ok_or_else(malformed)?;
        if tag != expected_tag {
            return Err(Error::UnrelatedLine(tag.to_string()));
        }

        let event = message.strip_prefix(SUBMISSION_PREFIX).ok_or_else(malformed)?;
        let (key, body) = event.split_once(": ").ok_or_else(malformed)?;
        let key = SubmissionKey::parse(key)
            .map_err(|e| Error::MalformedLine(format!("{} ({})", line, e)))?;
        let message = LogMessage::parse(body).ok_or_else(malformed)?;

        Ok(Self {
            timestamp,
            tag: tag.to_string(),
            key,
            message,
        })
    }

    /// Render the event as a log line (no trailing newline)
    pub fn to_line(&self) -> String {
        format!(
            "{} {}: {}{}: {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
            self.tag,
            SUBMISSION_PREFIX,
            self.key,
            self.message
        )
    }
}
