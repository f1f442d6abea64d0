//! Submission outcome status

use std::fmt;

/// Outcome of a submission attempt as seen by one source
///
/// `Unknown` means "observed, no terminal outcome yet". It is distinct from a
/// source never having observed the submission at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SubmissionStatus {
    #[default]
    Unknown,
    /// Accepted by the contest server
    Submitted,
    /// Refused by the contest server
    Rejected,
    /// Server unreachable or failed; kept locally for later re-submission
    RecordedLocally,
}

impl SubmissionStatus {
    pub const TERMINAL: [SubmissionStatus; 3] = [
        SubmissionStatus::Submitted,
        SubmissionStatus::Rejected,
        SubmissionStatus::RecordedLocally,
    ];

    pub fn is_terminal(self) -> bool {
        self != SubmissionStatus::Unknown
    }

    /// File-store suffix token (without the dot) for a terminal status
    pub fn suffix(self) -> Option<&'static str> {
        match self {
            SubmissionStatus::Unknown => None,
            SubmissionStatus::Submitted => Some("submitted"),
            SubmissionStatus::Rejected => Some("rejected"),
            SubmissionStatus::RecordedLocally => Some("local"),
        }
    }

    /// Inverse of [`SubmissionStatus::suffix`]
    pub fn from_suffix(token: &str) -> Option<Self> {
        Self::TERMINAL
            .into_iter()
            .find(|status| status.suffix() == Some(token))
    }

    pub fn name(self) -> &'static str {
        match self {
            SubmissionStatus::Unknown => "unknown",
            SubmissionStatus::Submitted => "submitted",
            SubmissionStatus::Rejected => "rejected",
            SubmissionStatus::RecordedLocally => "local",
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
