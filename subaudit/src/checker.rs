//! Consistency checker
//!
//! Evaluates one merged [`Submission`] against a fixed rule set, in order:
//!
//! 1. No storage observation → only-in-logs, and nothing else is checked
//! 2. Storage status unknown → incomplete submission
//! 3. |storage timestamp − creation time| ≥ storage threshold → drift
//! 4. For every source (storage included): missing, drift against the source
//!    threshold, hash mismatch, status mismatch, conflicting statuses
//!
//! The storage threshold is tight because the file store is written
//! synchronously at submission time; log shipping tolerates more skew.

use std::fmt;

use subaudit_common::hash::hashes_match;
use subaudit_common::time::drift_seconds;
use subaudit_common::{Source, SubmissionStatus};

use crate::config::DriftThresholds;
use crate::ledger::{Observation, Submission};

/// One inconsistency found in a submission record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anomaly {
    OnlyInLogs,
    Incomplete,
    StorageDrift {
        seconds: i64,
    },
    Missing {
        source: Source,
    },
    SourceDrift {
        source: Source,
        seconds: i64,
    },
    HashMismatch {
        source: Source,
    },
    StatusMismatch {
        source: Source,
        status: SubmissionStatus,
        storage_status: SubmissionStatus,
    },
    ConflictingStatuses {
        source: Source,
        first: SubmissionStatus,
        later: SubmissionStatus,
    },
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anomaly::OnlyInLogs => f.write_str("found only in logs, not in local storage"),
            Anomaly::Incomplete => f.write_str("incomplete submission"),
            Anomaly::StorageDrift { seconds } => write!(
                f,
                "{} timestamp drifts {}s from submission time",
                Source::Storage,
                seconds
            ),
            Anomaly::Missing { source } => write!(f, "missing from {}", source),
            Anomaly::SourceDrift { source, seconds } => {
                write!(f, "{} timestamp drifts {}s from submission time", source, seconds)
            }
            Anomaly::HashMismatch { source } => write!(f, "hash mismatch in {}", source),
            Anomaly::StatusMismatch {
                source,
                status,
                storage_status,
            } => write!(
                f,
                "status mismatch in {}: {} vs storage {}",
                source, status, storage_status
            ),
            Anomaly::ConflictingStatuses {
                source,
                first,
                later,
            } => write!(f, "conflicting statuses in {}: {} then {}", source, first, later),
        }
    }
}

/// Rule-based cross-source validation
#[derive(Debug, Clone, Copy)]
pub struct ConsistencyChecker {
    /// Inclusive bound on storage drift (seconds)
    storage_drift_threshold: u64,
    /// Inclusive bound on any source's drift (seconds)
    source_drift_threshold: u64,
}

impl Default for ConsistencyChecker {
    fn default() -> Self {
        Self::new(&DriftThresholds::default())
    }
}

impl ConsistencyChecker {
    pub fn new(thresholds: &DriftThresholds) -> Self {
        Self {
            storage_drift_threshold: u64::from(thresholds.storage_drift_secs),
            source_drift_threshold: u64::from(thresholds.source_drift_secs),
        }
    }

    /// Check one record. An empty result means the record is consistent.
    pub fn check(&self, record: &Submission) -> Vec<Anomaly> {
        let Some(storage) = record.storage() else {
            return vec![Anomaly::OnlyInLogs];
        };

        let mut anomalies = Vec::new();
        let created_at = record.created_at();

        if storage.status == SubmissionStatus::Unknown {
            anomalies.push(Anomaly::Incomplete);
        }

        let drift = drift_seconds(storage.timestamp, created_at);
        if drift.unsigned_abs() >= self.storage_drift_threshold {
            anomalies.push(Anomaly::StorageDrift { seconds: drift });
        }

        for (source, observation) in record.observations.iter() {
            match observation {
                None => anomalies.push(Anomaly::Missing { source }),
                Some(observation) => {
                    self.check_source(source, observation, storage, record, &mut anomalies)
                }
            }
        }

        anomalies
    }

    fn check_source(
        &self,
        source: Source,
        observation: &Observation,
        storage: &Observation,
        record: &Submission,
        anomalies: &mut Vec<Anomaly>,
    ) {
        let drift = drift_seconds(observation.timestamp, record.created_at());
        if drift.unsigned_abs() >= self.source_drift_threshold {
            anomalies.push(Anomaly::SourceDrift {
                source,
                seconds: drift,
            });
        }

        let hash_differs = match (&observation.hash, &storage.hash) {
            (Some(a), Some(b)) => !hashes_match(a, b),
            (None, None) => false,
            _ => true,
        };
        if hash_differs {
            anomalies.push(Anomaly::HashMismatch { source });
        }

        if observation.status != storage.status {
            anomalies.push(Anomaly::StatusMismatch {
                source,
                status: observation.status,
                storage_status: storage.status,
            });
        }

        if let Some(later) = observation.conflicting_status {
            anomalies.push(Anomaly::ConflictingStatuses {
                source,
                first: observation.status,
                later,
            });
        }
    }
}
