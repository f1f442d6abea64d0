//! Submission ledger
//!
//! Merged per-submission view for one contestant. Scanners upsert records by
//! key and fill in the observation slot for their own source. The ledger is
//! built once per contestant and dropped after its pass.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use subaudit_common::{Source, SubmissionKey, SubmissionStatus};

/// One source's knowledge about one submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    /// When the source's channel registered the event
    pub timestamp: DateTime<Utc>,
    /// Content digest, when the source captured one
    pub hash: Option<String>,
    pub status: SubmissionStatus,
    /// First terminal status that contradicted `status`, if any
    pub conflicting_status: Option<SubmissionStatus>,
}

/// Outcome of applying a status to an observation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusUpdate {
    Applied,
    /// Same status again (or `Unknown`), nothing changed
    Unchanged,
    /// A different terminal status was already recorded and is kept
    Conflict { kept: SubmissionStatus },
}

impl Observation {
    pub fn new(timestamp: DateTime<Utc>, hash: Option<String>) -> Self {
        Self {
            timestamp,
            hash,
            status: SubmissionStatus::Unknown,
            conflicting_status: None,
        }
    }

    pub fn with_status(mut self, status: SubmissionStatus) -> Self {
        self.status = status;
        self
    }

    /// Apply a status transition. The first terminal status wins; a later,
    /// different one is remembered in `conflicting_status` and reported.
    pub fn apply_status(&mut self, status: SubmissionStatus) -> StatusUpdate {
        if status == self.status || !status.is_terminal() {
            return StatusUpdate::Unchanged;
        }
        if !self.status.is_terminal() {
            self.status = status;
            return StatusUpdate::Applied;
        }
        if self.conflicting_status.is_none() {
            self.conflicting_status = Some(status);
        }
        StatusUpdate::Conflict { kept: self.status }
    }
}

/// One optional observation per source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Observations {
    pub storage: Option<Observation>,
    pub local_log: Option<Observation>,
    pub remote_log: Option<Observation>,
}

impl Observations {
    pub fn get(&self, source: Source) -> Option<&Observation> {
        match source {
            Source::Storage => self.storage.as_ref(),
            Source::LocalLog => self.local_log.as_ref(),
            Source::RemoteLog => self.remote_log.as_ref(),
        }
    }

    pub fn slot_mut(&mut self, source: Source) -> &mut Option<Observation> {
        match source {
            Source::Storage => &mut self.storage,
            Source::LocalLog => &mut self.local_log,
            Source::RemoteLog => &mut self.remote_log,
        }
    }

    /// Every source in reconciliation order, present or not
    pub fn iter(&self) -> impl Iterator<Item = (Source, Option<&Observation>)> + '_ {
        Source::ALL.into_iter().map(move |source| (source, self.get(source)))
    }
}

/// Merged record for one submission key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub key: SubmissionKey,
    pub observations: Observations,
    /// File-store entry backing this record, set by the storage scanner
    pub local_path: Option<PathBuf>,
}

impl Submission {
    pub fn new(key: SubmissionKey) -> Self {
        Self {
            key,
            observations: Observations::default(),
            local_path: None,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.key.created_at()
    }

    pub fn task(&self) -> &str {
        self.key.task()
    }

    pub fn language(&self) -> &str {
        self.key.language()
    }

    pub fn observation(&self, source: Source) -> Option<&Observation> {
        self.observations.get(source)
    }

    /// Authoritative baseline observation
    pub fn storage(&self) -> Option<&Observation> {
        self.observations.storage.as_ref()
    }
}

/// All submission records of one contestant, ordered by key
#[derive(Debug, Default)]
pub struct Ledger {
    records: BTreeMap<SubmissionKey, Submission>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the record for `key`, creating an empty one on first sight
    pub fn upsert(&mut self, key: SubmissionKey) -> &mut Submission {
        self.records
            .entry(key)
            .or_insert_with_key(|key| Submission::new(key.clone()))
    }

    pub fn get(&self, key: &SubmissionKey) -> Option<&Submission> {
        self.records.get(key)
    }

    pub fn get_mut(&mut self, key: &SubmissionKey) -> Option<&mut Submission> {
        self.records.get_mut(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in key order
    pub fn iter(&self) -> impl Iterator<Item = &Submission> {
        self.records.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn key(raw: &str) -> SubmissionKey {
        SubmissionKey::parse(raw).unwrap()
    }

    fn at(secs: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, secs).unwrap()
    }

    #[test]
    fn test_upsert_creates_once() {
        let mut ledger = Ledger::new();
        let k = key("20240301100000-000000:sum:cpp");

        ledger.upsert(k.clone()).local_path = Some(PathBuf::from("/tmp/x"));
        let again = ledger.upsert(k.clone());

        assert_eq!(again.local_path, Some(PathBuf::from("/tmp/x")));
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.get(&k).unwrap().task(), "sum");
    }

    #[test]
    fn test_iter_is_sorted_by_key() {
        let mut ledger = Ledger::new();
        for raw in [
            "20240301100002-000000:b:py",
            "20240301100000-000000:c:py",
            "20240301100001-000000:a:py",
        ] {
            ledger.upsert(key(raw));
        }

        let order: Vec<&str> = ledger.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(
            order,
            vec![
                "20240301100000-000000:c:py",
                "20240301100001-000000:a:py",
                "20240301100002-000000:b:py",
            ]
        );
    }

    #[test]
    fn test_observation_slots_are_independent() {
        let mut record = Submission::new(key("20240301100000-000000:sum:cpp"));
        *record.observations.slot_mut(Source::LocalLog) =
            Some(Observation::new(at(1), Some("aa".to_string())));

        assert!(record.storage().is_none());
        assert!(record.observation(Source::LocalLog).is_some());
        assert!(record.observation(Source::RemoteLog).is_none());

        let present: Vec<Source> = record
            .observations
            .iter()
            .filter_map(|(source, obs)| obs.map(|_| source))
            .collect();
        assert_eq!(present, vec![Source::LocalLog]);
    }

    #[test]
    fn test_first_terminal_status_wins() {
        let mut obs = Observation::new(at(0), None);

        assert_eq!(obs.apply_status(SubmissionStatus::RecordedLocally), StatusUpdate::Applied);
        assert_eq!(obs.apply_status(SubmissionStatus::RecordedLocally), StatusUpdate::Unchanged);
        assert_eq!(
            obs.apply_status(SubmissionStatus::Submitted),
            StatusUpdate::Conflict {
                kept: SubmissionStatus::RecordedLocally
            }
        );
        assert_eq!(
            obs.apply_status(SubmissionStatus::Rejected),
            StatusUpdate::Conflict {
                kept: SubmissionStatus::RecordedLocally
            }
        );

        assert_eq!(obs.status, SubmissionStatus::RecordedLocally);
        assert_eq!(obs.conflicting_status, Some(SubmissionStatus::Submitted));
    }

    #[test]
    fn test_unknown_never_overwrites() {
        let mut obs = Observation::new(at(0), None).with_status(SubmissionStatus::Submitted);
        assert_eq!(obs.apply_status(SubmissionStatus::Unknown), StatusUpdate::Unchanged);
        assert_eq!(obs.status, SubmissionStatus::Submitted);
    }
}
