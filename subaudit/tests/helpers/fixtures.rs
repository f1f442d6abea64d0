//! On-disk contestant fixtures
//!
//! Writes store entries and log lines through the shared contract types, the
//! same way the submission client produces them.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Duration, Utc};
use subaudit::config::LayoutConfig;
use subaudit_common::log_line::DEFAULT_TAG;
use subaudit_common::{LogEvent, LogMessage, Source, StoreEntryName, SubmissionKey, SubmissionStatus};

/// Creation time of `key` shifted by `offset_ms`
pub fn created_at(key: &str, offset_ms: i64) -> DateTime<Utc> {
    SubmissionKey::parse(key).unwrap().created_at() + Duration::milliseconds(offset_ms)
}

/// One contestant directory under a test source root
pub struct ContestantFixture {
    pub dir: PathBuf,
    layout: LayoutConfig,
}

impl ContestantFixture {
    pub fn new(root: &Path, contestant: &str) -> Self {
        let dir = root.join(contestant);
        fs::create_dir_all(&dir).unwrap();
        Self {
            dir,
            layout: LayoutConfig::default(),
        }
    }

    pub fn storage_dir(&self) -> PathBuf {
        self.dir.join(&self.layout.storage_dir)
    }

    pub fn log_path(&self, source: Source) -> PathBuf {
        match source {
            Source::Storage => panic!("storage is not a log"),
            Source::LocalLog => self.dir.join(&self.layout.local_log),
            Source::RemoteLog => self.dir.join(&self.layout.remote_log),
        }
    }

    /// Write a file-store entry whose mtime is `modified`
    pub fn store_entry(
        &self,
        key: &str,
        status: SubmissionStatus,
        content: &[u8],
        modified: DateTime<Utc>,
    ) -> PathBuf {
        let name = StoreEntryName::new(SubmissionKey::parse(key).unwrap(), status);
        self.raw_store_entry(&name.file_name(), content, modified)
    }

    pub fn raw_store_entry(&self, name: &str, content: &[u8], modified: DateTime<Utc>) -> PathBuf {
        fs::create_dir_all(self.storage_dir()).unwrap();
        let path = self.storage_dir().join(name);
        fs::write(&path, content).unwrap();
        File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(SystemTime::from(modified))
            .unwrap();
        path
    }

    /// Append a submission event to a log
    pub fn log_event(&self, source: Source, key: &str, at: DateTime<Utc>, message: LogMessage) {
        let event = LogEvent {
            timestamp: at,
            tag: DEFAULT_TAG.to_string(),
            key: SubmissionKey::parse(key).unwrap(),
            message,
        };
        self.raw_log_line(source, &event.to_line());
    }

    pub fn raw_log_line(&self, source: Source, line: &str) {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.log_path(source))
            .unwrap();
        writeln!(file, "{}", line).unwrap();
    }

    /// Full trail in one log: hash event, then the follow-up for `status`
    pub fn log_trail(
        &self,
        source: Source,
        key: &str,
        hash: &str,
        status: SubmissionStatus,
        at: DateTime<Utc>,
    ) {
        self.log_event(source, key, at, LogMessage::Hash(hash.to_string()));
        let follow_up = match status {
            SubmissionStatus::Unknown => return,
            SubmissionStatus::Submitted => LogMessage::Submitted,
            SubmissionStatus::Rejected => LogMessage::Rejected {
                detail: "invalid token".to_string(),
            },
            SubmissionStatus::RecordedLocally => LogMessage::RecordedLocally,
        };
        self.log_event(source, key, at + Duration::milliseconds(100), follow_up);
    }
}
