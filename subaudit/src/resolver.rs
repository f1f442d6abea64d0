//! Action resolver
//!
//! Decides, from the storage status alone, whether a submission has to be
//! replayed against the contest server. Only `recorded locally` submissions
//! qualify; anomalies never suppress the action, they only mark it for
//! manual review.

use std::borrow::Cow;
use std::fmt;
use std::path::PathBuf;

use subaudit_common::SubmissionStatus;
use tracing::warn;

use crate::checker::Anomaly;
use crate::config::AuditConfig;
use crate::ledger::Submission;

/// Parameters for the external import command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportInstruction {
    pub command: String,
    pub contestant: String,
    pub task: String,
    /// External language name understood by the import command
    pub language: String,
    pub path: PathBuf,
    /// Number of anomalies on the record; non-zero means manual review
    pub anomaly_count: usize,
}

impl ImportInstruction {
    pub fn needs_review(&self) -> bool {
        self.anomaly_count > 0
    }
}

impl fmt::Display for ImportInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.needs_review() {
            let noun = if self.anomaly_count == 1 { "anomaly" } else { "anomalies" };
            write!(f, "# REVIEW ({} {}): ", self.anomaly_count, noun)?;
        }
        write!(
            f,
            "{} --contestant {} --task {} --language {} {}",
            self.command,
            quote_arg(&self.contestant),
            quote_arg(&self.task),
            quote_arg(&self.language),
            quote_arg(&self.path.to_string_lossy())
        )
    }
}

/// Quote one argument for a POSIX shell; plain words pass through unchanged
fn quote_arg(arg: &str) -> Cow<'_, str> {
    shell_escape::escape(Cow::Borrowed(arg))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    NoAction,
    Import(ImportInstruction),
}

/// Decision for one record plus the reason behind it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub action: Action,
    pub justification: String,
}

impl Resolution {
    fn no_action(justification: impl Into<String>) -> Self {
        Self {
            action: Action::NoAction,
            justification: justification.into(),
        }
    }

    pub fn instruction(&self) -> Option<&ImportInstruction> {
        match &self.action {
            Action::Import(instruction) => Some(instruction),
            Action::NoAction => None,
        }
    }
}

/// Maps checked records to corrective actions
#[derive(Debug, Clone)]
pub struct ActionResolver<'a> {
    config: &'a AuditConfig,
}

impl<'a> ActionResolver<'a> {
    pub fn new(config: &'a AuditConfig) -> Self {
        Self { config }
    }

    pub fn resolve(&self, contestant: &str, record: &Submission, anomalies: &[Anomaly]) -> Resolution {
        let Some(storage) = record.storage() else {
            return Resolution::no_action("not in local storage, nothing to recover");
        };

        match storage.status {
            SubmissionStatus::Submitted => Resolution::no_action("already submitted to server"),
            SubmissionStatus::Rejected => Resolution::no_action("rejected by server, already handled"),
            SubmissionStatus::Unknown => {
                Resolution::no_action("outcome unknown, too incomplete to act on")
            }
            SubmissionStatus::RecordedLocally => {
                let Some(path) = record.local_path.clone() else {
                    return Resolution::no_action("storage entry has no file path");
                };
                let instruction = ImportInstruction {
                    command: self.config.import_command.clone(),
                    contestant: contestant.to_string(),
                    task: record.task().to_string(),
                    language: self.language_name(record.language()),
                    path,
                    anomaly_count: anomalies.len(),
                };
                let justification = if instruction.needs_review() {
                    format!(
                        "recorded locally only, import required; {} anomalies need manual review",
                        anomalies.len()
                    )
                } else {
                    "recorded locally only, import required".to_string()
                };

                Resolution {
                    action: Action::Import(instruction),
                    justification,
                }
            }
        }
    }

    fn language_name(&self, code: &str) -> String {
        match self.config.language_name(code) {
            Some(name) => name.to_string(),
            None => {
                warn!(language = code, "No external name configured for language, using the code");
                code.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Observation;
    use subaudit_common::{Source, SubmissionKey};

    const KEY: &str = "20240301100000-000000:sum:cpp";

    fn record_with(status: Option<SubmissionStatus>) -> Submission {
        let key = SubmissionKey::parse(KEY).unwrap();
        let mut record = Submission::new(key.clone());
        if let Some(status) = status {
            record.observations.storage =
                Some(Observation::new(key.created_at(), Some("ab".to_string())).with_status(status));
            record.local_path = Some(PathBuf::from(format!("/data/alice/files/{}.local", KEY)));
        }
        record
    }

    #[test]
    fn test_recorded_locally_emits_import() {
        let config = AuditConfig::default();
        let resolution =
            ActionResolver::new(&config).resolve("alice", &record_with(Some(SubmissionStatus::RecordedLocally)), &[]);

        let instruction = resolution.instruction().unwrap();
        assert!(!instruction.needs_review());
        assert_eq!(instruction.language, "C++17 / g++");
        assert_eq!(
            instruction.to_string(),
            format!(
                "import-submission --contestant alice --task sum --language 'C++17 / g++' '/data/alice/files/{}.local'",
                KEY
            )
        );
    }

    #[test]
    fn test_anomalies_mark_import_for_review() {
        let config = AuditConfig::default();
        let anomalies = vec![Anomaly::Missing {
            source: Source::RemoteLog,
        }];
        let resolution = ActionResolver::new(&config).resolve(
            "alice",
            &record_with(Some(SubmissionStatus::RecordedLocally)),
            &anomalies,
        );

        let instruction = resolution.instruction().unwrap();
        assert!(instruction.needs_review());
        assert!(instruction.to_string().starts_with("# REVIEW (1 anomaly): import-submission"));
        assert!(resolution.justification.contains("manual review"));
    }

    #[test]
    fn test_review_prefix_counts_anomalies() {
        let config = AuditConfig::default();
        let anomalies = vec![
            Anomaly::Missing {
                source: Source::LocalLog,
            },
            Anomaly::Missing {
                source: Source::RemoteLog,
            },
        ];
        let resolution = ActionResolver::new(&config).resolve(
            "alice",
            &record_with(Some(SubmissionStatus::RecordedLocally)),
            &anomalies,
        );
        assert!(resolution
            .instruction()
            .unwrap()
            .to_string()
            .starts_with("# REVIEW (2 anomalies): "));
    }

    #[test]
    fn test_arguments_with_spaces_and_quotes_stay_single_words() {
        let config = AuditConfig::default();
        let mut record = record_with(Some(SubmissionStatus::RecordedLocally));
        record.local_path = Some(PathBuf::from("/data/team alpha/files/sum.local"));

        let resolution = ActionResolver::new(&config).resolve("team alpha", &record, &[]);
        assert_eq!(
            resolution.instruction().unwrap().to_string(),
            "import-submission --contestant 'team alpha' --task sum --language 'C++17 / g++' '/data/team alpha/files/sum.local'"
        );

        let resolution = ActionResolver::new(&config).resolve("o'neil", &record, &[]);
        assert!(resolution
            .instruction()
            .unwrap()
            .to_string()
            .contains("--contestant 'o'\\''neil' --task"));
    }

    #[test]
    fn test_other_statuses_never_act() {
        let config = AuditConfig::default();
        let resolver = ActionResolver::new(&config);
        let anomalies = vec![Anomaly::Incomplete];

        for status in [
            SubmissionStatus::Submitted,
            SubmissionStatus::Rejected,
            SubmissionStatus::Unknown,
        ] {
            let resolution = resolver.resolve("alice", &record_with(Some(status)), &anomalies);
            assert_eq!(resolution.action, Action::NoAction, "status {}", status);
        }
    }

    #[test]
    fn test_missing_storage_never_acts() {
        let config = AuditConfig::default();
        let resolution = ActionResolver::new(&config).resolve(
            "alice",
            &record_with(None),
            &[Anomaly::OnlyInLogs],
        );
        assert_eq!(resolution.action, Action::NoAction);
    }

    #[test]
    fn test_unmapped_language_falls_back_to_code() {
        let mut config = AuditConfig::default();
        config.languages.remove("cpp");
        let resolution = ActionResolver::new(&config).resolve(
            "alice",
            &record_with(Some(SubmissionStatus::RecordedLocally)),
            &[],
        );
        assert_eq!(resolution.instruction().unwrap().language, "cpp");
    }
}
