//! Contestant orchestrator
//!
//! Per contestant: fresh [`Ledger`], scanners in order storage → local log →
//! remote log (storage first so it sets the baseline), then checker and
//! resolver over every record in key order. Contestants never share state.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use subaudit_common::{Source, SubmissionKey};
use tracing::{debug, info, warn};

use crate::checker::{Anomaly, ConsistencyChecker};
use crate::config::AuditConfig;
use crate::error::{AuditError, Result};
use crate::ledger::Ledger;
use crate::resolver::{ActionResolver, Resolution};
use crate::scanner::{LogScanner, ScanSummary, SourceScanner, StorageScanner};

/// Audit outcome of one submission
#[derive(Debug, Clone)]
pub struct RecordReport {
    pub key: SubmissionKey,
    pub anomalies: Vec<Anomaly>,
    pub resolution: Resolution,
}

/// Audit outcome of one contestant
#[derive(Debug, Clone)]
pub struct ContestantReport {
    pub contestant: String,
    /// Scans that found their source
    pub scans: Vec<ScanSummary>,
    /// Sources whose file or directory was absent or unreadable
    pub missing_sources: Vec<Source>,
    /// Records in key order
    pub records: Vec<RecordReport>,
}

impl ContestantReport {
    pub fn record(&self, key: &str) -> Option<&RecordReport> {
        self.records.iter().find(|r| r.key.as_str() == key)
    }
}

/// Totals over a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub contestants: usize,
    pub submissions: usize,
    /// Submissions with at least one anomaly
    pub anomalous_submissions: usize,
    pub anomalies: usize,
    pub imports: usize,
    /// Imports flagged for manual review
    pub imports_for_review: usize,
}

impl RunSummary {
    fn add(&mut self, report: &ContestantReport) {
        self.contestants += 1;
        for record in &report.records {
            self.submissions += 1;
            self.anomalies += record.anomalies.len();
            if !record.anomalies.is_empty() {
                self.anomalous_submissions += 1;
            }
            if let Some(instruction) = record.resolution.instruction() {
                self.imports += 1;
                if instruction.needs_review() {
                    self.imports_for_review += 1;
                }
            }
        }
    }

    pub fn display_string(&self) -> String {
        format!(
            "{} contestants, {} submissions, {} with anomalies ({} anomalies), {} imports ({} for review)",
            self.contestants,
            self.submissions,
            self.anomalous_submissions,
            self.anomalies,
            self.imports,
            self.imports_for_review
        )
    }
}

/// Drives the reconciliation of one contestant at a time
pub struct ContestantOrchestrator<'a> {
    config: &'a AuditConfig,
    checker: ConsistencyChecker,
    resolver: ActionResolver<'a>,
}

impl<'a> ContestantOrchestrator<'a> {
    pub fn new(config: &'a AuditConfig) -> Self {
        Self {
            config,
            checker: ConsistencyChecker::new(&config.thresholds),
            resolver: ActionResolver::new(config),
        }
    }

    /// Audit the contestant whose data lives in `dir`
    pub fn audit(&self, contestant: &str, dir: &Path) -> Result<ContestantReport> {
        info!(contestant, "Auditing contestant");

        let layout = &self.config.layout;
        let storage = StorageScanner::new();
        let local_log = LogScanner::new(Source::LocalLog, self.config.log_tag.as_str());
        let remote_log = LogScanner::new(Source::RemoteLog, self.config.log_tag.as_str());
        let scanners: [(&dyn SourceScanner, PathBuf); 3] = [
            (&storage, dir.join(&layout.storage_dir)),
            (&local_log, dir.join(&layout.local_log)),
            (&remote_log, dir.join(&layout.remote_log)),
        ];

        let mut ledger = Ledger::new();
        let mut scans = Vec::new();
        let mut missing_sources = Vec::new();

        for (scanner, location) in scanners {
            match scanner.scan(&location, &mut ledger) {
                Ok(summary) => {
                    debug!(
                        contestant,
                        source = %summary.source,
                        applied = summary.applied,
                        warnings = summary.warnings.len(),
                        "Source scanned"
                    );
                    scans.push(summary);
                }
                Err(e) if !e.is_fatal() => {
                    warn!(contestant, "{}", e);
                    missing_sources.push(scanner.source());
                }
                Err(e) => {
                    return Err(AuditError::Scan {
                        contestant: contestant.to_string(),
                        source: e,
                    });
                }
            }
        }

        let records = ledger
            .iter()
            .map(|record| {
                let anomalies = self.checker.check(record);
                for anomaly in &anomalies {
                    warn!(contestant, key = %record.key, "{}", anomaly);
                }

                let resolution = self.resolver.resolve(contestant, record, &anomalies);
                if resolution.instruction().is_some() {
                    info!(contestant, key = %record.key, "{}", resolution.justification);
                } else {
                    debug!(contestant, key = %record.key, "{}", resolution.justification);
                }

                RecordReport {
                    key: record.key.clone(),
                    anomalies,
                    resolution,
                }
            })
            .collect();

        Ok(ContestantReport {
            contestant: contestant.to_string(),
            scans,
            missing_sources,
            records,
        })
    }
}

/// Audit every contestant under `source_dir` (or only `only`), writing one
/// import instruction line per corrective action to `out`
pub fn run_audit<W: Write>(
    config: &AuditConfig,
    source_dir: &Path,
    only: Option<&str>,
    out: &mut W,
) -> Result<RunSummary> {
    let contestants = list_contestants(source_dir)?;
    let selected: Vec<&(String, PathBuf)> = match only {
        Some(name) => {
            let found: Vec<_> = contestants.iter().filter(|(c, _)| c == name).collect();
            if found.is_empty() {
                return Err(AuditError::UnknownContestant(name.to_string()));
            }
            found
        }
        None => contestants.iter().collect(),
    };

    let orchestrator = ContestantOrchestrator::new(config);
    let mut summary = RunSummary::default();

    for (contestant, dir) in selected {
        let report = orchestrator.audit(contestant, dir)?;
        for record in &report.records {
            if let Some(instruction) = record.resolution.instruction() {
                writeln!(out, "{}", instruction)?;
            }
        }
        summary.add(&report);
    }
    out.flush()?;

    info!("Audit complete: {}", summary.display_string());
    Ok(summary)
}

/// Contestant directories under `source_dir`, sorted by name
pub fn list_contestants(source_dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    if !source_dir.is_dir() {
        return Err(AuditError::SourceDirMissing(source_dir.to_path_buf()));
    }

    let mut contestants = Vec::new();
    for entry in fs::read_dir(source_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) if !name.starts_with('.') => contestants.push((name, entry.path())),
            Ok(_) => {}
            Err(name) => warn!("Skipping contestant directory with non UTF-8 name {:?}", name),
        }
    }
    contestants.sort();

    Ok(contestants)
}
