//! File-store scanner
//!
//! Flat directory of entries named `<key>` or `<key>.<suffix>`. Each entry's
//! content is hashed and its mtime becomes the observation timestamp.

use std::path::Path;

use subaudit_common::hash::content_hash;
use subaudit_common::time::from_system_time;
use subaudit_common::{Error as ContractError, Source, StoreEntryName};
use tracing::debug;
use walkdir::WalkDir;

use super::{ScanError, ScanSummary, ScanWarning, SourceScanner};
use crate::ledger::{Ledger, Observation, StatusUpdate};

/// Scanner for the local durable file store
#[derive(Debug, Default, Clone, Copy)]
pub struct StorageScanner;

impl StorageScanner {
    pub fn new() -> Self {
        Self
    }
}

impl SourceScanner for StorageScanner {
    fn source(&self) -> Source {
        Source::Storage
    }

    fn scan(&self, location: &Path, ledger: &mut Ledger) -> Result<ScanSummary, ScanError> {
        if !location.is_dir() {
            return Err(ScanError::SourceMissing {
                source_name: Source::Storage,
                path: location.to_path_buf(),
            });
        }

        let mut summary = ScanSummary::new(Source::Storage);
        let walker = WalkDir::new(location)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(ScanError::Unreadable {
                        source_name: Source::Storage,
                        path: location.to_path_buf(),
                        source: e.into(),
                    });
                }
                Err(e) => {
                    let name = e
                        .path()
                        .and_then(Path::file_name)
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    summary.warn(ScanWarning::UnreadableEntry {
                        name,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };
            let path = entry.path();

            let Some(name) = entry.file_name().to_str() else {
                summary.warn(ScanWarning::StrayEntry {
                    name: entry.file_name().to_string_lossy().into_owned(),
                    reason: "name is not valid UTF-8".to_string(),
                });
                continue;
            };
            if name.starts_with('.') {
                debug!(path = %path.display(), "Skipping hidden entry");
                continue;
            }
            if !entry.file_type().is_file() {
                summary.warn(ScanWarning::StrayEntry {
                    name: name.to_string(),
                    reason: "not a regular file".to_string(),
                });
                continue;
            }

            let parsed = match StoreEntryName::parse(name) {
                Ok(parsed) => parsed,
                Err(ContractError::UnknownSuffix { suffix, .. }) => {
                    return Err(ScanError::UnknownSuffix {
                        path: path.to_path_buf(),
                        suffix,
                    });
                }
                Err(e) => {
                    summary.warn(ScanWarning::StrayEntry {
                        name: name.to_string(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let read = entry
                .metadata()
                .map_err(|e| e.to_string())
                .and_then(|meta| meta.modified().map_err(|e| e.to_string()))
                .and_then(|modified| {
                    content_hash(path)
                        .map(|hash| (modified, hash))
                        .map_err(|e| e.to_string())
                });
            let (modified, hash) = match read {
                Ok(read) => read,
                Err(reason) => {
                    summary.warn(ScanWarning::UnreadableEntry {
                        name: name.to_string(),
                        reason,
                    });
                    continue;
                }
            };

            let record = ledger.upsert(parsed.key.clone());
            let slot = record.observations.slot_mut(Source::Storage);
            if let Some(existing) = slot.as_mut() {
                let update = existing.apply_status(parsed.status);
                summary.warn(ScanWarning::DuplicateEntry {
                    key: parsed.key.clone(),
                    name: name.to_string(),
                });
                if let StatusUpdate::Conflict { kept } = update {
                    summary.warn(ScanWarning::StatusConflict {
                        key: parsed.key,
                        kept,
                        ignored: parsed.status,
                    });
                }
                continue;
            }

            *slot = Some(
                Observation::new(from_system_time(modified), Some(hash)).with_status(parsed.status),
            );
            record.local_path = Some(path.to_path_buf());
            summary.applied += 1;

            debug!(key = %parsed.key, status = %parsed.status, "Storage entry recorded");
        }

        Ok(summary)
    }
}
