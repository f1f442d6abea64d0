//! Configuration for the auditor
//!
//! An optional TOML file; every field has a built-in default, so an empty
//! file (or no file at all) yields the stock layout and thresholds.
//!
//! # Resolution priority
//!
//! 1. `SUBAUDIT_CONFIG` environment variable (must point to a valid file)
//! 2. `<user config dir>/subaudit/config.toml`
//! 3. Built-in defaults
//!
//! ```toml
//! log_tag = "submit"
//! import_command = "import-submission"
//!
//! [layout]
//! storage_dir = "files"
//! local_log = "local.log"
//! remote_log = "remote.log"
//!
//! [thresholds]
//! storage_drift_secs = 5
//! source_drift_secs = 60
//!
//! [languages]
//! kt = "Kotlin / JVM"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{AuditError, Result};

/// Environment variable naming an explicit configuration file
pub const CONFIG_ENV_VAR: &str = "SUBAUDIT_CONFIG";

/// Top-level auditor configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AuditConfig {
    /// Per-contestant directory layout
    pub layout: LayoutConfig,
    /// Timestamp drift thresholds
    pub thresholds: DriftThresholds,
    /// Tag identifying submission events in the logs
    pub log_tag: String,
    /// Command emitted for corrective imports
    pub import_command: String,
    /// Language code → external name understood by the import command.
    /// Entries from the file are merged over the built-in table.
    pub languages: BTreeMap<String, String>,
}

/// Names of the three sources inside a contestant directory
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LayoutConfig {
    pub storage_dir: String,
    pub local_log: String,
    pub remote_log: String,
}

/// Inclusive drift thresholds in whole seconds
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DriftThresholds {
    /// File-store timestamp vs. submission time
    pub storage_drift_secs: u32,
    /// Any source's timestamp vs. submission time
    pub source_drift_secs: u32,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            thresholds: DriftThresholds::default(),
            log_tag: subaudit_common::log_line::DEFAULT_TAG.to_string(),
            import_command: "import-submission".to_string(),
            languages: default_languages(),
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            storage_dir: "files".to_string(),
            local_log: "local.log".to_string(),
            remote_log: "remote.log".to_string(),
        }
    }
}

impl Default for DriftThresholds {
    fn default() -> Self {
        Self {
            storage_drift_secs: 5,
            source_drift_secs: 60,
        }
    }
}

fn default_languages() -> BTreeMap<String, String> {
    [
        ("c", "C11 / gcc"),
        ("cpp", "C++17 / g++"),
        ("java", "Java / JDK"),
        ("pas", "Pascal / fpc"),
        ("py", "Python 3 / CPython"),
        ("rs", "Rust"),
    ]
    .into_iter()
    .map(|(code, name)| (code.to_string(), name.to_string()))
    .collect()
}

impl AuditConfig {
    /// Parse and validate configuration text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: AuditConfig = toml::from_str(content)
            .map_err(|e| AuditError::Config(format!("Invalid TOML: {}", e)))?;

        let mut languages = default_languages();
        languages.append(&mut config.languages);
        config.languages = languages;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AuditError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// External name of a language code, if configured
    pub fn language_name(&self, code: &str) -> Option<&str> {
        self.languages.get(code).map(String::as_str)
    }

    fn validate(&self) -> Result<()> {
        if self.log_tag.is_empty() || self.log_tag.contains(": ") || self.log_tag.contains(' ') {
            return Err(AuditError::Config(format!(
                "log_tag '{}' must be non-empty and contain no spaces",
                self.log_tag
            )));
        }
        if self.import_command.trim().is_empty() {
            return Err(AuditError::Config("import_command must not be empty".to_string()));
        }
        for (what, name) in [
            ("layout.storage_dir", &self.layout.storage_dir),
            ("layout.local_log", &self.layout.local_log),
            ("layout.remote_log", &self.layout.remote_log),
        ] {
            if name.is_empty() {
                return Err(AuditError::Config(format!("{} must not be empty", what)));
            }
        }
        Ok(())
    }
}

/// Default per-user configuration file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("subaudit").join("config.toml"))
}

/// Resolve configuration following the documented priority order
pub fn resolve_config() -> Result<AuditConfig> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        let path = PathBuf::from(path);
        info!("Loading configuration from {} ({})", path.display(), CONFIG_ENV_VAR);
        return AuditConfig::load(&path);
    }

    resolve_from_default_location(default_config_path().as_deref())
}

/// Load the default file if present. A broken default file degrades to
/// built-in defaults with a warning instead of aborting.
pub fn resolve_from_default_location(path: Option<&Path>) -> Result<AuditConfig> {
    match path {
        Some(path) if path.exists() => match AuditConfig::load(path) {
            Ok(config) => {
                info!("Loaded configuration from {}", path.display());
                Ok(config)
            }
            Err(e) => {
                warn!("Ignoring {}: {}; using built-in defaults", path.display(), e);
                Ok(AuditConfig::default())
            }
        },
        _ => {
            info!("No configuration file found, using built-in defaults");
            Ok(AuditConfig::default())
        }
    }
}
