//! # subaudit Common Library
//!
//! The contract shared by the submission client and the auditor:
//! - Submission keys (timestamp, task, language)
//! - Outcome status and its file-store suffixes
//! - Source identities
//! - File-store entry naming
//! - Event log line format
//! - Content hashing and timestamp helpers

pub mod error;
pub mod hash;
pub mod key;
pub mod log_line;
pub mod source;
pub mod status;
pub mod store;
pub mod time;

pub use error::{Error, Result};
pub use key::SubmissionKey;
pub use log_line::{LogEvent, LogMessage};
pub use source::Source;
pub use status::SubmissionStatus;
pub use store::StoreEntryName;
