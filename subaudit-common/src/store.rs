//! File-store entry naming
//!
//! An entry is named after its submission key. Once the outcome is known the
//! submission client renames it to `<key>.<suffix>` (see
//! [`SubmissionStatus::suffix`]); an unsuffixed entry is still in flight.

use std::fmt;

use crate::{Error, Result, SubmissionKey, SubmissionStatus};

/// Parsed name of one file-store entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEntryName {
    pub key: SubmissionKey,
    pub status: SubmissionStatus,
}

impl StoreEntryName {
    pub fn new(key: SubmissionKey, status: SubmissionStatus) -> Self {
        Self { key, status }
    }

    /// Parse an entry name.
    ///
    /// The key part is validated first, so a stray file yields
    /// [`Error::InvalidKey`]. A valid key with a suffix that names no status
    /// yields [`Error::UnknownSuffix`].
    pub fn parse(name: &str) -> Result<Self> {
        let (key_part, suffix) = match name.split_once('.') {
            Some((key_part, suffix)) => (key_part, Some(suffix)),
            None => (name, None),
        };

        let key = SubmissionKey::parse(key_part)?;
        let status = match suffix {
            None => SubmissionStatus::Unknown,
            Some(token) => {
                SubmissionStatus::from_suffix(token).ok_or_else(|| Error::UnknownSuffix {
                    name: name.to_string(),
                    suffix: token.to_string(),
                })?
            }
        };

        Ok(Self { key, status })
    }

    pub fn file_name(&self) -> String {
        match self.status.suffix() {
            Some(suffix) => format!("{}.{}", self.key, suffix),
            None => self.key.to_string(),
        }
    }
}

impl fmt::Display for StoreEntryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}
