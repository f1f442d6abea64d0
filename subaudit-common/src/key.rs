//! Submission keys
//!
//! A key is `YYYYMMDDhhmmss-uuuuuu:<task>:<language>`. The timestamp part is
//! fixed width, so lexical order of keys is chronological order. The key is
//! the only identity correlating the file store with both event logs.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, TimeZone, Timelike, Utc};

use crate::{Error, Result};

/// Separator between the key's three parts
pub const KEY_DELIMITER: char = ':';

const DATE_TIME_DIGITS: usize = 14;
const MICROS_DIGITS: usize = 6;
const DATE_TIME_FORMAT: &str = "%Y%m%d%H%M%S";

/// Stable composite identity of one submission attempt
#[derive(Debug, Clone)]
pub struct SubmissionKey {
    raw: String,
    created_at: DateTime<Utc>,
    task: String,
    language: String,
}

impl SubmissionKey {
    /// Build a key from its parts. Sub-microsecond precision is dropped.
    pub fn new(created_at: DateTime<Utc>, task: &str, language: &str) -> Result<Self> {
        let created_at = truncate_to_micros(created_at);
        let raw = format!(
            "{}{}{}{}{}",
            encode_timestamp(&created_at),
            KEY_DELIMITER,
            task,
            KEY_DELIMITER,
            language
        );
        validate_part(&raw, "task", task)?;
        validate_part(&raw, "language", language)?;

        Ok(Self {
            raw,
            created_at,
            task: task.to_string(),
            language: language.to_string(),
        })
    }

    /// Parse a key string, recovering all three parts
    pub fn parse(raw: &str) -> Result<Self> {
        let mut parts = raw.split(KEY_DELIMITER);
        let (Some(stamp), Some(task), Some(language), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(Error::invalid_key(raw, "expected exactly three ':'-separated parts"));
        };

        let created_at = decode_timestamp(raw, stamp)?;
        validate_part(raw, "task", task)?;
        validate_part(raw, "language", language)?;

        Ok(Self {
            raw: raw.to_string(),
            created_at,
            task: task.to_string(),
            language: language.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Nominal creation time decoded from the key
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    /// Language code (not the external compiler name)
    pub fn language(&self) -> &str {
        &self.language
    }
}

/// Encode a timestamp as the key's sortable `YYYYMMDDhhmmss-uuuuuu` prefix
pub fn encode_timestamp(at: &DateTime<Utc>) -> String {
    format!(
        "{}-{:0width$}",
        at.format(DATE_TIME_FORMAT),
        at.timestamp_subsec_micros(),
        width = MICROS_DIGITS
    )
}

fn decode_timestamp(raw: &str, stamp: &str) -> Result<DateTime<Utc>> {
    let Some((date_time, micros)) = stamp.split_once('-') else {
        return Err(Error::invalid_key(raw, "timestamp lacks '-' before microseconds"));
    };
    if date_time.len() != DATE_TIME_DIGITS || !date_time.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::invalid_key(raw, "date/time must be 14 digits"));
    }
    if micros.len() != MICROS_DIGITS || !micros.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::invalid_key(raw, "microseconds must be 6 digits"));
    }

    let micros: u32 = micros
        .parse()
        .map_err(|e| Error::invalid_key(raw, format!("microseconds: {}", e)))?;
    let naive = NaiveDateTime::parse_from_str(date_time, DATE_TIME_FORMAT)
        .map_err(|e| Error::invalid_key(raw, format!("date/time: {}", e)))?;
    // chrono accepts second 60 as a leap second; it cannot be re-encoded
    if naive.nanosecond() >= 1_000_000_000 {
        return Err(Error::invalid_key(raw, "leap second is not a valid key time"));
    }
    let naive = naive
        .with_nanosecond(micros * 1_000)
        .ok_or_else(|| Error::invalid_key(raw, "microseconds out of range"))?;

    Ok(Utc.from_utc_datetime(&naive))
}

fn validate_part(raw: &str, what: &str, part: &str) -> Result<()> {
    if part.is_empty() {
        return Err(Error::invalid_key(raw, format!("{} is empty", what)));
    }
    if let Some(bad) = part
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
    {
        return Err(Error::invalid_key(
            raw,
            format!("{} contains forbidden character {:?}", what, bad),
        ));
    }
    Ok(())
}

fn truncate_to_micros(at: DateTime<Utc>) -> DateTime<Utc> {
    let micros = at.timestamp_subsec_micros();
    at.with_nanosecond(micros * 1_000).unwrap_or(at)
}

impl fmt::Display for SubmissionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for SubmissionKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl PartialEq for SubmissionKey {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for SubmissionKey {}

impl Hash for SubmissionKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl PartialOrd for SubmissionKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SubmissionKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw.cmp(&other.raw)
    }
}
