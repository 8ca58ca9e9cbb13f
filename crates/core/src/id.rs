//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::sequencer::DailyCounter;

/// Store-assigned row identifier of a persisted jobsheet.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(i64);

impl JobId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl core::fmt::Display for JobId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Public jobsheet code, `YYYYMMDD-NNN`.
///
/// The code is a pure function of the intake date and the daily counter, so
/// two distinct `(date, counter)` pairs never produce the same code.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JobCode(String);

impl JobCode {
    /// Build the code for `counter` on `date`.
    ///
    /// The counter is zero-padded to three digits; larger counters widen the
    /// field rather than wrapping.
    pub fn generate(date: NaiveDate, counter: DailyCounter) -> Self {
        Self(format!("{}-{:03}", date.format("%Y%m%d"), counter.get()))
    }

    /// Parse a code previously produced by [`JobCode::generate`].
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let (date_part, counter_part) = s
            .split_once('-')
            .ok_or_else(|| DomainError::invalid_code(format!("{s:?}: missing '-'")))?;

        if date_part.len() != 8 || !date_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::invalid_code(format!("{s:?}: date must be YYYYMMDD")));
        }
        let date = NaiveDate::parse_from_str(date_part, "%Y%m%d")
            .map_err(|e| DomainError::invalid_code(format!("{s:?}: {e}")))?;

        if counter_part.len() < 3 || !counter_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::invalid_code(format!(
                "{s:?}: counter must be at least three digits"
            )));
        }
        let counter: u32 = counter_part
            .parse()
            .map_err(|e| DomainError::invalid_code(format!("{s:?}: {e}")))?;
        let counter = DailyCounter::new(counter)
            .ok_or_else(|| DomainError::invalid_code(format!("{s:?}: counter must be positive")))?;

        // Reject non-canonical spellings such as "20240115-0007".
        let canonical = Self::generate(date, counter);
        if canonical.0 != s {
            return Err(DomainError::invalid_code(format!("{s:?}: not canonical")));
        }
        Ok(canonical)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for JobCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for JobCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for JobCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<JobCode> for String {
    fn from(value: JobCode) -> Self {
        value.0
    }
}
