//! Daily sequencer: per-day counters that feed [`JobCode`](crate::JobCode).
//!
//! The sequencer itself is a pure function of the highest counter already
//! stored for a date. Making "read max, then insert" atomic is the store's
//! job (see `JobStore::reserve_and_insert` in `jobsheet-infra`).

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Positive per-day sequence number.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct DailyCounter(u32);

impl DailyCounter {
    /// First counter of a day.
    pub const FIRST: Self = Self(1);

    /// Returns `None` for zero.
    pub fn new(value: u32) -> Option<Self> {
        (value > 0).then_some(Self(value))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// `None` once the counter space for a day is used up.
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl core::fmt::Display for DailyCounter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl TryFrom<u32> for DailyCounter {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| "daily counter must be positive".to_string())
    }
}

impl From<DailyCounter> for u32 {
    fn from(value: DailyCounter) -> Self {
        value.0
    }
}

/// Counter to issue next, given the highest counter stored for the same date
/// (`0` when the date has no records yet).
pub fn next_daily_counter(max_stored: u32) -> DomainResult<DailyCounter> {
    max_stored
        .checked_add(1)
        .map(DailyCounter)
        .ok_or_else(|| DomainError::conflict("daily counter exhausted for this date"))
}
