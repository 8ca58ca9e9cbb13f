//! Shop-local time.
//!
//! The daily counter resets on the shop's calendar date, which is computed
//! from an explicit UTC offset rather than the host timezone.

use std::sync::Mutex;

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};

use crate::error::DomainError;

/// Source of "now".
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut guard = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *guard += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// The shop's fixed UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShopTimezone(FixedOffset);

impl ShopTimezone {
    pub fn utc() -> Self {
        Self(Utc.fix())
    }

    pub fn from_offset(offset: FixedOffset) -> Self {
        Self(offset)
    }

    /// Parse `+HH:MM` / `-HH:MM` (also `Z`).
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
            return Ok(Self::utc());
        }
        s.parse::<FixedOffset>()
            .map(Self)
            .map_err(|_| DomainError::validation(format!("invalid UTC offset {s:?}; expected +HH:MM")))
    }

    pub fn offset(&self) -> FixedOffset {
        self.0
    }

    /// Calendar date at the shop for a UTC instant.
    pub fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.0).date_naive()
    }

    /// `YYYY-MM-DD HH:MM:SS` at the shop.
    pub fn format_local(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.0).format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

impl Default for ShopTimezone {
    fn default() -> Self {
        Self::utc()
    }
}

impl core::fmt::Display for ShopTimezone {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}
