//! `jobsheet-core`: domain foundation for device intake.
//!
//! This crate contains **pure domain** code (no infrastructure concerns):
//! the jobsheet record, the daily sequencer that names it, the search filter
//! and the shop clock.

pub mod clock;
pub mod error;
pub mod id;
pub mod jobsheet;
pub mod search;
pub mod sequencer;

pub use clock::{Clock, FixedClock, ShopTimezone, SystemClock};
pub use error::{DomainError, DomainResult};
pub use id::{JobCode, JobId};
pub use jobsheet::{IntakeForm, JobRecord, NewJobRecord};
pub use search::{normalize_phone, SearchFilter};
pub use sequencer::{next_daily_counter, DailyCounter};
