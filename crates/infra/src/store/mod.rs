//! Jobsheet persistence.
//!
//! Records are append-only: there is no update or delete.

mod in_memory;
mod sqlite;

pub use in_memory::InMemoryJobStore;
pub use sqlite::SqliteJobStore;

use chrono::{DateTime, NaiveDate, Utc};

use jobsheet_core::{IntakeForm, JobCode, JobId, JobRecord, NewJobRecord, SearchFilter};

/// Record store abstraction.
#[async_trait::async_trait]
pub trait JobStore: Send + Sync {
    /// Insert an already-sequenced record.
    ///
    /// Fails with [`StoreError::Conflict`] if its code or `(date, counter)` is taken.
    async fn insert(&self, record: NewJobRecord) -> Result<JobId, StoreError>;

    /// Highest daily counter stored for `date`, or `0`.
    async fn max_counter_for_date(&self, date: NaiveDate) -> Result<u32, StoreError>;

    /// Atomically take the next counter for `date` and insert the record.
    ///
    /// This is the only path intake uses; concurrent callers never observe
    /// the same counter.
    async fn reserve_and_insert(
        &self,
        date: NaiveDate,
        form: IntakeForm,
        created_at: DateTime<Utc>,
    ) -> Result<JobRecord, StoreError>;

    async fn get_by_code(&self, code: &JobCode) -> Result<Option<JobRecord>, StoreError>;

    /// Records matching `filter`, newest `created_at` first (ties: newest id first).
    async fn query(&self, filter: &SearchFilter) -> Result<Vec<JobRecord>, StoreError>;
}

/// Store error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// Busy, locked, or not reachable. The operation was not applied.
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("conflict: {0}")]
    Conflict(String),
    /// A persisted row could not be decoded.
    #[error("corrupt record: {0}")]
    Corrupt(String),
    #[error("storage error: {0}")]
    Storage(String),
}
