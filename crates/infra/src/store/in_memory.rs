use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, NaiveDate, Utc};

use jobsheet_core::{
    next_daily_counter, IntakeForm, JobCode, JobId, JobRecord, NewJobRecord, SearchFilter,
};

use super::{JobStore, StoreError};

/// In-memory job store for tests/dev.
///
/// A single write lock covers counter reservation and insertion.
#[derive(Debug, Default)]
pub struct InMemoryJobStore {
    records: RwLock<Vec<JobRecord>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<JobRecord>>, StoreError> {
        self.records
            .read()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<JobRecord>>, StoreError> {
        self.records
            .write()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))
    }

    fn max_counter(records: &[JobRecord], date: NaiveDate) -> u32 {
        records
            .iter()
            .filter(|r| r.date == date)
            .map(|r| r.daily_counter.get())
            .max()
            .unwrap_or(0)
    }

    fn push(records: &mut Vec<JobRecord>, record: NewJobRecord) -> Result<JobRecord, StoreError> {
        if let Some(existing) = records
            .iter()
            .find(|r| r.code == record.code || (r.date == record.date && r.daily_counter == record.daily_counter))
        {
            return Err(StoreError::Conflict(format!(
                "jobsheet {} already exists",
                existing.code
            )));
        }
        let row_id = JobId::new(records.len() as i64 + 1);
        let stored = record.into_record(row_id);
        records.push(stored.clone());
        Ok(stored)
    }
}

#[async_trait::async_trait]
impl JobStore for InMemoryJobStore {
    async fn insert(&self, record: NewJobRecord) -> Result<JobId, StoreError> {
        let mut records = self.write()?;
        Self::push(&mut records, record).map(|r| r.row_id)
    }

    async fn max_counter_for_date(&self, date: NaiveDate) -> Result<u32, StoreError> {
        Ok(Self::max_counter(&self.read()?, date))
    }

    async fn reserve_and_insert(
        &self,
        date: NaiveDate,
        form: IntakeForm,
        created_at: DateTime<Utc>,
    ) -> Result<JobRecord, StoreError> {
        let mut records = self.write()?;
        let counter = next_daily_counter(Self::max_counter(&records, date))
            .map_err(|e| StoreError::Conflict(e.to_string()))?;
        Self::push(&mut records, NewJobRecord::sequenced(form, date, counter, created_at))
    }

    async fn get_by_code(&self, code: &JobCode) -> Result<Option<JobRecord>, StoreError> {
        Ok(self.read()?.iter().find(|r| &r.code == code).cloned())
    }

    async fn query(&self, filter: &SearchFilter) -> Result<Vec<JobRecord>, StoreError> {
        let mut matched: Vec<JobRecord> = self
            .read()?
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.row_id.cmp(&a.row_id)));
        Ok(matched)
    }
}
