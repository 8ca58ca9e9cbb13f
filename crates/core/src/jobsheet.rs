//! The jobsheet: one customer device intake.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::id::{JobCode, JobId};
use crate::sequencer::DailyCounter;

/// Raw intake details as supplied by the front desk.
///
/// Fields are free text. Only presence is checked; values are stored as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeForm {
    pub customer_name: String,
    pub phone: String,
    pub model: String,
    pub serial: String,
    #[serde(default)]
    pub symptom: String,
}

impl IntakeForm {
    /// Check that every required field is present (non-blank).
    ///
    /// `symptom` is optional; receipts show `-` for it when blank.
    pub fn validate(&self) -> DomainResult<()> {
        let missing: Vec<&str> = [
            ("customer_name", &self.customer_name),
            ("phone", &self.phone),
            ("model", &self.model),
            ("serial", &self.serial),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(DomainError::validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )))
        }
    }
}

/// A fully-sequenced jobsheet that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewJobRecord {
    pub code: JobCode,
    pub date: NaiveDate,
    pub daily_counter: DailyCounter,
    pub customer_name: String,
    pub phone: String,
    pub model: String,
    pub serial: String,
    pub symptom: String,
    pub created_at: DateTime<Utc>,
}

impl NewJobRecord {
    /// Sequence an intake form: the code is derived from `(date, counter)`.
    pub fn sequenced(
        form: IntakeForm,
        date: NaiveDate,
        daily_counter: DailyCounter,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            code: JobCode::generate(date, daily_counter),
            date,
            daily_counter,
            customer_name: form.customer_name,
            phone: form.phone,
            model: form.model,
            serial: form.serial,
            symptom: form.symptom,
            created_at,
        }
    }

    /// Attach the store-assigned id.
    pub fn into_record(self, row_id: JobId) -> JobRecord {
        JobRecord {
            row_id,
            code: self.code,
            date: self.date,
            daily_counter: self.daily_counter,
            customer_name: self.customer_name,
            phone: self.phone,
            model: self.model,
            serial: self.serial,
            symptom: self.symptom,
            created_at: self.created_at,
        }
    }
}

/// A persisted jobsheet. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub row_id: JobId,
    pub code: JobCode,
    pub date: NaiveDate,
    pub daily_counter: DailyCounter,
    pub customer_name: String,
    pub phone: String,
    pub model: String,
    pub serial: String,
    pub symptom: String,
    pub created_at: DateTime<Utc>,
}
