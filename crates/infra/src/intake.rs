//! Intake service: validate, sequence, persist, print.

use std::path::PathBuf;
use std::sync::Arc;

use jobsheet_core::{Clock, DomainError, IntakeForm, JobCode, JobRecord, SearchFilter};
use jobsheet_receipt::{ReceiptRenderer, RenderError, RenderedReceipt};

use crate::store::{JobStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Result of a successful intake.
#[derive(Debug, Clone)]
pub struct IntakeOutcome {
    pub record: JobRecord,
    pub receipt_path: PathBuf,
    pub receipt: RenderedReceipt,
}

/// Front-desk operations over a store, a renderer and a clock.
pub struct IntakeService {
    store: Arc<dyn JobStore>,
    renderer: ReceiptRenderer,
    clock: Arc<dyn Clock>,
    output_dir: PathBuf,
    // One intake at a time: reserve + insert for a date never interleave.
    intake_lock: tokio::sync::Mutex<()>,
}

impl IntakeService {
    pub fn new(
        store: Arc<dyn JobStore>,
        renderer: ReceiptRenderer,
        clock: Arc<dyn Clock>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            renderer,
            clock,
            output_dir: output_dir.into(),
            intake_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn renderer(&self) -> &ReceiptRenderer {
        &self.renderer
    }

    /// Record a new intake and write its receipt.
    ///
    /// Nothing is persisted when validation fails. If the receipt cannot be
    /// written the record stays stored and the error is returned; the receipt
    /// can be re-rendered with [`IntakeService::receipt_for`].
    #[tracing::instrument(skip_all, fields(customer = %form.customer_name))]
    pub async fn create(&self, form: IntakeForm) -> Result<IntakeOutcome, IntakeError> {
        form.validate()?;

        let record = {
            let _guard = self.intake_lock.lock().await;
            let created_at = self.clock.now();
            let date = self.renderer.shop().timezone.local_date(created_at);
            self.store.reserve_and_insert(date, form, created_at).await?
        };
        tracing::info!(code = %record.code, date = %record.date, counter = record.daily_counter.get(), "jobsheet created");

        let (receipt_path, receipt) = self.renderer.render_to_dir(&record, &self.output_dir)?;
        Ok(IntakeOutcome {
            record,
            receipt_path,
            receipt,
        })
    }

    #[tracing::instrument(skip(self))]
    pub async fn search(&self, filter: &SearchFilter) -> Result<Vec<JobRecord>, IntakeError> {
        let records = self.store.query(filter).await?;
        tracing::debug!(results = records.len(), "search complete");
        Ok(records)
    }

    pub async fn find(&self, code: &JobCode) -> Result<JobRecord, IntakeError> {
        self.store
            .get_by_code(code)
            .await?
            .ok_or_else(|| DomainError::not_found().into())
    }

    /// Re-render the receipt of an existing jobsheet (same file name).
    pub async fn receipt_for(&self, code: &JobCode) -> Result<(PathBuf, RenderedReceipt), IntakeError> {
        let record = self.find(code).await?;
        Ok(self.renderer.render_to_dir(&record, &self.output_dir)?)
    }
}
