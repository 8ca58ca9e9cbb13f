use std::sync::Arc;

use jobsheet_core::{Clock, SystemClock};
use jobsheet_infra::{AppConfig, InMemoryJobStore, IntakeService, JobStore, SqliteJobStore, StoreError};
use jobsheet_receipt::ReceiptRenderer;

/// Database URL that selects the non-persistent store.
pub const IN_MEMORY_DATABASE_URL: &str = "memory";

/// Everything the handlers need, shared behind an `Arc`.
pub struct AppServices {
    pub intake: IntakeService,
}

impl AppServices {
    pub fn new(store: Arc<dyn JobStore>, clock: Arc<dyn Clock>, config: &AppConfig) -> Self {
        let renderer = ReceiptRenderer::new(config.shop.clone());
        Self {
            intake: IntakeService::new(store, renderer, clock, config.output_dir.clone()),
        }
    }

    pub fn in_memory(config: &AppConfig) -> Self {
        Self::new(Arc::new(InMemoryJobStore::new()), Arc::new(SystemClock), config)
    }
}

/// Open the configured store and wire the intake service around it.
pub async fn build_services(config: &AppConfig) -> Result<AppServices, StoreError> {
    if config.database_url == IN_MEMORY_DATABASE_URL {
        tracing::warn!("using in-memory jobsheet store; records are lost on restart");
        return Ok(AppServices::in_memory(config));
    }

    let store = SqliteJobStore::connect(&config.database_url).await?;
    tracing::info!(database_url = %config.database_url, "jobsheet store ready");
    Ok(AppServices::new(Arc::new(store), Arc::new(SystemClock), config))
}
