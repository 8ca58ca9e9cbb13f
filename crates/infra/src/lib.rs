//! Infrastructure layer: record stores, configuration and the intake service.

pub mod config;
pub mod intake;
pub mod store;

pub use config::{AppConfig, ConfigError};
pub use intake::{IntakeError, IntakeOutcome, IntakeService};
pub use store::{InMemoryJobStore, JobStore, SqliteJobStore, StoreError};
