use std::sync::Arc;

use anyhow::Context;
use jobsheet_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    jobsheet_observability::init(config.log_format);

    config.warn_on_placeholder_defaults();

    let services = jobsheet_api::app::services::build_services(&config)
        .await
        .with_context(|| format!("failed to open jobsheet store at {}", config.database_url))?;
    let app = jobsheet_api::app::build_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(
        output_dir = %config.output_dir.display(),
        "listening on {}",
        listener.local_addr()?
    );

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
