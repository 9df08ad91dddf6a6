use notification_feed::config::FeedConfig;
use notification_feed::startup::Application;
use notification_feed::SERVICE_NAME;
use service_core::observability::{init_metrics, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = FeedConfig::load().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(
        SERVICE_NAME,
        &config.telemetry.log_level,
        config.telemetry.otlp_endpoint.as_deref(),
    )?;
    init_metrics()?;

    tracing::info!(backend = %config.store.backend, "Starting {}", SERVICE_NAME);

    let app = Application::build(config).await?;
    app.run_until_stopped().await?;

    Ok(())
}
