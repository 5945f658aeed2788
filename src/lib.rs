pub mod api;
pub mod config;
pub mod finance;
pub mod report;
pub mod service;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::service::{ReportService, StartupError};

/// Composition root: tracing, configuration, the shared report service and
/// the HTTP server. Runs until Ctrl-C.
pub async fn run() -> Result<(), StartupError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let settings = config::ServerConfig::from_env()?;
    let service = Arc::new(ReportService::from_config(&settings)?);

    let mut server = api::start_report_server(service, settings.bind).await?;
    tracing::info!(
        addr = %server.session.server_addr,
        session = %server.session.session_id,
        started_at = %server.session.started_at,
        "Report API ready"
    );

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Cannot listen for shutdown signal: {e}");
    }
    server.shutdown();
    server.stopped().await;

    tracing::info!("{} stopped", config::APP_NAME);
    Ok(())
}
