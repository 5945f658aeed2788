//! Report API server lifecycle: starts/stops the axum HTTP server
//! the admin dashboard downloads reports from.
//!
//! bind → spawn background task → return handle with shutdown channel.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::api::router::report_api_router;
use crate::service::{ReportService, StartupError};

// ═══════════════════════════════════════════════════════════
// Public types
// ═══════════════════════════════════════════════════════════

/// Session metadata for a running report server.
#[derive(Debug, Clone)]
pub struct ServerSession {
    pub session_id: String,
    pub server_addr: String,
    pub port: u16,
    pub started_at: String,
}

/// Handle to a running report server.
pub struct ReportServer {
    pub session: ServerSession,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl ReportServer {
    /// Shut down the server gracefully.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("Report server shutdown signal sent");
        }
    }

    /// Waits for the server task to finish (after `shutdown`, or on error).
    pub async fn stopped(&mut self) {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::error!("Report server task failed: {e}");
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Server lifecycle
// ═══════════════════════════════════════════════════════════

/// Start the report server on `addr` (port 0 picks an ephemeral port).
pub async fn start_report_server(
    service: Arc<ReportService>,
    addr: SocketAddr,
) -> Result<ReportServer, StartupError> {
    // 1. Bind
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| StartupError::Server(format!("Failed to bind report server on {addr}: {e}")))?;

    let addr = listener
        .local_addr()
        .map_err(|e| StartupError::Server(format!("Failed to get server address: {e}")))?;

    tracing::info!(%addr, "Report server binding");

    // 2. Build the router
    let app = report_api_router(service);

    // 3. Create session metadata
    let session = ServerSession {
        session_id: Uuid::new_v4().to_string(),
        server_addr: addr.to_string(),
        port: addr.port(),
        started_at: chrono::Utc::now().to_rfc3339(),
    };

    // 4. Set up shutdown signal
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    // 5. Spawn server in background task
    let task = tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("Report server received shutdown signal");
        };

        tracing::info!(%addr, "Report server started");

        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("Report server error: {e}");
        }

        tracing::info!("Report server stopped");
    });

    Ok(ReportServer {
        session,
        shutdown_tx: Some(shutdown_tx),
        task: Some(task),
    })
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use super::*;
    use crate::config::LayoutConfig;
    use crate::report::{Logo, MemorySink, StripedTable};

    fn test_service() -> Arc<ReportService> {
        Arc::new(ReportService::new(
            LayoutConfig::default(),
            Arc::new(StripedTable),
            Logo::bundled().unwrap(),
            Arc::new(MemorySink::new()),
        ))
    }

    fn localhost() -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0)
    }

    #[tokio::test]
    async fn start_and_stop_server() {
        let mut server = start_report_server(test_service(), localhost())
            .await
            .expect("server should start");

        assert!(!server.session.session_id.is_empty());
        assert!(server.session.port > 0);

        let url = format!("http://127.0.0.1:{}/api/health", server.session.port);
        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);

        server.shutdown();
        server.stopped().await;
    }

    #[tokio::test]
    async fn serves_pdf_over_http() {
        let mut server = start_report_server(test_service(), localhost())
            .await
            .expect("server should start");

        let resp = reqwest::Client::new()
            .post(format!("http://127.0.0.1:{}/api/reports", server.session.port))
            .json(&serde_json::json!({
                "title": "T",
                "subtitle": "S",
                "sections": [],
                "fileName": "empty.pdf"
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        let bytes = resp.bytes().await.unwrap();
        assert_eq!(&bytes[0..4], b"%PDF");

        server.shutdown();
        server.stopped().await;
    }

    #[tokio::test]
    async fn bind_conflict_is_reported() {
        let mut first = start_report_server(test_service(), localhost())
            .await
            .unwrap();
        let taken = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), first.session.port);

        let err = start_report_server(test_service(), taken).await.err().unwrap();
        assert!(matches!(err, StartupError::Server(_)));

        first.shutdown();
    }

    #[tokio::test]
    async fn shutdown_is_idempotent() {
        let mut server = start_report_server(test_service(), localhost())
            .await
            .expect("server should start");

        server.shutdown();
        server.shutdown(); // Second call should be safe
        server.stopped().await;
    }
}
