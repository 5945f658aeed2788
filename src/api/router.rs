//! Report API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.
//!
//! Middleware stack (outermost → innermost):
//! 1. CORS → 2. Body limit → 3. Access logger

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::service::ReportService;

/// Largest accepted JSON request body. Reports with thousands of rows fit.
pub const MAX_REQUEST_BYTES: usize = 16 * 1024 * 1024;

/// Build the report API router with all endpoints under `/api/`.
pub fn report_api_router(service: Arc<ReportService>) -> Router {
    let ctx = ApiContext::new(service);

    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/reports", post(endpoints::reports::download))
        .route("/reports/export", post(endpoints::reports::export))
        .route("/reports/financial", post(endpoints::reports::financial))
        .with_state(ctx)
        // Middleware stack (innermost first, outermost last):
        .layer(axum::middleware::from_fn(middleware::access_log::log_access))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
        .layer(CorsLayer::permissive());

    Router::new().nest("/api", api)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use crate::config::LayoutConfig;
    use crate::report::{Logo, MemorySink, StripedTable};

    fn test_router() -> (Router, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let service = ReportService::new(
            LayoutConfig::default(),
            Arc::new(StripedTable),
            Logo::bundled().unwrap(),
            sink.clone(),
        );
        (report_api_router(Arc::new(service)), sink)
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    const FINANCIAL: &str = r#"{
        "title": "Reporte Financiero",
        "subtitle": "Periodo: Este Mes",
        "sections": [{
            "title": "Ingresos",
            "columns": ["Fecha", "Monto"],
            "data": [["2024-05-01", "$120.00"], ["2024-05-02", "$80.00"]]
        }],
        "fileName": "reporte.pdf"
    }"#;

    #[tokio::test]
    async fn health_returns_ok_with_request_id() {
        let (app, _) = test_router();
        let response = app
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn download_returns_pdf_attachment() {
        let (app, sink) = test_router();
        let response = app.oneshot(post_json("/api/reports", FINANCIAL)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"reporte.pdf\""
        );
        assert_eq!(headers["x-report-pages"], "1");
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[0..4], b"%PDF");
        assert!(sink.delivered().is_empty());
    }

    #[tokio::test]
    async fn export_delivers_to_sink() {
        let (app, sink) = test_router();
        let response = app
            .oneshot(post_json("/api/reports/export", FINANCIAL))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), 4096).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["file_name"], "reporte.pdf");
        assert_eq!(json["pages"], 1);
        assert_eq!(sink.delivered()[0].0, "reporte.pdf");
    }

    #[tokio::test]
    async fn zero_sections_is_not_an_error() {
        let (app, _) = test_router();
        let body = r#"{"title":"T","subtitle":"S","sections":[],"fileName":"empty.pdf"}"#;
        let response = app.oneshot(post_json("/api/reports", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn arity_mismatch_is_400() {
        let (app, sink) = test_router();
        let body = r#"{
            "title": "T", "subtitle": "S", "fileName": "x.pdf",
            "sections": [{ "title": "A", "columns": ["a", "b"], "data": [["only one"]] }]
        }"#;
        let response = app
            .oneshot(post_json("/api/reports/export", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), 4096).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "INVALID_REPORT");
        assert!(sink.delivered().is_empty());
    }

    #[tokio::test]
    async fn malformed_json_is_400() {
        let (app, _) = test_router();
        let response = app
            .oneshot(post_json("/api/reports", r#"{"title": 1}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), 4096).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn financial_report_is_built_server_side() {
        let (app, _) = test_router();
        let body = r#"{
            "period": "this_month",
            "reference_date": "2024-05-15",
            "appointments": [
                {"date": "2024-05-01", "patient": "Ana", "doctor": "Dr. Paz",
                 "specialty": "General", "amount": 120.0, "status": "completed"}
            ]
        }"#;
        let response = app
            .oneshot(post_json("/api/reports/financial", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"reporte-financiero-mes.pdf\""
        );
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let (app, _) = test_router();
        let response = app
            .oneshot(Request::get("/api/nonexistent").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
