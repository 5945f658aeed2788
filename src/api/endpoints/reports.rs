//! Report endpoints.
//!
//! Three endpoints:
//! - `POST /api/reports`: render a report and return the PDF as a download
//! - `POST /api/reports/export`: render and save into the exports directory
//! - `POST /api/reports/financial`: build the financial report, return the PDF

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::finance::FinancialReportRequest;
use crate::report::sink::validate_file_name;
use crate::report::{ExportedReport, RenderedReport, ReportRequest};

pub const PAGES_HEADER: &str = "x-report-pages";

/// `POST /api/reports`: PDF download.
pub async fn download(
    State(ctx): State<ApiContext>,
    payload: Result<Json<ReportRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    let disposition = content_disposition(&request.file_name)?;

    let service = ctx.service.clone();
    let rendered = tokio::task::spawn_blocking(move || service.render(&request)).await??;

    Ok(pdf_response(rendered, disposition))
}

/// `POST /api/reports/export`: save into the exports directory.
pub async fn export(
    State(ctx): State<ApiContext>,
    payload: Result<Json<ReportRequest>, JsonRejection>,
) -> Result<Json<ExportedReport>, ApiError> {
    let Json(request) = payload?;

    let service = ctx.service.clone();
    let exported = tokio::task::spawn_blocking(move || service.export(&request)).await??;

    Ok(Json(exported))
}

/// `POST /api/reports/financial`: financial report download.
pub async fn financial(
    State(ctx): State<ApiContext>,
    payload: Result<Json<FinancialReportRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    let today = request
        .reference_date
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let service = ctx.service.clone();
    let rendered = tokio::task::spawn_blocking(move || {
        service.render_financial(&request.appointments, request.period, today)
    })
    .await??;
    let disposition = content_disposition(&rendered.file_name)?;

    Ok(pdf_response(rendered, disposition))
}

/// `attachment; filename="..."`, for plain ASCII names only.
fn content_disposition(file_name: &str) -> Result<HeaderValue, ApiError> {
    validate_file_name(file_name)?;
    if !file_name.is_ascii() || file_name.contains('"') {
        return Err(ApiError::InvalidReport(format!(
            "File name must be plain ASCII without quotes: {file_name:?}"
        )));
    }
    HeaderValue::from_str(&format!("attachment; filename=\"{file_name}\""))
        .map_err(|_| ApiError::InvalidReport(format!("Invalid file name: {file_name:?}")))
}

fn pdf_response(rendered: RenderedReport, disposition: HeaderValue) -> Response {
    let mut response = (StatusCode::OK, rendered.bytes).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/pdf"));
    headers.insert(header::CONTENT_DISPOSITION, disposition);
    headers.insert(PAGES_HEADER, HeaderValue::from(rendered.pages));
    response
}
