//! Report API.
//!
//! Exposes the report service as HTTP endpoints for the admin dashboard.
//! Routes are nested under `/api/`; `report_api_router()` returns a
//! `Router` that can be mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::report_api_router;
pub use server::{start_report_server, ReportServer, ServerSession};
pub use types::ApiContext;
