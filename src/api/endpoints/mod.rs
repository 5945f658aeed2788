//! API endpoint handlers.
//!
//! Handlers reuse the shared `ReportService`; rendering runs on the
//! blocking pool since PDF layout is synchronous CPU work.

pub mod health;
pub mod reports;
