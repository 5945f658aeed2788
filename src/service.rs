//! Shared report service.
//!
//! `ReportService` owns the layout configuration, the table layout engine,
//! the masthead logo and the export sink. It is built once by the
//! composition root and shared (`Arc`) with every request handler. Each
//! request gets its own canvas, so nothing here is per-request state.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::config::{ConfigError, LayoutConfig, ServerConfig};
use crate::finance::{self, BilledAppointment, Period};
use crate::report::{
    DirectorySink, ExportedReport, Logo, RenderedReport, ReportComposer, ReportError,
    ReportRequest, ReportSink, StripedTable, TableLayout,
};

#[derive(thiserror::Error, Debug)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Report setup error: {0}")]
    Report(#[from] ReportError),

    #[error("Server error: {0}")]
    Server(String),
}

pub struct ReportService {
    composer: ReportComposer,
    sink: Arc<dyn ReportSink>,
}

impl ReportService {
    pub fn new(
        layout: LayoutConfig,
        table: Arc<dyn TableLayout>,
        logo: Logo,
        sink: Arc<dyn ReportSink>,
    ) -> Self {
        Self {
            composer: ReportComposer::new(layout, table, logo),
            sink,
        }
    }

    /// Resolves every collaborator once: striped tables, the masthead logo
    /// and the exports directory. A configured logo that cannot be loaded
    /// fails startup; without one the bundled logo is used.
    pub fn from_config(config: &ServerConfig) -> Result<Self, StartupError> {
        let logo = match &config.logo {
            Some(path) => Logo::load(path)?,
            None => Logo::bundled()?,
        };
        tracing::info!(
            exports_dir = %config.exports_dir.display(),
            logo = %logo.source().display(),
            "Report service configured"
        );
        Ok(Self::new(
            config.layout.clone(),
            Arc::new(StripedTable),
            logo,
            Arc::new(DirectorySink::new(&config.exports_dir)),
        ))
    }

    /// PDF bytes for a direct download.
    pub fn render(&self, request: &ReportRequest) -> Result<RenderedReport, ReportError> {
        self.composer.render(request)
    }

    /// Renders and delivers to the configured sink.
    pub fn export(&self, request: &ReportRequest) -> Result<ExportedReport, ReportError> {
        self.composer.generate_report(request, self.sink.as_ref())
    }

    pub fn render_financial(
        &self,
        appointments: &[BilledAppointment],
        period: Period,
        today: NaiveDate,
    ) -> Result<RenderedReport, ReportError> {
        let request = finance::build_financial_report(appointments, period, today);
        self.composer.render(&request)
    }
}
