//! Tabular PDF reports.
//!
//! A `ReportRequest` (title, subtitle, sections of rows) is laid out by the
//! `ReportComposer` onto a `DocumentCanvas`, with tables drawn by an injected
//! `TableLayout`, then handed to a `ReportSink`.

pub mod canvas;
pub mod composer;
pub mod error;
pub mod sink;
pub mod table;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use canvas::{DocumentCanvas, DocumentIdentity, FontStyle, Logo, PdfCanvas, Rgb8};
pub use composer::ReportComposer;
pub use error::ReportError;
pub use sink::{DirectorySink, MemorySink, ReportSink};
pub use table::{StripedTable, Table, TableFrame, TableLayout, TableStyle};
pub use types::{Cell, ExportedReport, RenderedReport, ReportRequest, Row, Section};
