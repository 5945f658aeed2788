use std::borrow::Cow;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ─── Request ──────────────────────────────────────────────────────────────────

/// A complete report, built entirely by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub title: String,
    pub subtitle: String,
    #[serde(default)]
    pub sections: Vec<Section>,
    pub file_name: String,
}

/// A named block of tabular data: heading, column labels and rows.
///
/// Every row is expected to have exactly `columns.len()` cells. The composer
/// does not check this; the table layout engine rejects mismatches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub columns: Vec<String>,
    #[serde(default)]
    pub data: Vec<Row>,
}

pub type Row = Vec<Cell>;

/// A single table cell. Only text and numbers are accepted on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Number(f64),
}

impl Cell {
    /// Default stringification: text verbatim, numbers in their shortest
    /// form (`120`, `80.5`). Callers pre-format currency and percentages.
    pub fn render(&self) -> Cow<'_, str> {
        match self {
            Cell::Text(s) => Cow::Borrowed(s.as_str()),
            Cell::Number(n) => Cow::Owned(n.to_string()),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<usize> for Cell {
    fn from(value: usize) -> Self {
        Cell::Number(value as f64)
    }
}

impl Section {
    pub fn new(title: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            title: title.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            data: Vec::new(),
        }
    }

    pub fn with_row(mut self, row: Row) -> Self {
        self.data.push(row);
        self
    }
}

// ─── Results ──────────────────────────────────────────────────────────────────

/// Finished PDF bytes, not yet handed to any sink.
#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub file_name: String,
    pub pages: usize,
    pub bytes: Vec<u8>,
}

/// Outcome of a successful export, for the caller's notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedReport {
    pub file_name: String,
    /// Where the sink put the document, when it has a location.
    pub path: Option<PathBuf>,
    pub pages: usize,
    pub bytes: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_deserializes_from_dashboard_json() {
        let json = r#"{
            "title": "Reporte Financiero",
            "subtitle": "Periodo: Este Mes",
            "sections": [{
                "title": "Ingresos",
                "columns": ["Fecha", "Monto"],
                "data": [["2024-05-01", "$120.00"], ["2024-05-02", 80]]
            }],
            "fileName": "reporte.pdf"
        }"#;
        let req: ReportRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.file_name, "reporte.pdf");
        assert_eq!(req.sections.len(), 1);
        assert_eq!(req.sections[0].data[1][1], Cell::Number(80.0));
    }

    #[test]
    fn nested_cell_is_rejected() {
        let json = r#"{
            "title": "T", "subtitle": "S", "fileName": "x.pdf",
            "sections": [{ "title": "A", "columns": ["a"], "data": [[{"nested": 1}]] }]
        }"#;
        assert!(serde_json::from_str::<ReportRequest>(json).is_err());
    }

    #[test]
    fn boolean_cell_is_rejected() {
        let json = r#"{
            "title": "T", "subtitle": "S", "fileName": "x.pdf",
            "sections": [{ "title": "A", "columns": ["a"], "data": [[true]] }]
        }"#;
        assert!(serde_json::from_str::<ReportRequest>(json).is_err());
    }

    #[test]
    fn missing_sections_means_empty() {
        let json = r#"{ "title": "T", "subtitle": "S", "fileName": "empty.pdf" }"#;
        let req: ReportRequest = serde_json::from_str(json).unwrap();
        assert!(req.sections.is_empty());
    }

    #[test]
    fn numbers_render_in_shortest_form() {
        assert_eq!(Cell::Number(120.0).render(), "120");
        assert_eq!(Cell::Number(80.5).render(), "80.5");
        assert_eq!(Cell::from("$1234.56").render(), "$1234.56");
        assert_eq!(Cell::from(3usize).render(), "3");
    }
}
