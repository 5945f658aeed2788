use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while composing or exporting a report.
///
/// Nothing is recovered locally: every variant aborts the whole call and no
/// partial document reaches the sink.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Section '{section}' row {row} has {found} cells, expected {expected}")]
    RowArity {
        section: String,
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Section '{section}' row {row} column {column}: unsupported cell value ({reason})")]
    UnsupportedCell {
        section: String,
        row: usize,
        column: usize,
        reason: String,
    },

    #[error("Asset unavailable at {}: {reason}", path.display())]
    Asset { path: PathBuf, reason: String },

    #[error("PDF font error: {0}")]
    Font(String),

    #[error("PDF save error: {0}")]
    Pdf(String),

    #[error("Invalid report file name: {0:?}")]
    InvalidFileName(String),

    #[error("Cannot write report to {}: {source}", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ReportError {
    /// True for errors caused by the caller's data rather than the environment.
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            ReportError::RowArity { .. }
                | ReportError::UnsupportedCell { .. }
                | ReportError::InvalidFileName(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_arity_message_names_section_and_counts() {
        let err = ReportError::RowArity {
            section: "Ingresos".into(),
            row: 3,
            expected: 2,
            found: 1,
        };
        assert_eq!(
            err.to_string(),
            "Section 'Ingresos' row 3 has 1 cells, expected 2"
        );
        assert!(err.is_malformed_input());
    }

    #[test]
    fn export_error_is_environmental() {
        let err = ReportError::Export {
            path: PathBuf::from("/nope/report.pdf"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(!err.is_malformed_input());
        assert!(err.to_string().contains("/nope/report.pdf"));
    }
}
