//! Export targets for finished documents.

use std::io::Write;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use tempfile::NamedTempFile;

use super::error::ReportError;

/// Receives a finished document under its suggested file name.
pub trait ReportSink: Send + Sync {
    /// Returns where the document ended up, if the sink has a location.
    fn deliver(&self, file_name: &str, bytes: &[u8]) -> Result<Option<PathBuf>, ReportError>;
}

/// Writes documents into an exports directory, created on demand.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ReportSink for DirectorySink {
    fn deliver(&self, file_name: &str, bytes: &[u8]) -> Result<Option<PathBuf>, ReportError> {
        validate_file_name(file_name)?;

        std::fs::create_dir_all(&self.dir).map_err(|source| ReportError::Export {
            path: self.dir.clone(),
            source,
        })?;

        // Written beside the target and renamed over it, so a failed write
        // never leaves a truncated document under `file_name`.
        let path = self.dir.join(file_name);
        let export_err = |source| ReportError::Export {
            path: path.clone(),
            source,
        };
        let mut staged = NamedTempFile::new_in(&self.dir).map_err(export_err)?;
        staged.write_all(bytes).map_err(export_err)?;
        staged.as_file().sync_all().map_err(export_err)?;
        staged.persist(&path).map_err(|e| export_err(e.error))?;

        Ok(Some(path))
    }
}

/// Keeps delivered documents in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    delivered: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivered documents in order, as `(file_name, bytes)`.
    pub fn delivered(&self) -> Vec<(String, Vec<u8>)> {
        self.delivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ReportSink for MemorySink {
    fn deliver(&self, file_name: &str, bytes: &[u8]) -> Result<Option<PathBuf>, ReportError> {
        validate_file_name(file_name)?;
        // A panicked holder cannot leave the list half-updated.
        self.delivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((file_name.to_string(), bytes.to_vec()));
        Ok(None)
    }
}

/// A plain file name: non-empty, no separators, no parent references.
pub fn validate_file_name(file_name: &str) -> Result<(), ReportError> {
    let trimmed = file_name.trim();
    let invalid = trimmed.is_empty()
        || trimmed == "."
        || trimmed == ".."
        || file_name.contains(['/', '\\', '\0']);
    if invalid {
        return Err(ReportError::InvalidFileName(file_name.to_string()));
    }
    Ok(())
}
