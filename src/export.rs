//! JSON export of the working report
//!
//! Export serializes the full report as pretty-printed JSON, named after the
//! department. It is a plain snapshot of local state: exporting never touches
//! the shared collection and does not require a submission first.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::schema::Report;

/// Errors from report export
#[derive(Debug, Clone, Error)]
pub enum ExportError {
    /// Report could not be serialized
    #[error("Export serialization failed: {0}")]
    Serialization(String),

    /// Export file could not be written
    #[error("Failed to write export file: {0}")]
    Io(String),
}

/// Download file name for a report
///
/// The department name is used verbatim, so the name can contain spaces or
/// punctuation. An unnamed report exports as `dept_report.json`.
pub fn export_filename(report: &Report) -> String {
    let dept_name = report.department_details.dept_name.as_str();
    if dept_name.is_empty() {
        "dept_report.json".to_string()
    } else {
        format!("{dept_name}_report.json")
    }
}

/// Serialize the full report as pretty-printed JSON
pub fn export_json(report: &Report) -> Result<String, ExportError> {
    serde_json::to_string_pretty(report).map_err(|e| ExportError::Serialization(e.to_string()))
}

/// Write the export file under `dir`, returning the path written
pub fn write_backup(report: &Report, dir: impl AsRef<Path>) -> Result<PathBuf, ExportError> {
    let json = export_json(report)?;
    let path = dir.as_ref().join(export_filename(report));

    fs::create_dir_all(dir.as_ref()).map_err(|e| ExportError::Io(e.to_string()))?;
    fs::write(&path, json).map_err(|e| ExportError::Io(e.to_string()))?;

    info!(path = %path.display(), "Report exported");
    Ok(path)
}
