// Copyright 2025 Cowboy AI, LLC.

//! Local draft persistence
//!
//! The working report is saved to durable local storage after every edit and
//! restored on startup, so unsubmitted work survives restarts. One draft
//! slot exists per installation.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::infrastructure::{LocalStorage, LocalStoreError};
use crate::schema::Report;

/// Storage key of the single draft slot
pub const DRAFT_KEY: &str = "deptReportData_Draft";

/// Errors from draft persistence
#[derive(Debug, Clone, Error)]
pub enum DraftError {
    /// Draft could not be serialized
    #[error("Draft serialization failed: {0}")]
    Serialization(String),

    /// Underlying storage failed
    #[error(transparent)]
    Storage(#[from] LocalStoreError),
}

/// Draft persistence over durable local storage
#[derive(Clone)]
pub struct DraftStore {
    storage: Arc<dyn LocalStorage>,
}

impl DraftStore {
    /// Draft store over the given storage
    pub fn new(storage: Arc<dyn LocalStorage>) -> Self {
        Self { storage }
    }

    /// Persist the full report under the draft slot
    pub fn save(&self, report: &Report) -> Result<(), DraftError> {
        let json = serde_json::to_string(report)
            .map_err(|e| DraftError::Serialization(e.to_string()))?;
        self.storage.set(DRAFT_KEY, &json)?;
        debug!("Draft saved");
        Ok(())
    }

    /// Load the saved draft, or a blank report when none is usable
    ///
    /// A missing, unreadable, or undecodable draft degrades to the blank
    /// template rather than failing startup.
    pub fn load(&self) -> Report {
        match self.storage.get(DRAFT_KEY) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(report) => {
                    debug!("Draft restored");
                    report
                }
                Err(err) => {
                    warn!("Saved draft is corrupt, starting blank: {err}");
                    Report::default()
                }
            },
            Ok(None) => Report::default(),
            Err(err) => {
                warn!("Saved draft unreadable, starting blank: {err}");
                Report::default()
            }
        }
    }

    /// Remove the saved draft
    pub fn clear(&self) -> Result<(), DraftError> {
        self.storage.remove(DRAFT_KEY)?;
        debug!("Draft cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::InMemoryStorage;
    use crate::mutation::{DepartmentField, FieldPath};

    fn store() -> DraftStore {
        DraftStore::new(Arc::new(InMemoryStorage::new()))
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let drafts = store();
        let report = Report::default()
            .update_field(FieldPath::Department(DepartmentField::DeptName), "CS Dept")
            .update_field(FieldPath::Department(DepartmentField::HodName), "Dr. Rao");

        drafts.save(&report).unwrap();
        let restored = drafts.load();

        assert_eq!(restored.department_details.dept_name, "CS Dept");
        assert_eq!(restored.department_details.hod_name, "Dr. Rao");
    }

    #[test]
    fn test_load_without_draft_is_blank() {
        let drafts = store();
        let report = drafts.load();
        assert_eq!(report.department_details.dept_name, "");
        assert_eq!(report.photos.len(), 5);
    }

    #[test]
    fn test_corrupt_draft_degrades_to_blank() {
        let storage = Arc::new(InMemoryStorage::new());
        storage.set(DRAFT_KEY, "{not json at all").unwrap();

        let drafts = DraftStore::new(storage);
        let report = drafts.load();
        assert_eq!(report.department_details.dept_name, "");
    }

    #[test]
    fn test_clear_removes_draft() {
        let drafts = store();
        let report = Report::default()
            .update_field(FieldPath::Department(DepartmentField::DeptName), "Civil");

        drafts.save(&report).unwrap();
        drafts.clear().unwrap();
        assert_eq!(drafts.load().department_details.dept_name, "");

        // Clearing an already-empty slot is a no-op.
        drafts.clear().unwrap();
    }
}
