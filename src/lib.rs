//! # Department Report Domain
//!
//! Data entry, local drafting, and shared submission for academic department
//! annual reports.
//!
//! This crate provides the building blocks of the reporting portal:
//! - **Schema**: The report record and its camelCase wire format
//! - **Sections**: The fixed navigation catalog and list-section templates
//! - **Mutation**: Copy-on-write edits addressed like the wire format
//! - **Keys**: Deterministic document keys derived from department names
//! - **Drafts**: Autosaved local drafts that survive restarts
//! - **Submission**: The status machine and the shared-collection write
//! - **Feed**: Whole-collection snapshots behind the dashboard gate
//! - **Portal**: The controller that drives one session end to end
//!
//! ## Design Principles
//!
//! 1. **Keep what was typed**: Values are stored as entered, never parsed or validated
//! 2. **Immutability**: Edits produce new report values; untouched sections stay shared
//! 3. **Last write wins**: One document per department key, replaced whole on resubmission
//! 4. **Degrade, don't fail**: Identity, drafts, and storage fall back instead of erroring
//! 5. **Controlled State**: Submission progress is an enum with a fixed transition table

#![warn(missing_docs)]

pub mod config;
pub mod draft;
mod errors;
pub mod export;
pub mod feed;
pub mod identity;
pub mod infrastructure;
pub mod keys;
pub mod mutation;
pub mod portal;
pub mod schema;
pub mod sections;
pub mod submission;

// Re-export core types
pub use config::PortalConfig;
pub use draft::{DraftError, DraftStore, DRAFT_KEY};
pub use errors::{PortalError, PortalResult};
pub use export::{export_filename, export_json, write_backup, ExportError};
pub use feed::ReportFeed;
pub use identity::{
    establish_identity, AnonymousIdentityProvider, IdentityError, IdentityProvider,
    SessionIdentity, OFFLINE_UID,
};
pub use infrastructure::{
    select_report_store, CollectionPath, FileStorage, InMemoryReportStore, InMemoryStorage,
    LocalReportStore, LocalStorage, NatsClient, NatsConfig, NatsReportStore, ReportStore,
    StorageMode, StoreError, OFFLINE_REPORTS_KEY,
};
pub use keys::{ReportKey, FALLBACK_REPORT_KEY};
pub use mutation::{DepartmentField, FieldPath, MutationError, PhotoEdit, ResultMetric, YearTag};
pub use portal::{ReportEdit, ReportPortal};
pub use schema::{
    AcademicResults, DepartmentDetails, PhotoSlot, Report, SectionItem, SubmittedReport,
    YearResult, HIGHLIGHT_COUNT, PHOTO_SLOT_COUNT,
};
pub use sections::{section_index, ListSection, SectionInfo, SECTION_CATALOG};
pub use submission::{
    submit_report, StatusMachine, StatusTransition, SubmitOutcome, SubmitRefusal, SubmitStatus,
    SUCCESS_CLEAR_DELAY,
};
