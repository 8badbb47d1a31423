// Copyright 2025 Cowboy AI, LLC.

//! Portal controller
//!
//! One [`ReportPortal`] instance drives a data-entry session end to end:
//! it owns the working report, the draft autosave, the section navigation
//! cursor, the submission status machine, and the password-gated dashboard
//! feed. All state lives here; the modules underneath stay pure.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use sha2::{Digest, Sha256};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::PortalConfig;
use crate::draft::DraftStore;
use crate::errors::PortalError;
use crate::export;
use crate::feed::ReportFeed;
use crate::identity::{establish_identity, IdentityProvider, SessionIdentity};
use crate::infrastructure::{
    select_report_store, FileStorage, LocalStorage, ReportStore, StorageMode,
};
use crate::mutation::{FieldPath, PhotoEdit};
use crate::schema::{Report, SectionItem, SubmittedReport};
use crate::sections::{ListSection, SectionInfo, SECTION_CATALOG};
use crate::submission::{submit_report, StatusMachine, SubmitOutcome, SubmitRefusal, SubmitStatus};

/// One edit against the working report
///
/// Edits address the record the same way the wire format does: scalar
/// fields by dotted path, list items by section and position, photos and
/// highlights by fixed slot.
#[derive(Debug, Clone)]
pub enum ReportEdit {
    /// Replace one scalar field
    Field {
        /// Address of the field
        path: FieldPath,
        /// New value, stored as entered
        value: String,
    },
    /// Replace one field of a list item
    Item {
        /// Section holding the item
        section: ListSection,
        /// Item position
        index: usize,
        /// Wire name of the field
        field: String,
        /// New value
        value: Value,
    },
    /// Append the section's blank template item
    AddBlankItem {
        /// Section to extend
        section: ListSection,
    },
    /// Append a pre-filled item
    AddItem {
        /// Section to extend
        section: ListSection,
        /// The item to append
        item: SectionItem,
    },
    /// Remove one list item; later items shift down
    RemoveItem {
        /// Section holding the item
        section: ListSection,
        /// Item position
        index: usize,
    },
    /// Edit one of the five fixed photo slots
    Photo {
        /// Slot position (0-based)
        slot: usize,
        /// The edit to apply
        edit: PhotoEdit,
    },
    /// Replace one of the four highlight lines
    Highlight {
        /// Line position (0-based)
        index: usize,
        /// New text
        text: String,
    },
}

/// The data-entry portal for one department installation
pub struct ReportPortal {
    config: PortalConfig,
    mode: StorageMode,
    identity: Option<SessionIdentity>,
    identity_tx: watch::Sender<Option<SessionIdentity>>,
    report: Report,
    active_section: usize,
    dashboard_unlocked: bool,
    status: StatusMachine,
    drafts: DraftStore,
    store: Arc<dyn ReportStore>,
    feed: ReportFeed,
}

impl ReportPortal {
    /// Start a portal over file-backed local storage
    ///
    /// The startup probe picks the shared collection when NATS is
    /// configured and reachable, the offline list otherwise. A saved draft
    /// is restored; sign-in is a separate step.
    pub async fn start(config: PortalConfig) -> Result<Self, PortalError> {
        let storage: Arc<dyn LocalStorage> = Arc::new(FileStorage::new(&config.storage_dir));
        let (store, mode) = select_report_store(
            config.nats.as_ref(),
            config.collection_path(),
            Arc::clone(&storage),
        )
        .await;
        Self::with_backends(config, storage, store, mode).await
    }

    /// Start a portal over explicit backends
    pub async fn with_backends(
        config: PortalConfig,
        storage: Arc<dyn LocalStorage>,
        store: Arc<dyn ReportStore>,
        mode: StorageMode,
    ) -> Result<Self, PortalError> {
        let drafts = DraftStore::new(storage);
        let report = drafts.load();
        let feed = ReportFeed::start(Arc::clone(&store)).await?;
        let (identity_tx, _rx) = watch::channel(None);

        info!(mode = ?mode, "Portal started");
        Ok(Self {
            config,
            mode,
            identity: None,
            identity_tx,
            report,
            active_section: 0,
            dashboard_unlocked: false,
            status: StatusMachine::new(),
            drafts,
            store,
            feed,
        })
    }

    /// Establish the session identity through the given provider
    ///
    /// Uses the configured credential when present, anonymous sign-in
    /// otherwise. Provider failure degrades to the offline identity, so
    /// this always leaves the portal signed in.
    pub async fn sign_in(&mut self, provider: &dyn IdentityProvider) -> SessionIdentity {
        let identity =
            establish_identity(provider, self.config.auth_token.as_deref()).await;
        self.identity = Some(identity.clone());
        self.identity_tx.send_replace(Some(identity.clone()));
        identity
    }

    /// Apply one edit to the working report and autosave the draft
    ///
    /// Out-of-bounds or unknown addresses reject the edit and leave the
    /// report untouched. A failed autosave keeps the edit and logs; the
    /// draft catches up on the next one.
    pub fn apply(&mut self, edit: ReportEdit) -> Result<(), PortalError> {
        let next = match edit {
            ReportEdit::Field { path, value } => self.report.update_field(path, value),
            ReportEdit::Item {
                section,
                index,
                field,
                value,
            } => self.report.update_array_item(section, index, &field, value)?,
            ReportEdit::AddBlankItem { section } => self.report.add_blank_item(section),
            ReportEdit::AddItem { section, item } => self.report.add_array_item(section, item),
            ReportEdit::RemoveItem { section, index } => {
                self.report.remove_array_item(section, index)?
            }
            ReportEdit::Photo { slot, edit } => self.report.update_photo(slot, edit)?,
            ReportEdit::Highlight { index, text } => self.report.update_highlight(index, text)?,
        };

        self.report = next;
        if let Err(err) = self.drafts.save(&self.report) {
            warn!("Draft autosave failed: {err}");
        }
        Ok(())
    }

    /// Submit the working report to the shared collection
    ///
    /// A refusal for a missing department name also moves the navigation
    /// cursor back to Basic Details, where the name is entered.
    pub async fn submit(&mut self) -> SubmitOutcome {
        let outcome = submit_report(
            &self.status,
            self.store.as_ref(),
            self.identity.as_ref(),
            &self.report,
        )
        .await;

        if outcome == SubmitOutcome::Refused(SubmitRefusal::MissingDepartmentName) {
            self.active_section = 0;
        }
        outcome
    }

    // ---- navigation ----

    /// Move the cursor to a catalog position, clamping past the end
    pub fn go_to(&mut self, index: usize) {
        self.active_section = index.min(SECTION_CATALOG.len() - 1);
    }

    /// Advance to the next section, stopping at the last
    pub fn next_section(&mut self) {
        self.go_to(self.active_section + 1);
    }

    /// Step back to the previous section, stopping at the first
    pub fn prev_section(&mut self) {
        self.active_section = self.active_section.saturating_sub(1);
    }

    /// Current cursor position
    pub fn active_section(&self) -> usize {
        self.active_section
    }

    /// Catalog entry under the cursor
    pub fn active_section_info(&self) -> SectionInfo {
        SECTION_CATALOG[self.active_section]
    }

    // ---- dashboard gate ----

    /// Try to unlock the dashboard with a password
    ///
    /// The password's SHA-256 digest is compared against the configured
    /// hex digest. Without a configured digest the dashboard stays locked
    /// for everyone; the raw password is never stored or logged.
    pub fn unlock_dashboard(&mut self, password: &str) -> bool {
        let Some(expected) = self.config.admin_password_sha256.as_deref() else {
            debug!("Dashboard gate has no configured digest");
            return false;
        };

        let digest = Sha256::digest(password.as_bytes());
        let entered: String = digest.iter().map(|byte| format!("{byte:02x}")).collect();
        if entered.eq_ignore_ascii_case(expected) {
            self.dashboard_unlocked = true;
            info!("Dashboard unlocked");
            true
        } else {
            warn!("Dashboard unlock rejected");
            false
        }
    }

    /// Lock the dashboard again
    pub fn lock_dashboard(&mut self) {
        self.dashboard_unlocked = false;
    }

    /// Whether the dashboard is currently unlocked
    pub fn dashboard_unlocked(&self) -> bool {
        self.dashboard_unlocked
    }

    /// The latest submitted-report snapshot, when unlocked
    pub fn dashboard_reports(&self) -> Option<Vec<SubmittedReport>> {
        self.dashboard_unlocked.then(|| self.feed.reports())
    }

    /// Subscribe to snapshot changes, when unlocked
    pub fn subscribe_dashboard(&self) -> Option<watch::Receiver<Vec<SubmittedReport>>> {
        self.dashboard_unlocked.then(|| self.feed.subscribe())
    }

    // ---- export ----

    /// Download file name for the working report
    pub fn export_filename(&self) -> String {
        export::export_filename(&self.report)
    }

    /// The working report as pretty-printed JSON
    pub fn export_json(&self) -> Result<String, PortalError> {
        Ok(export::export_json(&self.report)?)
    }

    /// Write the export file under the configured storage directory
    pub fn export_backup(&self) -> Result<PathBuf, PortalError> {
        let dir = self.config.storage_dir.join("exports");
        Ok(export::write_backup(&self.report, dir)?)
    }

    // ---- accessors ----

    /// The working report
    pub fn report(&self) -> &Report {
        &self.report
    }

    /// Current submission status
    pub fn status(&self) -> SubmitStatus {
        self.status.current()
    }

    /// Subscribe to submission status changes
    pub fn subscribe_status(&self) -> watch::Receiver<SubmitStatus> {
        self.status.subscribe()
    }

    /// Which backend the startup probe selected
    pub fn storage_mode(&self) -> StorageMode {
        self.mode
    }

    /// The session identity, once sign-in has completed
    pub fn identity(&self) -> Option<&SessionIdentity> {
        self.identity.as_ref()
    }

    /// Subscribe to identity changes
    pub fn subscribe_identity(&self) -> watch::Receiver<Option<SessionIdentity>> {
        self.identity_tx.subscribe()
    }

    /// The configuration this portal started with
    pub fn config(&self) -> &PortalConfig {
        &self.config
    }
}
