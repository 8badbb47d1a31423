// Copyright 2025 Cowboy AI, LLC.

//! Shared document store for submitted reports
//!
//! The collection lives at a fixed five-segment logical path and is
//! addressed by derived report keys. Three backends exist: the NATS
//! JetStream KV bucket shared across departments, the offline list kept in
//! durable local storage, and an in-memory store for tests and demos. The
//! backend is selected once at startup by [`select_report_store`].

use std::fmt;
use std::sync::Arc;

use async_nats::jetstream::kv;
use async_nats::jetstream::stream::StorageType;
use async_trait::async_trait;
use bytes::Bytes;
use futures::{StreamExt, TryStreamExt};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{watch, Mutex, RwLock};
use tracing::{debug, info, warn};

use super::local_store::LocalStorage;
use super::nats_client::{NatsClient, NatsConfig};
use crate::keys::ReportKey;
use crate::schema::SubmittedReport;

/// Name of the report collection, the last path segment
pub const REPORT_COLLECTION: &str = "dept_reports_2025";

/// Local storage key holding the offline submitted-report list
pub const OFFLINE_REPORTS_KEY: &str = "demo-reports";

/// Errors from the report store
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Store backend could not be reached or opened
    #[error("Store connection error: {0}")]
    Connection(String),

    /// Read or write against the backend failed
    #[error("Store operation failed: {0}")]
    Storage(String),

    /// Document serialization or deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Logical path of the shared report collection
///
/// The shape is fixed at `artifacts/{app_id}/public/data/dept_reports_2025`;
/// only the application id varies per deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionPath {
    app_id: String,
}

impl CollectionPath {
    /// Collection path for a deployment's application id
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
        }
    }

    /// The application id segment
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// The five path segments in order
    pub fn segments(&self) -> [&str; 5] {
        [
            "artifacts",
            self.app_id.as_str(),
            "public",
            "data",
            REPORT_COLLECTION,
        ]
    }

    /// Bucket name legal for JetStream KV
    ///
    /// Segments are joined with underscores; characters outside
    /// `[A-Za-z0-9_-]` are replaced so arbitrary application ids cannot
    /// produce an invalid stream name.
    pub fn bucket_name(&self) -> String {
        self.segments()
            .iter()
            .map(|segment| sanitize_segment(segment))
            .collect::<Vec<_>>()
            .join("_")
    }
}

fn sanitize_segment(segment: &str) -> String {
    segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments().join("/"))
    }
}

/// Shared document store for submitted reports
///
/// One store instance is bound to one collection. `upsert` replaces the
/// whole document stored under the key; there is no merge.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Insert or overwrite the document stored under `key`
    async fn upsert(&self, key: &ReportKey, report: &SubmittedReport) -> Result<(), StoreError>;

    /// Fetch every document in the collection
    async fn fetch_all(&self) -> Result<Vec<SubmittedReport>, StoreError>;

    /// Subscribe to whole-collection snapshots
    ///
    /// The receiver always holds the latest snapshot; intermediate snapshots
    /// may be skipped under load.
    async fn subscribe(&self) -> Result<watch::Receiver<Vec<SubmittedReport>>, StoreError>;
}

fn sort_reports(reports: &mut [SubmittedReport]) {
    reports.sort_by(|a, b| {
        a.submitted_at
            .cmp(&b.submitted_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// JetStream KV backed report store
pub struct NatsReportStore {
    kv: kv::Store,
    path: CollectionPath,
}

impl NatsReportStore {
    /// Open the collection bucket, creating it on first use
    pub async fn new(client: &NatsClient, path: CollectionPath) -> Result<Self, StoreError> {
        let bucket = path.bucket_name();
        let js = client.jetstream();

        let kv = match js
            .create_key_value(kv::Config {
                bucket: bucket.clone(),
                description: "Department annual report submissions".to_string(),
                history: 10,
                // Reports carry inline-encoded photographs
                max_value_size: 10 * 1024 * 1024,
                storage: StorageType::File,
                ..Default::default()
            })
            .await
        {
            Ok(kv) => kv,
            // The bucket may already exist with an earlier config revision
            Err(create_err) => js.get_key_value(&bucket).await.map_err(|_| {
                StoreError::Connection(format!("Failed to open bucket {bucket}: {create_err}"))
            })?,
        };

        info!(%bucket, "Report collection bucket ready");
        Ok(Self { kv, path })
    }

    /// The collection this store is bound to
    pub fn collection(&self) -> &CollectionPath {
        &self.path
    }
}

#[async_trait]
impl ReportStore for NatsReportStore {
    async fn upsert(&self, key: &ReportKey, report: &SubmittedReport) -> Result<(), StoreError> {
        let payload: Bytes = serde_json::to_vec(report)?.into();
        self.kv
            .put(key.as_str(), payload)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to store report {key}: {e}")))?;

        debug!(%key, "Report document stored");
        Ok(())
    }

    async fn fetch_all(&self) -> Result<Vec<SubmittedReport>, StoreError> {
        let mut keys = self
            .kv
            .keys()
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to list collection: {e}")))?;

        let mut reports = Vec::new();
        while let Some(key) = keys
            .try_next()
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to list collection: {e}")))?
        {
            match self.kv.get(&key).await {
                Ok(Some(bytes)) => match serde_json::from_slice::<SubmittedReport>(&bytes) {
                    Ok(report) => reports.push(report),
                    Err(err) => warn!(%key, "Skipping undecodable report document: {err}"),
                },
                Ok(None) => {}
                Err(err) => {
                    return Err(StoreError::Storage(format!("Failed to load {key}: {err}")))
                }
            }
        }

        sort_reports(&mut reports);
        Ok(reports)
    }

    async fn subscribe(&self) -> Result<watch::Receiver<Vec<SubmittedReport>>, StoreError> {
        let initial = self.fetch_all().await?;
        // The watcher replays the latest revision of every key before live
        // updates, covering writes that land between the snapshot read and
        // the watcher registration. Replayed values are never older than the
        // snapshot, so applying them over it cannot roll a document back.
        let mut entries = self
            .kv
            .watch_with_history(">")
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to watch collection: {e}")))?;

        let mut documents: IndexMap<String, SubmittedReport> = initial
            .iter()
            .map(|report| (report.id.clone(), report.clone()))
            .collect();
        let (tx, rx) = watch::channel(initial);

        tokio::spawn(async move {
            while let Some(entry) = entries.next().await {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(err) => {
                        warn!("Report watch stream error: {err}");
                        break;
                    }
                };

                match entry.operation {
                    kv::Operation::Put => {
                        match serde_json::from_slice::<SubmittedReport>(&entry.value) {
                            Ok(report) => {
                                documents.insert(entry.key.clone(), report);
                            }
                            Err(err) => {
                                warn!(key = %entry.key, "Skipping undecodable report document: {err}");
                                continue;
                            }
                        }
                    }
                    kv::Operation::Delete | kv::Operation::Purge => {
                        documents.shift_remove(&entry.key);
                    }
                }

                let mut snapshot: Vec<SubmittedReport> = documents.values().cloned().collect();
                sort_reports(&mut snapshot);
                if tx.send(snapshot).is_err() {
                    break;
                }
            }
            debug!("Report collection watch finished");
        });

        Ok(rx)
    }
}

/// Offline report store over the durable local list
///
/// Documents live as one JSON list under [`OFFLINE_REPORTS_KEY`]. Writes are
/// read-modify-write of the whole list and are serialized behind a mutex, so
/// the last completed upsert wins in invocation order.
pub struct LocalReportStore {
    storage: Arc<dyn LocalStorage>,
    write_lock: Mutex<()>,
    tx: watch::Sender<Vec<SubmittedReport>>,
}

impl LocalReportStore {
    /// Store over the offline list in the given storage
    pub fn new(storage: Arc<dyn LocalStorage>) -> Self {
        let initial = read_offline_list(storage.as_ref());
        let (tx, _rx) = watch::channel(initial);
        Self {
            storage,
            write_lock: Mutex::new(()),
            tx,
        }
    }
}

/// Read the offline list, degrading to empty on corruption
fn read_offline_list(storage: &dyn LocalStorage) -> Vec<SubmittedReport> {
    match storage.get(OFFLINE_REPORTS_KEY) {
        Ok(Some(json)) => match serde_json::from_str(&json) {
            Ok(list) => list,
            Err(err) => {
                warn!("Offline report list is corrupt, starting empty: {err}");
                Vec::new()
            }
        },
        Ok(None) => Vec::new(),
        Err(err) => {
            warn!("Offline report list unreadable, starting empty: {err}");
            Vec::new()
        }
    }
}

#[async_trait]
impl ReportStore for LocalReportStore {
    async fn upsert(&self, key: &ReportKey, report: &SubmittedReport) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut list = read_offline_list(self.storage.as_ref());
        match list
            .iter()
            .position(|existing| existing.id == key.as_str())
        {
            Some(index) => list[index] = report.clone(),
            None => list.push(report.clone()),
        }

        let json = serde_json::to_string(&list)?;
        self.storage
            .set(OFFLINE_REPORTS_KEY, &json)
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        self.tx.send_replace(list);
        debug!(%key, "Report stored in offline list");
        Ok(())
    }

    async fn fetch_all(&self) -> Result<Vec<SubmittedReport>, StoreError> {
        Ok(read_offline_list(self.storage.as_ref()))
    }

    async fn subscribe(&self) -> Result<watch::Receiver<Vec<SubmittedReport>>, StoreError> {
        Ok(self.tx.subscribe())
    }
}

/// In-memory report store for tests and demos
pub struct InMemoryReportStore {
    documents: RwLock<IndexMap<String, SubmittedReport>>,
    tx: watch::Sender<Vec<SubmittedReport>>,
}

impl InMemoryReportStore {
    /// Empty store
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Vec::new());
        Self {
            documents: RwLock::new(IndexMap::new()),
            tx,
        }
    }
}

impl Default for InMemoryReportStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReportStore for InMemoryReportStore {
    async fn upsert(&self, key: &ReportKey, report: &SubmittedReport) -> Result<(), StoreError> {
        let mut documents = self.documents.write().await;
        documents.insert(key.to_string(), report.clone());
        self.tx
            .send_replace(documents.values().cloned().collect());
        Ok(())
    }

    async fn fetch_all(&self) -> Result<Vec<SubmittedReport>, StoreError> {
        Ok(self.documents.read().await.values().cloned().collect())
    }

    async fn subscribe(&self) -> Result<watch::Receiver<Vec<SubmittedReport>>, StoreError> {
        Ok(self.tx.subscribe())
    }
}

/// Which backend the startup probe selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    /// Shared NATS-backed collection
    Remote,
    /// Durable local offline list
    Offline,
}

impl StorageMode {
    /// Whether submissions stay on this machine
    pub fn is_offline(&self) -> bool {
        matches!(self, StorageMode::Offline)
    }
}

/// Select the report store for this process
///
/// A configured and reachable NATS endpoint selects the shared collection;
/// anything else selects the offline list. The decision is made once at
/// startup and surfaced as a [`StorageMode`], never as an error.
pub async fn select_report_store(
    nats: Option<&NatsConfig>,
    path: CollectionPath,
    storage: Arc<dyn LocalStorage>,
) -> (Arc<dyn ReportStore>, StorageMode) {
    if let Some(config) = nats {
        match NatsClient::connect(config.clone()).await {
            Ok(client) => match NatsReportStore::new(&client, path.clone()).await {
                Ok(store) => {
                    info!(collection = %path, "Using shared report store");
                    return (Arc::new(store), StorageMode::Remote);
                }
                Err(err) => {
                    warn!("Shared report store unavailable, using offline list: {err}")
                }
            },
            Err(err) => warn!("NATS unreachable, using offline list: {err}"),
        }
    } else {
        debug!("No NATS endpoint configured, using offline list");
    }

    (Arc::new(LocalReportStore::new(storage)), StorageMode::Offline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::SessionIdentity;
    use crate::infrastructure::local_store::InMemoryStorage;
    use crate::mutation::{DepartmentField, FieldPath};
    use crate::schema::Report;

    fn submitted(dept_name: &str) -> (ReportKey, SubmittedReport) {
        let report = Report::default().update_field(
            FieldPath::Department(DepartmentField::DeptName),
            dept_name,
        );
        let key = ReportKey::derive(dept_name);
        let document = SubmittedReport::stamp(report, &key, &SessionIdentity::offline());
        (key, document)
    }

    #[test]
    fn test_collection_path_shape() {
        let path = CollectionPath::new("default-app-id");
        assert_eq!(
            path.to_string(),
            "artifacts/default-app-id/public/data/dept_reports_2025"
        );
        assert_eq!(path.segments().len(), 5);
        assert_eq!(path.app_id(), "default-app-id");
    }

    #[test]
    fn test_bucket_name_is_kv_safe() {
        let path = CollectionPath::new("default-app-id");
        assert_eq!(
            path.bucket_name(),
            "artifacts_default-app-id_public_data_dept_reports_2025"
        );

        let odd = CollectionPath::new("acme.portal/v2");
        assert_eq!(
            odd.bucket_name(),
            "artifacts_acme_portal_v2_public_data_dept_reports_2025"
        );
    }

    #[tokio::test]
    async fn test_in_memory_store_upserts_by_key() {
        let store = InMemoryReportStore::new();

        let (cs_key, cs_doc) = submitted("CS Dept");
        let (civil_key, civil_doc) = submitted("Civil");
        store.upsert(&cs_key, &cs_doc).await.unwrap();
        store.upsert(&civil_key, &civil_doc).await.unwrap();

        let (_, cs_doc2) = submitted("CS Dept");
        store.upsert(&cs_key, &cs_doc2).await.unwrap();

        let all = store.fetch_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, "csdept", "overwrite keeps position");
        assert_eq!(all[1].id, "civil");
        assert_eq!(all[0].submitted_at, cs_doc2.submitted_at);
    }

    #[tokio::test]
    async fn test_in_memory_store_publishes_snapshots() {
        let store = InMemoryReportStore::new();
        let mut rx = store.subscribe().await.unwrap();
        assert!(rx.borrow().is_empty());

        let (key, doc) = submitted("Mechanical");
        store.upsert(&key, &doc).await.unwrap();

        rx.changed().await.unwrap();
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, "mechanical");
    }

    #[tokio::test]
    async fn test_local_store_round_trips_through_storage() {
        let storage: Arc<dyn LocalStorage> = Arc::new(InMemoryStorage::new());
        let store = LocalReportStore::new(Arc::clone(&storage));

        let (key, doc) = submitted("CS Dept");
        store.upsert(&key, &doc).await.unwrap();
        let (_, newer) = submitted("CS Dept");
        store.upsert(&key, &newer).await.unwrap();

        let all = store.fetch_all().await.unwrap();
        assert_eq!(all.len(), 1, "same key replaces, never duplicates");
        assert_eq!(all[0].submitted_at, newer.submitted_at);

        // The list is visible to a second store over the same storage.
        let reopened = LocalReportStore::new(Arc::clone(&storage));
        let all = reopened.fetch_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, "csdept");
    }

    #[tokio::test]
    async fn test_local_store_degrades_on_corrupt_list() {
        let storage: Arc<dyn LocalStorage> = Arc::new(InMemoryStorage::new());
        storage.set(OFFLINE_REPORTS_KEY, "{definitely not a list").unwrap();

        let store = LocalReportStore::new(Arc::clone(&storage));
        assert!(store.fetch_all().await.unwrap().is_empty());

        // A fresh upsert replaces the corrupt value entirely.
        let (key, doc) = submitted("EnTC");
        store.upsert(&key, &doc).await.unwrap();
        assert_eq!(store.fetch_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_probe_without_nats_selects_offline() {
        let storage: Arc<dyn LocalStorage> = Arc::new(InMemoryStorage::new());
        let (store, mode) =
            select_report_store(None, CollectionPath::new("default-app-id"), storage).await;

        assert_eq!(mode, StorageMode::Offline);
        assert!(mode.is_offline());
        assert!(store.fetch_all().await.unwrap().is_empty());
    }
}
