//! Live dashboard feed of submitted reports
//!
//! The feed pumps whole-collection snapshots from the report store into a
//! locally owned channel. Consumers only ever see complete snapshots; a
//! slow consumer skips intermediate ones. When the pump stops, the last
//! snapshot stays readable.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;
use tokio_stream::StreamExt;
use tracing::debug;

use crate::infrastructure::{ReportStore, StoreError};
use crate::schema::SubmittedReport;

/// Snapshot feed over a report store subscription
pub struct ReportFeed {
    rx: watch::Receiver<Vec<SubmittedReport>>,
    task: JoinHandle<()>,
}

impl ReportFeed {
    /// Start pumping snapshots from the store
    pub async fn start(store: Arc<dyn ReportStore>) -> Result<Self, StoreError> {
        let mut source = store.subscribe().await?;
        let initial = source.borrow_and_update().clone();
        let (tx, rx) = watch::channel(initial);

        let mut snapshots = WatchStream::new(source);
        let task = tokio::spawn(async move {
            while let Some(snapshot) = snapshots.next().await {
                debug!(reports = snapshot.len(), "Dashboard feed updated");
                if tx.send(snapshot).is_err() {
                    break;
                }
            }
            debug!("Dashboard feed pump stopped");
        });

        Ok(Self { rx, task })
    }

    /// The latest snapshot
    pub fn reports(&self) -> Vec<SubmittedReport> {
        self.rx.borrow().clone()
    }

    /// Subscribe to snapshot changes
    pub fn subscribe(&self) -> watch::Receiver<Vec<SubmittedReport>> {
        self.rx.clone()
    }

    /// Stop the pump; the last snapshot stays readable
    pub fn shutdown(&self) {
        self.task.abort();
    }
}

impl Drop for ReportFeed {
    fn drop(&mut self) {
        self.task.abort();
    }
}
