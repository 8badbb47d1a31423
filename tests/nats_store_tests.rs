//! Integration tests for the NATS-backed report store
//!
//! These tests require a running NATS server with JetStream enabled:
//! ```bash
//! docker run -d --name nats-test -p 4222:4222 nats:latest -js
//! ```

use std::time::Duration;

use dept_report_domain::{
    CollectionPath, DepartmentField, FieldPath, NatsClient, NatsConfig, NatsReportStore, Report,
    ReportKey, ReportStore, SessionIdentity, SubmittedReport,
};
use uuid::Uuid;

async fn open_store() -> NatsReportStore {
    let client = NatsClient::connect(NatsConfig::default()).await.unwrap();
    // A fresh collection per run keeps tests isolated from leftover buckets.
    let path = CollectionPath::new(format!("it-{}", Uuid::new_v4().simple()));
    NatsReportStore::new(&client, path).await.unwrap()
}

fn submitted(dept_name: &str) -> (ReportKey, SubmittedReport) {
    let report = Report::default()
        .update_field(FieldPath::Department(DepartmentField::DeptName), dept_name);
    let key = ReportKey::derive(dept_name);
    let document = SubmittedReport::stamp(report, &key, &SessionIdentity::offline());
    (key, document)
}

#[tokio::test]
#[ignore] // Requires NATS server to be running
async fn test_upsert_and_fetch_all() {
    let store = open_store().await;
    assert!(store.fetch_all().await.unwrap().is_empty());

    let (cs_key, cs_doc) = submitted("CS Dept");
    let (civil_key, civil_doc) = submitted("Civil");
    store.upsert(&cs_key, &cs_doc).await.unwrap();
    store.upsert(&civil_key, &civil_doc).await.unwrap();

    let all = store.fetch_all().await.unwrap();
    assert_eq!(all.len(), 2);
    let ids: Vec<&str> = all.iter().map(|doc| doc.id.as_str()).collect();
    assert!(ids.contains(&"csdept"));
    assert!(ids.contains(&"civil"));
}

#[tokio::test]
#[ignore] // Requires NATS server
async fn test_resubmission_replaces_document() {
    let store = open_store().await;

    let (key, first) = submitted("CS Dept");
    store.upsert(&key, &first).await.unwrap();

    let (_, second) = submitted("CS Dept");
    store.upsert(&key, &second).await.unwrap();

    let all = store.fetch_all().await.unwrap();
    assert_eq!(all.len(), 1, "one document per derived key");
    assert_eq!(all[0].submitted_at, second.submitted_at);
}

#[tokio::test]
#[ignore] // Requires NATS server
async fn test_subscription_sees_new_submissions() {
    let store = open_store().await;
    let mut rx = store.subscribe().await.unwrap();
    assert!(rx.borrow_and_update().is_empty());

    let (key, doc) = submitted("Mechanical");
    store.upsert(&key, &doc).await.unwrap();

    let snapshot = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if !rx.borrow_and_update().is_empty() {
                return rx.borrow().clone();
            }
            rx.changed().await.unwrap();
        }
    })
    .await
    .unwrap();

    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].id, "mechanical");
}

#[tokio::test]
#[ignore] // Requires NATS server
async fn test_subscription_includes_documents_committed_while_subscribing() {
    let client = NatsClient::connect(NatsConfig::default()).await.unwrap();
    let path = CollectionPath::new(format!("it-{}", Uuid::new_v4().simple()));
    let reader = NatsReportStore::new(&client, path.clone()).await.unwrap();
    let writer = NatsReportStore::new(&client, path).await.unwrap();

    let (cs_key, cs_doc) = submitted("CS Dept");
    reader.upsert(&cs_key, &cs_doc).await.unwrap();

    // A second department submits while the subscription is being
    // established. Whichever side of the watcher registration the write
    // lands on, it must surface in a snapshot without being written again.
    let (civil_key, civil_doc) = submitted("Civil");
    let racing_put = tokio::spawn(async move { writer.upsert(&civil_key, &civil_doc).await });
    let mut rx = reader.subscribe().await.unwrap();
    racing_put.await.unwrap().unwrap();

    let snapshot = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if rx.borrow_and_update().len() == 2 {
                return rx.borrow().clone();
            }
            rx.changed().await.unwrap();
        }
    })
    .await
    .unwrap();

    let ids: Vec<&str> = snapshot.iter().map(|doc| doc.id.as_str()).collect();
    assert!(ids.contains(&"csdept"));
    assert!(ids.contains(&"civil"));
}
