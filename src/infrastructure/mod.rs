// Copyright 2025 Cowboy AI, LLC.

//! Infrastructure layer for dept-report-domain
//!
//! This module contains all infrastructure concerns including:
//! - NATS client and JetStream integration
//! - The shared report collection and its offline fallback
//! - Durable local storage for drafts and the offline list

pub mod document_store;
pub mod local_store;
pub mod nats_client;

pub use document_store::{
    select_report_store, CollectionPath, InMemoryReportStore, LocalReportStore, NatsReportStore,
    ReportStore, StorageMode, StoreError, OFFLINE_REPORTS_KEY, REPORT_COLLECTION,
};
pub use local_store::{FileStorage, InMemoryStorage, LocalStorage, LocalStoreError};
pub use nats_client::{NatsClient, NatsConfig, NatsError};
