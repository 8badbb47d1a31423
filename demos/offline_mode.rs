//! Offline operation and draft recovery
//!
//! This example shows:
//! - Running without any NATS endpoint configured
//! - Submissions landing in the durable offline list
//! - A draft surviving a portal restart
//!
//! Everything is written under a temp directory and persists across runs;
//! resubmitting the same department replaces its entry in the list.

use dept_report_domain::{
    AnonymousIdentityProvider, DepartmentField, FieldPath, FileStorage, ListSection, LocalStorage,
    PortalConfig, ReportEdit, ReportPortal, SubmitOutcome, SubmittedReport, OFFLINE_REPORTS_KEY,
};

fn demo_config() -> PortalConfig {
    PortalConfig {
        nats: None,
        storage_dir: std::env::temp_dir().join("dept-report-offline-demo"),
        ..PortalConfig::default()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("=== Offline Mode Demo ===\n");

    // First session: draft some data and submit.
    {
        let mut portal = ReportPortal::start(demo_config()).await?;
        println!("Storage mode: {:?}", portal.storage_mode());
        portal.sign_in(&AnonymousIdentityProvider).await;

        portal.apply(ReportEdit::Field {
            path: FieldPath::Department(DepartmentField::DeptName),
            value: "Mechanical".to_string(),
        })?;
        portal.apply(ReportEdit::AddBlankItem {
            section: ListSection::Workshops,
        })?;

        match portal.submit().await {
            SubmitOutcome::Submitted(key) => {
                println!("✓ Stored in the offline list under '{key}'")
            }
            outcome => println!("✗ Unexpected outcome: {outcome:?}"),
        }

        // Leave an unsubmitted edit behind as the draft.
        portal.apply(ReportEdit::Field {
            path: FieldPath::Department(DepartmentField::HodName),
            value: "Dr. A. Deshmukh".to_string(),
        })?;
        println!("Session one ends with an unsubmitted HOD edit\n");
    }

    // Second session: the draft and the offline list are both still there.
    let portal = ReportPortal::start(demo_config()).await?;
    let report = portal.report();
    println!("Restored draft for '{}'", report.department_details.dept_name);
    println!(
        "  HOD (unsubmitted edit survived): {}",
        report.department_details.hod_name
    );
    println!("  Workshops drafted: {}", report.workshops.len());

    // The offline list is plain JSON in local storage.
    let storage = FileStorage::new(demo_config().storage_dir);
    if let Some(json) = storage.get(OFFLINE_REPORTS_KEY)? {
        let list: Vec<SubmittedReport> = serde_json::from_str(&json)?;
        println!("\nOffline list holds {} report(s):", list.len());
        for doc in &list {
            println!("  {} (submitted {})", doc.id, doc.submitted_at);
        }
    }

    println!("\n✅ Offline demo complete");
    Ok(())
}
