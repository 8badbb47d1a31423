// Copyright 2025 Cowboy AI, LLC.

//! Walkthrough of a full data-entry session
//!
//! This example shows:
//! - Starting the portal and establishing an identity
//! - Entering data across sections with copy-on-write edits
//! - Exporting the report as JSON
//! - Submitting to the report store and watching the status machine
//! - Unlocking the password-gated dashboard
//!
//! Set `DEPT_PORTAL_NATS_URL` to run against a NATS server; without it the
//! portal falls back to the offline list.

use anyhow::Context;
use dept_report_domain::{
    AnonymousIdentityProvider, DepartmentField, FieldPath, ListSection, PhotoEdit, PortalConfig,
    ReportEdit, ReportPortal, ResultMetric, SubmitOutcome, YearTag, SECTION_CATALOG,
};
use serde_json::Value;

const DASHBOARD_PASSWORD: &str = "demo-pass";
// SHA-256 hex of DASHBOARD_PASSWORD. Deployments configure the gate the same
// way, through DEPT_PORTAL_ADMIN_SHA256; the cleartext is never stored.
const DASHBOARD_PASSWORD_SHA256: &str =
    "02ccf27105554b9a7fc512ba9f40b863ff974c35487512a7ea8b0e661f831b12";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("=== Department Report Portal Walkthrough ===\n");

    let mut config = PortalConfig::from_env();
    config.storage_dir = std::env::temp_dir().join("dept-report-walkthrough");
    config.admin_password_sha256 = Some(DASHBOARD_PASSWORD_SHA256.to_string());

    let mut portal = ReportPortal::start(config).await?;
    println!("Storage mode: {:?}", portal.storage_mode());

    let identity = portal.sign_in(&AnonymousIdentityProvider).await;
    println!("Signed in as {} (anonymous: {})\n", identity.uid, identity.is_anonymous);

    // The fixed navigation catalog
    println!("=== Sections ===");
    for (index, section) in SECTION_CATALOG.iter().enumerate() {
        println!("  {:>2}. {}", index + 1, section.title);
    }

    println!("\n=== Data Entry ===");
    portal.apply(ReportEdit::Field {
        path: FieldPath::Department(DepartmentField::DeptName),
        value: "Computer Engineering".to_string(),
    })?;
    portal.apply(ReportEdit::Field {
        path: FieldPath::Department(DepartmentField::HodName),
        value: "Dr. S. Patil".to_string(),
    })?;
    portal.apply(ReportEdit::Field {
        path: FieldPath::Academic(YearTag::Ty, ResultMetric::Percent),
        value: "92.4".to_string(),
    })?;

    portal.apply(ReportEdit::AddBlankItem {
        section: ListSection::Toppers,
    })?;
    portal.apply(ReportEdit::Item {
        section: ListSection::Toppers,
        index: 0,
        field: "name".to_string(),
        value: Value::String("A. Kulkarni".to_string()),
    })?;
    portal.apply(ReportEdit::Item {
        section: ListSection::Toppers,
        index: 0,
        field: "rank".to_string(),
        value: Value::String("1".to_string()),
    })?;

    portal.apply(ReportEdit::Photo {
        slot: 0,
        edit: PhotoEdit::Event("Tech fest inauguration".to_string()),
    })?;
    portal.apply(ReportEdit::Highlight {
        index: 0,
        text: "NBA accreditation renewed".to_string(),
    })?;
    println!("✓ Entered details, results, one topper, a photo caption, a highlight");

    println!("\n=== Export ===");
    let path = portal.export_backup().context("writing export file")?;
    println!("✓ Exported {} to {}", portal.export_filename(), path.display());

    println!("\n=== Submission ===");
    match portal.submit().await {
        SubmitOutcome::Submitted(key) => println!("✓ Submitted under key '{key}'"),
        SubmitOutcome::Refused(refusal) => println!("✗ Refused: {}", refusal.advisory()),
        SubmitOutcome::Failed(message) => println!("✗ Failed: {message}"),
    }
    println!("Status: {:?}", portal.status());
    let clear_wait = dept_report_domain::SUCCESS_CLEAR_DELAY + std::time::Duration::from_millis(100);
    tokio::time::sleep(clear_wait).await;
    println!("Status after the clear delay: {:?}", portal.status());

    println!("\n=== Dashboard ===");
    if portal.unlock_dashboard(DASHBOARD_PASSWORD) {
        let reports = portal.dashboard_reports().unwrap_or_default();
        println!("✓ Unlocked, {} submitted report(s):", reports.len());
        for doc in reports {
            println!(
                "  {}: {} (submitted {})",
                doc.id, doc.report.department_details.dept_name, doc.submitted_at
            );
        }
    } else {
        println!("✗ Dashboard unlock rejected");
    }

    println!("\n✅ Walkthrough complete");
    Ok(())
}
