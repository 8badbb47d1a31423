// Copyright 2025 Cowboy AI, LLC.

//! Report Schema Export Tool
//!
//! Extracts JSON schemas from the report document structs in
//! dept-report-domain and outputs them as standalone JSON files, so
//! dashboards and importers in other languages can validate submissions
//! without linking this crate.

use dept_report_domain::{
    AcademicResults, DepartmentDetails, PhotoSlot, Report, SectionItem, SubmittedReport, YearResult,
};
use schemars::{schema_for, JsonSchema};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Generate schema for a type
fn generate_schema<T: JsonSchema>() -> anyhow::Result<serde_json::Value> {
    let schema = schema_for!(T);
    Ok(serde_json::to_value(schema)?)
}

/// Export the report document schemas
fn export_report_schemas(output_dir: &Path) -> anyhow::Result<HashMap<String, serde_json::Value>> {
    let mut schemas = HashMap::new();

    // Create output directory
    fs::create_dir_all(output_dir)?;

    // Building blocks
    println!("Generating schema for: SectionItem");
    let schema = generate_schema::<SectionItem>()?;
    schemas.insert("SectionItem".to_string(), schema.clone());
    fs::write(
        output_dir.join("SectionItem.json"),
        serde_json::to_string_pretty(&schema)?,
    )?;

    println!("Generating schema for: DepartmentDetails");
    let schema = generate_schema::<DepartmentDetails>()?;
    schemas.insert("DepartmentDetails".to_string(), schema.clone());
    fs::write(
        output_dir.join("DepartmentDetails.json"),
        serde_json::to_string_pretty(&schema)?,
    )?;

    println!("Generating schema for: YearResult");
    let schema = generate_schema::<YearResult>()?;
    schemas.insert("YearResult".to_string(), schema.clone());
    fs::write(
        output_dir.join("YearResult.json"),
        serde_json::to_string_pretty(&schema)?,
    )?;

    println!("Generating schema for: AcademicResults");
    let schema = generate_schema::<AcademicResults>()?;
    schemas.insert("AcademicResults".to_string(), schema.clone());
    fs::write(
        output_dir.join("AcademicResults.json"),
        serde_json::to_string_pretty(&schema)?,
    )?;

    println!("Generating schema for: PhotoSlot");
    let schema = generate_schema::<PhotoSlot>()?;
    schemas.insert("PhotoSlot".to_string(), schema.clone());
    fs::write(
        output_dir.join("PhotoSlot.json"),
        serde_json::to_string_pretty(&schema)?,
    )?;

    // Full documents
    println!("Generating schema for: Report");
    let schema = generate_schema::<Report>()?;
    schemas.insert("Report".to_string(), schema.clone());
    fs::write(
        output_dir.join("Report.json"),
        serde_json::to_string_pretty(&schema)?,
    )?;

    println!("Generating schema for: SubmittedReport");
    let schema = generate_schema::<SubmittedReport>()?;
    schemas.insert("SubmittedReport".to_string(), schema.clone());
    fs::write(
        output_dir.join("SubmittedReport.json"),
        serde_json::to_string_pretty(&schema)?,
    )?;

    // Create a schema index
    let index = serde_json::json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "$id": "https://schemas.thecowboyai.com/dept-report-domain/index.json",
        "title": "Department Report Schema Index",
        "description": "Index of all department annual report document schemas",
        "version": "0.3.0",
        "schemas": schemas.keys().map(|name| {
            serde_json::json!({
                "name": name,
                "file": format!("{}.json", name),
                "url": format!("https://schemas.thecowboyai.com/dept-report-domain/{}.json", name)
            })
        }).collect::<Vec<_>>()
    });

    fs::write(
        output_dir.join("index.json"),
        serde_json::to_string_pretty(&index)?,
    )?;

    // Create a combined schema file
    let all_schemas = serde_json::json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "$id": "https://schemas.thecowboyai.com/dept-report-domain/all-schemas.json",
        "title": "Department Report All Schemas",
        "description": "Combined collection of all department annual report document schemas",
        "version": "0.3.0",
        "schemas": schemas
    });

    fs::write(
        output_dir.join("all-schemas.json"),
        serde_json::to_string_pretty(&all_schemas)?,
    )?;

    Ok(schemas)
}

fn main() -> anyhow::Result<()> {
    let output_dir = Path::new("schemas");

    println!("Exporting department report schemas to: {}", output_dir.display());

    let schemas = export_report_schemas(output_dir)?;

    println!("\n✅ Successfully exported {} schemas:", schemas.len());
    for schema_name in schemas.keys() {
        println!("  - {}", schema_name);
    }

    println!("\n📄 Files created:");
    println!("  - schemas/index.json (schema index)");
    println!("  - schemas/all-schemas.json (combined schemas)");
    for schema_name in schemas.keys() {
        println!("  - schemas/{}.json", schema_name);
    }

    println!("\n💡 These schemas can be used for:");
    println!("  - Submission payload validation");
    println!("  - Dashboard importers in other languages");
    println!("  - API documentation generation");

    Ok(())
}
