//! Exporting a real analysis result in every format.

use std::collections::BTreeMap;

use report_core::config::ReportConfig;
use report_core::models::RawTable;
use report_data::analysis::{analyze_tables, AnalysisResult};
use report_export::{export, json, ExportFormat};
use tempfile::TempDir;

fn analysis() -> AnalysisResult {
    let header = ["ticket_id", "ticket_created", "ticket_status", "ticket_channel", "message_count", "处理时长"];
    let rows = [
        ["T1", "2024-01-05", "closed", "email", "4", "60"],
        ["T1", "2024-01-05", "closed", "email", "4", "60"],
        ["T2", "2024-02-07", "closed", "chat", "2", ""],
        ["Total", "", "", "", "", ""],
    ];
    let table = RawTable::new(
        "jan.csv",
        header.iter().map(|s| s.to_string()).collect(),
        rows.iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect(),
    );
    analyze_tables(vec![Ok(table)], &BTreeMap::new(), &ReportConfig::default()).unwrap()
}

#[test]
fn xlsx_export_writes_one_workbook() {
    let dir = TempDir::new().unwrap();
    let written = export(&analysis(), ExportFormat::Xlsx, &dir.path().join("out")).unwrap();

    assert_eq!(written.len(), 1);
    assert!(written[0].ends_with("ticket_report.xlsx"));
    let bytes = std::fs::read(&written[0]).unwrap();
    assert!(bytes.starts_with(b"PK"));
}

#[test]
fn csv_export_writes_a_file_per_table() {
    let dir = TempDir::new().unwrap();
    let result = analysis();
    let written = export(&result, ExportFormat::Csv, dir.path()).unwrap();

    assert_eq!(written.len(), result.tables.len());
    let monthly = std::fs::read_to_string(dir.path().join("overall_by_month.csv")).unwrap();
    let lines: Vec<&str> = monthly.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("Month,Tickets,Tickets MoM"));
    assert!(lines[1].starts_with("2024-01,1,-"));
    assert!(lines[2].starts_with("2024-02,1,0.0%"));
}

#[test]
fn json_export_has_tables_and_metadata() {
    let dir = TempDir::new().unwrap();
    let result = analysis();
    let written = export(&result, ExportFormat::Json, dir.path()).unwrap();

    let text = std::fs::read_to_string(&written[0]).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(doc["tables"], json::to_document(&result)["tables"]);
    assert_eq!(doc["metadata"]["files_read"], 1);
    assert_eq!(doc["tables"][0]["name"], "overall_by_month");
    assert_eq!(doc["tables"][0]["rows"][0][0], "2024-01");
}
