//! Writers for the named result tables.
//!
//! The pipeline produces display-ready [`ResultTable`]s; this crate only
//! serializes them: one workbook with a sheet per table, one CSV file per
//! table, or a single JSON document.

pub mod csv_files;
pub mod json;
pub mod xlsx;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use report_core::error::{ReportError, Result};
use report_data::aggregator::Statistic;
use report_data::analysis::AnalysisResult;
use report_data::assembler::ResultTable;
use tracing::info;

/// File name stem used for single-file exports.
pub const REPORT_STEM: &str = "ticket_report";

// ── ExportFormat ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Csv,
    Json,
}

impl FromStr for ExportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xlsx" => Ok(Self::Xlsx),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(ReportError::Config(format!(
                "unknown export format '{}' (expected xlsx, csv or json)",
                other
            ))),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
            Self::Json => "json",
        };
        f.write_str(s)
    }
}

// ── Public function ───────────────────────────────────────────────────────────

/// Write `result` into `output_dir` (created if needed) and return the paths
/// of the files written.
pub fn export(result: &AnalysisResult, format: ExportFormat, output_dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)?;

    let written = match format {
        ExportFormat::Xlsx => {
            let path = output_dir.join(format!("{}.xlsx", REPORT_STEM));
            xlsx::write_workbook(&result.tables, &path)?;
            vec![path]
        }
        ExportFormat::Csv => csv_files::write_tables(&result.tables, output_dir)?,
        ExportFormat::Json => {
            let path = output_dir.join(format!("{}.json", REPORT_STEM));
            json::write_document(result, &path)?;
            vec![path]
        }
    };

    for path in &written {
        info!("Wrote {}", path.display());
    }
    Ok(written)
}

/// `true` for the column holding ticket volume, which is written as an
/// integer rather than a two-decimal statistic.
pub(crate) fn is_count_column(table: &ResultTable, col: usize) -> bool {
    table
        .columns
        .get(col)
        .map(|c| c == Statistic::TicketVolume.label())
        .unwrap_or(false)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
