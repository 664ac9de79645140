//! Record ingestion: merges decoded tables into one [`RecordSet`].
//!
//! Per table the trailing footer row and fully-empty rows are dropped and
//! header whitespace is trimmed. Tables that failed to decode are reported
//! and skipped; the merge only fails when nothing at all was readable or the
//! creation-timestamp column cannot be located.

use std::collections::HashMap;

use report_core::config::ReportConfig;
use report_core::error::{ReportError, Result};
use report_core::models::{RawTable, RecordSet};
use serde::Serialize;
use tracing::{debug, info, warn};

// ── Public types ──────────────────────────────────────────────────────────────

/// An input that was skipped because it could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFailure {
    pub source_name: String,
    pub reason: String,
}

impl SourceFailure {
    fn from_error(err: &ReportError) -> Self {
        match err {
            ReportError::SourceFormat {
                source_name,
                reason,
            } => Self {
                source_name: source_name.clone(),
                reason: reason.clone(),
            },
            ReportError::FileRead { path, source } => Self {
                source_name: path.display().to_string(),
                reason: source.to_string(),
            },
            other => Self {
                source_name: "<unknown>".to_string(),
                reason: other.to_string(),
            },
        }
    }
}

/// Output of [`ingest`].
#[derive(Debug, Clone)]
pub struct IngestOutput {
    pub records: RecordSet,
    /// Name of the column holding the ticket creation timestamp.
    pub created_column: String,
    pub tables_read: usize,
    pub failures: Vec<SourceFailure>,
    pub footer_rows_dropped: usize,
    pub empty_rows_dropped: usize,
}

// ── Public function ───────────────────────────────────────────────────────────

/// Merge `tables` (in order) into one record set.
///
/// # Errors
/// * [`ReportError::NoData`] when no table decoded successfully.
/// * [`ReportError::Schema`] when no merged column name contains
///   `config.columns.created_keyword`.
pub fn ingest(tables: Vec<Result<RawTable>>, config: &ReportConfig) -> Result<IngestOutput> {
    let total = tables.len();
    let mut merged = RecordSet::default();
    let mut column_lookup: HashMap<String, usize> = HashMap::new();
    let mut failures = Vec::new();
    let mut tables_read = 0usize;
    let mut footer_rows_dropped = 0usize;
    let mut empty_rows_dropped = 0usize;

    for table in tables {
        let table = match table {
            Ok(t) => t,
            Err(e) => {
                warn!("Skipping unreadable input: {}", e);
                failures.push(SourceFailure::from_error(&e));
                continue;
            }
        };
        tables_read += 1;

        let headers = unique_headers(&table.headers);
        let targets: Vec<usize> = headers
            .iter()
            .map(|h| {
                *column_lookup.entry(h.clone()).or_insert_with(|| {
                    merged.columns.push(h.clone());
                    merged.columns.len() - 1
                })
            })
            .collect();

        let mut rows = table.rows;
        if config.drop_footer_row && rows.pop().is_some() {
            footer_rows_dropped += 1;
        }

        let before = merged.rows.len();
        for row in rows {
            if row.iter().all(|cell| cell.trim().is_empty()) {
                empty_rows_dropped += 1;
                continue;
            }
            let mut aligned = vec![String::new(); merged.columns.len()];
            for (cell, &target) in row.into_iter().zip(targets.iter()) {
                aligned[target] = cell;
            }
            merged.rows.push(aligned);
        }
        debug!(
            "Merged {} rows from {}",
            merged.rows.len() - before,
            table.source_name
        );
    }

    if tables_read == 0 {
        return Err(ReportError::NoData(format!(
            "none of the {} input file(s) could be read",
            total
        )));
    }

    // Earlier rows were sized before later tables added columns.
    let width = merged.columns.len();
    for row in merged.rows.iter_mut() {
        row.resize(width, String::new());
    }

    let created_column = merged
        .find_column_containing(&config.columns.created_keyword)
        .map(str::to_string)
        .ok_or_else(|| {
            ReportError::Schema(format!(
                "no creation timestamp column found (expected a column name containing \"{}\")",
                config.columns.created_keyword
            ))
        })?;

    info!(
        "Imported {} of {} file(s), {} rows after merge",
        tables_read,
        total,
        merged.rows.len()
    );

    Ok(IngestOutput {
        records: merged,
        created_column,
        tables_read,
        failures,
        footer_rows_dropped,
        empty_rows_dropped,
    })
}

// ── Private helpers ───────────────────────────────────────────────────────────

/// Trim header names and disambiguate repeats within one table as `name.1`,
/// `name.2`, …
fn unique_headers(headers: &[String]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    headers
        .iter()
        .map(|h| {
            let name = h.trim().trim_start_matches('\u{feff}').to_string();
            let n = seen.entry(name.clone()).or_insert(0);
            let unique = if *n == 0 {
                name
            } else {
                format!("{}.{}", name, n)
            };
            *n += 1;
            unique
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
