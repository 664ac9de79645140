//! Main analysis pipeline for the ticket report.
//!
//! Orchestrates reading, merging, normalization, filtering, per-axis
//! deduplication, aggregation and change computation, returning an
//! [`AnalysisResult`] ready for export.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::time::Instant;

use chrono::Utc;
use report_core::config::{Axis, ReportConfig};
use report_core::error::Result;
use report_core::models::{Dimension, RawTable};
use tracing::info;

use crate::aggregator::Aggregator;
use crate::assembler::{ResultAssembler, ResultTable, TABLE_SPECS};
use crate::change::compute_changes;
use crate::dedup::{DedupView, Deduplicator};
use crate::filter::FilterPredicate;
use crate::ingest::{ingest, SourceFailure};
use crate::normalizer::normalize;
use crate::reader::{find_input_files, load_tables};

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside the result tables.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AnalysisMetadata {
    /// ISO-8601 timestamp when this result was generated.
    pub generated_at: String,
    pub files_read: usize,
    pub files_failed: usize,
    /// Rows in the merged record set, after footer and empty-row removal.
    pub rows_merged: usize,
    pub footer_rows_dropped: usize,
    pub empty_rows_dropped: usize,
    pub rows_after_filter: usize,
    pub unparsable_timestamps: usize,
    pub restricted_to_closed: bool,
    /// Deduplicated view size per axis that produced at least one table.
    pub dedup_view_sizes: BTreeMap<Axis, usize>,
    pub tables_produced: Vec<String>,
    /// Outputs left out because a grouping column is absent.
    pub tables_skipped: Vec<String>,
    /// Wall-clock seconds spent reading and merging the inputs.
    pub load_time_seconds: f64,
    /// Wall-clock seconds spent from normalization to assembly.
    pub transform_time_seconds: f64,
}

/// The complete output of [`analyze_tickets`].
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// Named result tables, in export order.
    pub tables: Vec<ResultTable>,
    /// Inputs that could not be decoded.
    pub failures: Vec<SourceFailure>,
    pub metadata: AnalysisMetadata,
}

impl AnalysisResult {
    pub fn table(&self, name: &str) -> Option<&ResultTable> {
        self.tables.iter().find(|t| t.name == name)
    }
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Run the full pipeline over export files found under `inputs`.
///
/// `selections` holds the user's inclusion sets (channel, brand line, ...).
///
/// # Errors
/// Fails when no input could be read, the creation-timestamp column is
/// missing, or a selection on a present dimension is empty.
pub fn analyze_tickets(
    inputs: &[PathBuf],
    selections: &BTreeMap<Dimension, Vec<String>>,
    config: &ReportConfig,
) -> Result<AnalysisResult> {
    let files = find_input_files(inputs);
    info!("Found {} input file(s)", files.len());
    analyze_tables(load_tables(&files), selections, config)
}

/// Run the pipeline over already-decoded tables (or their decode errors).
pub fn analyze_tables(
    tables: Vec<Result<RawTable>>,
    selections: &BTreeMap<Dimension, Vec<String>>,
    config: &ReportConfig,
) -> Result<AnalysisResult> {
    // ── Step 1: Merge ─────────────────────────────────────────────────────────
    let load_start = Instant::now();
    let ingested = ingest(tables, config)?;
    let load_time = load_start.elapsed().as_secs_f64();

    // ── Step 2: Normalize and filter ──────────────────────────────────────────
    let transform_start = Instant::now();
    let normalized = normalize(&ingested.records, &ingested.created_column, &config.columns);
    let predicate = FilterPredicate::compose(selections, &normalized.columns)?;
    let records = predicate.apply(&normalized.records);

    // ── Step 3: Per-axis views ────────────────────────────────────────────────
    let dedup = Deduplicator::new(config, &normalized.columns);
    let assembler = ResultAssembler::new(config, &normalized.columns);
    let specs = assembler.available_specs();

    let mut views: HashMap<Axis, DedupView<'_>> = HashMap::new();
    for spec in &specs {
        views
            .entry(spec.axis)
            .or_insert_with(|| dedup.view(&records, spec.axis));
    }
    let dedup_view_sizes: BTreeMap<Axis, usize> =
        views.iter().map(|(axis, view)| (*axis, view.len())).collect();
    for (axis, size) in &dedup_view_sizes {
        info!("Deduplicated {} view: {} rows", axis, size);
    }

    // ── Step 4: Aggregate, change, assemble ───────────────────────────────────
    let mut tables = Vec::with_capacity(specs.len());
    for spec in &specs {
        let Some(view) = views.get(&spec.axis) else {
            continue;
        };
        let rows = Aggregator::new(spec.grain).aggregate(view);
        let table = assembler.assemble(spec, &compute_changes(rows));
        info!("Assembled {} with {} rows", table.name, table.len());
        tables.push(table);
    }

    let tables_skipped: Vec<String> = TABLE_SPECS
        .iter()
        .filter(|spec| !specs.contains(spec))
        .map(|spec| {
            info!(
                "Skipping {}: source has no column for every {} grouping key",
                spec.name, spec.axis
            );
            spec.name.to_string()
        })
        .collect();
    let transform_time = transform_start.elapsed().as_secs_f64();

    // ── Step 5: Build result ──────────────────────────────────────────────────
    let metadata = AnalysisMetadata {
        generated_at: Utc::now().to_rfc3339(),
        files_read: ingested.tables_read,
        files_failed: ingested.failures.len(),
        rows_merged: ingested.records.len(),
        footer_rows_dropped: ingested.footer_rows_dropped,
        empty_rows_dropped: ingested.empty_rows_dropped,
        rows_after_filter: records.len(),
        unparsable_timestamps: normalized.unparsable_timestamps,
        restricted_to_closed: dedup.restricts_to_closed(),
        dedup_view_sizes,
        tables_produced: tables.iter().map(|t| t.name.clone()).collect(),
        tables_skipped,
        load_time_seconds: load_time,
        transform_time_seconds: transform_time,
    };

    Ok(AnalysisResult {
        tables,
        failures: ingested.failures,
        metadata,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::Cell;
    use report_core::error::ReportError;
    use std::path::Path;
    use tempfile::TempDir;

    /// Footer row appended to every fixture, as the export system does.
    const FOOTER: &str = "total,,,,,,";

    const HEADER: &str =
        "ticket_id,ticket_created_time,ticket_status,ticket_channel,business_line,message_count,处理时长";

    fn write_csv(dir: &Path, name: &str, rows: &[&str]) -> PathBuf {
        let mut content = String::from(HEADER);
        content.push('\n');
        for row in rows {
            content.push_str(row);
            content.push('\n');
        }
        content.push_str(FOOTER);
        content.push('\n');
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn none() -> BTreeMap<Dimension, Vec<String>> {
        BTreeMap::new()
    }

    // ── analyze_tickets ───────────────────────────────────────────────────────

    #[test]
    fn test_analyze_directory() {
        let dir = TempDir::new().unwrap();
        write_csv(
            dir.path(),
            "jan.csv",
            &[
                "T1,2024-01-03 10:00:00,closed,email,B2C,4,60",
                "T2,2024-01-09 11:00:00,closed,chat,B2B,2,30",
                "T3,2024-01-10 11:00:00,open,chat,B2B,9,5",
            ],
        );
        write_csv(
            dir.path(),
            "feb.csv",
            &["T4,2024-02-01 08:00:00,closed,email,B2C,6,90"],
        );

        let result = analyze_tickets(&[dir.path().to_path_buf()], &none(), &ReportConfig::default())
            .unwrap();

        assert_eq!(result.metadata.files_read, 2);
        assert_eq!(result.metadata.footer_rows_dropped, 2);
        assert_eq!(result.metadata.rows_merged, 4);
        assert!(result.metadata.restricted_to_closed);
        assert_eq!(
            result.metadata.tables_produced,
            vec!["overall_by_month", "overall_by_year", "by_brand_line", "by_channel"]
        );
        assert_eq!(result.metadata.tables_skipped.len(), 3);
        assert_eq!(result.metadata.dedup_view_sizes[&Axis::Overall], 3);

        let monthly = result.table("overall_by_month").unwrap();
        assert_eq!(monthly.len(), 2);
        let tickets = monthly.column_index("Tickets").unwrap();
        assert_eq!(monthly.rows[0][tickets], Cell::Number(2.0));
        assert_eq!(monthly.rows[1][tickets], Cell::Number(1.0));
        assert_eq!(
            monthly.rows[1][monthly.column_index("Tickets MoM").unwrap()],
            Cell::Change(-0.5)
        );
    }

    #[test]
    fn test_selection_narrows_every_table() {
        let dir = TempDir::new().unwrap();
        let file = write_csv(
            dir.path(),
            "jan.csv",
            &[
                "T1,2024-01-03,closed,email,B2C,4,60",
                "T2,2024-01-09,closed,chat,B2B,2,30",
            ],
        );
        let selections = BTreeMap::from([(Dimension::Channel, vec!["chat".to_string()])]);

        let result = analyze_tickets(&[file], &selections, &ReportConfig::default()).unwrap();
        assert_eq!(result.metadata.rows_after_filter, 1);

        let by_channel = result.table("by_channel").unwrap();
        assert_eq!(by_channel.len(), 1);
        assert_eq!(by_channel.rows[0][1], Cell::Text("chat".into()));
    }

    #[test]
    fn test_empty_selection_is_no_data() {
        let dir = TempDir::new().unwrap();
        let file = write_csv(dir.path(), "jan.csv", &["T1,2024-01-03,closed,email,B2C,4,60"]);
        let selections = BTreeMap::from([(Dimension::BusinessLine, Vec::new())]);

        let err = analyze_tickets(&[file], &selections, &ReportConfig::default()).unwrap_err();
        assert!(matches!(err, ReportError::NoData(_)));
    }

    #[test]
    fn test_partial_failure_is_reported() {
        let dir = TempDir::new().unwrap();
        let good = write_csv(dir.path(), "jan.csv", &["T1,2024-01-03,closed,email,B2C,4,60"]);
        let bad = dir.path().join("feb.xlsx");
        std::fs::write(&bad, "PK").unwrap();

        let result = analyze_tickets(&[good, bad], &none(), &ReportConfig::default()).unwrap();
        assert_eq!(result.metadata.files_read, 1);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].source_name, "feb.xlsx");
    }

    #[test]
    fn test_no_inputs_is_no_data() {
        let dir = TempDir::new().unwrap();
        let err = analyze_tickets(&[dir.path().to_path_buf()], &none(), &ReportConfig::default())
            .unwrap_err();
        assert!(matches!(err, ReportError::NoData(_)));
    }

    #[test]
    fn test_include_open_tickets() {
        let dir = TempDir::new().unwrap();
        let file = write_csv(
            dir.path(),
            "jan.csv",
            &[
                "T1,2024-01-03,closed,email,B2C,4,60",
                "T2,2024-01-04,open,email,B2C,4,60",
            ],
        );
        let cfg = ReportConfig {
            restrict_to_closed: false,
            ..Default::default()
        };
        let result = analyze_tickets(&[file], &none(), &cfg).unwrap();
        assert!(!result.metadata.restricted_to_closed);
        assert_eq!(result.metadata.dedup_view_sizes[&Axis::Overall], 2);
    }
}
