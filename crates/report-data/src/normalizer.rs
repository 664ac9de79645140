//! Field normalization: resolves logical fields to merged columns and turns
//! every merged row into a typed [`TicketRecord`].

use std::collections::BTreeMap;

use report_core::config::ColumnAliases;
use report_core::data_processors::{clean_text, NumericCleaner, TimestampProcessor};
use report_core::models::{Dimension, Metric, RecordSet, TicketRecord};
use tracing::{debug, warn};

// ── ColumnResolution ──────────────────────────────────────────────────────────

/// Which merged column (by index) backs each logical field. `None` / absent
/// entries mean the source files never carried that field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnResolution {
    pub created: usize,
    pub ticket_id: Option<usize>,
    pub status: Option<usize>,
    pub rank: Option<usize>,
    dimensions: BTreeMap<Dimension, usize>,
    metrics: Vec<(Metric, usize)>,
}

impl ColumnResolution {
    /// Resolve every logical field against `set`'s columns.
    ///
    /// `created_column` must be a column of `set` (the ingestor guarantees it).
    pub fn resolve(set: &RecordSet, created_column: &str, aliases: &ColumnAliases) -> Self {
        let find = |candidates: &[String]| -> Option<usize> {
            candidates.iter().find_map(|alias| {
                set.columns
                    .iter()
                    .position(|c| c.eq_ignore_ascii_case(alias.trim()))
            })
        };

        let dimensions = Dimension::ALL
            .iter()
            .filter_map(|&d| find(aliases.for_dimension(d)).map(|i| (d, i)))
            .collect();
        let metrics = Metric::ALL
            .iter()
            .filter_map(|&m| find(aliases.for_metric(m)).map(|i| (m, i)))
            .collect();

        Self {
            created: set.column_index(created_column).unwrap_or_default(),
            ticket_id: find(&aliases.ticket_id),
            status: find(&aliases.status),
            rank: find(&aliases.rank),
            dimensions,
            metrics,
        }
    }

    pub fn has_dimension(&self, dim: Dimension) -> bool {
        self.dimensions.contains_key(&dim)
    }

    pub fn has_dimensions(&self, dims: &[Dimension]) -> bool {
        dims.iter().all(|&d| self.has_dimension(d))
    }

    pub fn has_metric(&self, metric: Metric) -> bool {
        self.metrics.iter().any(|(m, _)| *m == metric)
    }

    fn metric_column(&self, metric: Metric) -> Option<usize> {
        self.metrics
            .iter()
            .find(|(m, _)| *m == metric)
            .map(|(_, i)| *i)
    }
}

// ── NormalizedRecords ─────────────────────────────────────────────────────────

/// Output of [`normalize`].
#[derive(Debug, Clone)]
pub struct NormalizedRecords {
    pub records: Vec<TicketRecord>,
    pub columns: ColumnResolution,
    /// Rows whose creation timestamp could not be parsed. They stay in
    /// `records` but fall out of every time-bucketed aggregate.
    pub unparsable_timestamps: usize,
}

/// Normalize every row of `set`.
pub fn normalize(set: &RecordSet, created_column: &str, aliases: &ColumnAliases) -> NormalizedRecords {
    let columns = ColumnResolution::resolve(set, created_column, aliases);

    if columns.ticket_id.is_none() {
        warn!("No ticket id column found; every row is treated as its own ticket");
    }
    for metric in Metric::ALL {
        if !columns.has_metric(metric) {
            warn!("No column found for {:?}; its statistics will be missing", metric);
        }
    }

    let cell = |row: &[String], idx: Option<usize>| -> Option<String> {
        idx.and_then(|i| row.get(i)).and_then(|s| clean_text(s))
    };
    let number = |row: &[String], idx: Option<usize>| -> Option<f64> {
        idx.and_then(|i| row.get(i)).and_then(|s| NumericCleaner::clean(s))
    };
    let dim = |d: Dimension| columns.dimensions.get(&d).copied();

    let mut unparsable_timestamps = 0usize;
    let records: Vec<TicketRecord> = set
        .rows
        .iter()
        .map(|row| {
            let created_at = row
                .get(columns.created)
                .and_then(|s| TimestampProcessor::parse_str(s));
            if created_at.is_none() {
                unparsable_timestamps += 1;
            }
            TicketRecord {
                ticket_id: cell(row, columns.ticket_id),
                created_at,
                status: cell(row, columns.status),
                channel: cell(row, dim(Dimension::Channel)),
                business_line: cell(row, dim(Dimension::BusinessLine)),
                country: cell(row, dim(Dimension::Country)),
                class_one: cell(row, dim(Dimension::ClassOne)),
                class_two: cell(row, dim(Dimension::ClassTwo)),
                reply_count: number(row, columns.metric_column(Metric::ReplyCount)),
                first_response_duration: number(
                    row,
                    columns.metric_column(Metric::FirstResponseDuration),
                ),
                handling_duration: number(row, columns.metric_column(Metric::HandlingDuration)),
                rn: columns
                    .rank
                    .and_then(|i| row.get(i))
                    .and_then(|s| NumericCleaner::clean_integer(s)),
            }
        })
        .collect();

    if unparsable_timestamps > 0 {
        warn!(
            "{} row(s) have an unparsable creation time and are excluded from time buckets",
            unparsable_timestamps
        );
    }
    debug!("Normalized {} records", records.len());

    NormalizedRecords {
        records,
        columns,
        unparsable_timestamps,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
