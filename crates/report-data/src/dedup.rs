//! Per-axis deduplication.
//!
//! The raw export has one row per ticket message, so each axis gets its own
//! view holding one representative row per (ticket id, axis grouping keys).

use std::collections::HashSet;

use report_core::config::{Axis, DedupStrategy, ReportConfig};
use report_core::models::{Dimension, TicketRecord};
use tracing::{debug, warn};

use crate::normalizer::ColumnResolution;

/// The deduplicated records one axis is aggregated over.
#[derive(Debug, Clone)]
pub struct DedupView<'a> {
    pub axis: Axis,
    pub keys: Vec<Dimension>,
    pub records: Vec<&'a TicketRecord>,
    /// Kept rows that carry no ticket id and so could not be deduplicated.
    pub unidentified: usize,
}

impl DedupView<'_> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Builds [`DedupView`]s according to the configured policy.
pub struct Deduplicator<'c> {
    config: &'c ReportConfig,
    restrict_to_closed: bool,
}

impl<'c> Deduplicator<'c> {
    /// The closed-only restriction applies only when the configuration asks
    /// for it and the data actually has a status column.
    pub fn new(config: &'c ReportConfig, columns: &ColumnResolution) -> Self {
        let restrict_to_closed = config.restrict_to_closed && columns.status.is_some();
        if config.dedup_strategy == DedupStrategy::LegacyRank {
            if columns.rank.is_some() {
                warn!("Using legacy rn == 1 deduplication; results are only correct if rn was ranked per axis");
            } else {
                warn!("Legacy rn deduplication requested but no rank column exists; every view will be empty");
            }
        }
        Self {
            config,
            restrict_to_closed,
        }
    }

    pub fn restricts_to_closed(&self) -> bool {
        self.restrict_to_closed
    }

    /// Deduplicated view of `records` for `axis`, in input order.
    pub fn view<'a>(&self, records: &'a [TicketRecord], axis: Axis) -> DedupView<'a> {
        let keys = self.config.grouping_keys(axis);
        let eligible = records.iter().filter(|r| self.is_eligible(r));

        let kept: Vec<&TicketRecord> = match self.config.dedup_strategy {
            DedupStrategy::TicketId => first_per_ticket(eligible, &keys),
            DedupStrategy::LegacyRank => eligible.filter(|r| r.rn == Some(1)).collect(),
        };

        debug!("Axis {}: {} of {} rows kept", axis, kept.len(), records.len());

        let unidentified = kept.iter().filter(|r| r.ticket_id.is_none()).count();
        if unidentified > 0 {
            warn!(
                "Axis {}: {} row(s) without a ticket id were each counted as a separate ticket",
                axis, unidentified
            );
        }

        DedupView {
            axis,
            keys,
            records: kept,
            unidentified,
        }
    }

    fn is_eligible(&self, record: &TicketRecord) -> bool {
        if !self.restrict_to_closed {
            return true;
        }
        record
            .status
            .as_deref()
            .map(|s| self.config.is_closed(s))
            .unwrap_or(false)
    }
}

/// Keep the first record per (ticket id, values of `keys`). Rows without a
/// ticket id cannot be matched to anything and are always kept.
fn first_per_ticket<'a>(
    records: impl Iterator<Item = &'a TicketRecord>,
    keys: &[Dimension],
) -> Vec<&'a TicketRecord> {
    let mut seen: HashSet<(&'a str, Vec<Option<&'a str>>)> = HashSet::new();
    records
        .filter(|&record| match record.ticket_id.as_deref() {
            Some(id) => {
                let key_values = keys.iter().map(|&d| record.dimension(d)).collect();
                seen.insert((id, key_values))
            }
            None => true,
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
