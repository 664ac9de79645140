//! Period-over-period change within each dimension group.

use std::collections::BTreeMap;

use report_core::models::DimensionKey;
use report_core::stats::fractional_change;

use crate::aggregator::{GroupedRow, Statistic};

/// A [`GroupedRow`] with the fractional change of every statistic against
/// the previous bucket of the same dimension group.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeRow {
    pub row: GroupedRow,
    changes: BTreeMap<Statistic, f64>,
}

impl ChangeRow {
    /// Defined change for `stat`, or `None` for the first bucket of a group,
    /// a missing value on either side, or a zero previous value.
    pub fn change(&self, stat: Statistic) -> Option<f64> {
        self.changes.get(&stat).copied()
    }
}

/// Attach changes to `rows`, keeping their order.
///
/// Rows are partitioned by dimension key; within a partition the previous
/// row is the one with the closest earlier bucket, whatever order `rows`
/// arrive in.
pub fn compute_changes(rows: Vec<GroupedRow>) -> Vec<ChangeRow> {
    let mut partitions: BTreeMap<&DimensionKey, Vec<usize>> = BTreeMap::new();
    for (idx, row) in rows.iter().enumerate() {
        partitions.entry(&row.dimension).or_default().push(idx);
    }

    let mut changes: Vec<BTreeMap<Statistic, f64>> = vec![BTreeMap::new(); rows.len()];
    for indices in partitions.values_mut() {
        indices.sort_by_key(|&i| rows[i].bucket);
        for pair in indices.windows(2) {
            let (prev, cur) = (&rows[pair[0]], &rows[pair[1]]);
            for stat in Statistic::ALL {
                if let Some(delta) = fractional_change(stat.value(prev), stat.value(cur)) {
                    changes[pair[1]].insert(stat, delta);
                }
            }
        }
    }

    rows.into_iter()
        .zip(changes)
        .map(|(row, changes)| ChangeRow { row, changes })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
