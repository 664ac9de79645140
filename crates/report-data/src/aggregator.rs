//! Grouped statistics over one deduplicated axis view.
//!
//! Each metric family is aggregated on its own, keyed by (time bucket,
//! dimension key), and the families are then outer-joined so that a group
//! present in any one family shows up in the result.

use std::collections::BTreeMap;

use report_core::models::{Bucket, DimensionKey, Metric, TicketRecord, TimeGrain};
use report_core::stats::{percentile, Summary};

use crate::dedup::DedupView;

/// Group key: time bucket first so that a sorted map yields the final order.
pub type GroupKey = (Bucket, DimensionKey);

// ── Family statistics ─────────────────────────────────────────────────────────

/// Reply-count family: ticket volume plus the reply-count distribution.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReplyStats {
    /// Deduplicated rows in the group.
    pub volume: usize,
    pub summary: Summary,
}

/// Duration families report no mean; the distributions are right-skewed.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DurationStats {
    pub samples: usize,
    pub median: Option<f64>,
    pub p90: Option<f64>,
}

impl DurationStats {
    fn from_samples(samples: &mut [f64]) -> Self {
        samples.sort_by(f64::total_cmp);
        Self {
            samples: samples.len(),
            median: percentile(samples, 50.0),
            p90: percentile(samples, 90.0),
        }
    }
}

// ── GroupedRow ────────────────────────────────────────────────────────────────

/// All families for one (bucket, dimension key). A `None` family means the
/// group had no non-missing samples for it.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedRow {
    pub bucket: Bucket,
    pub dimension: DimensionKey,
    pub reply: Option<ReplyStats>,
    pub first_response: Option<DurationStats>,
    pub handling: Option<DurationStats>,
}

impl GroupedRow {
    fn empty(key: GroupKey) -> Self {
        Self {
            bucket: key.0,
            dimension: key.1,
            reply: None,
            first_response: None,
            handling: None,
        }
    }
}

// ── Statistic ─────────────────────────────────────────────────────────────────

/// One reported statistic column of a [`GroupedRow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Statistic {
    TicketVolume,
    ReplyMean,
    ReplyMedian,
    ReplyP90,
    FirstResponseMedian,
    FirstResponseP90,
    HandlingMedian,
    HandlingP90,
}

impl Statistic {
    /// Column order of the assembled tables.
    pub const ALL: [Statistic; 8] = [
        Statistic::TicketVolume,
        Statistic::ReplyMean,
        Statistic::ReplyMedian,
        Statistic::ReplyP90,
        Statistic::FirstResponseMedian,
        Statistic::FirstResponseP90,
        Statistic::HandlingMedian,
        Statistic::HandlingP90,
    ];

    pub fn family(self) -> Metric {
        match self {
            Statistic::TicketVolume
            | Statistic::ReplyMean
            | Statistic::ReplyMedian
            | Statistic::ReplyP90 => Metric::ReplyCount,
            Statistic::FirstResponseMedian | Statistic::FirstResponseP90 => {
                Metric::FirstResponseDuration
            }
            Statistic::HandlingMedian | Statistic::HandlingP90 => Metric::HandlingDuration,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Statistic::TicketVolume => "Tickets",
            Statistic::ReplyMean => "Replies mean",
            Statistic::ReplyMedian => "Replies median",
            Statistic::ReplyP90 => "Replies P90",
            Statistic::FirstResponseMedian => "First response median",
            Statistic::FirstResponseP90 => "First response P90",
            Statistic::HandlingMedian => "Handling time median",
            Statistic::HandlingP90 => "Handling time P90",
        }
    }

    /// Value of this statistic in `row`.
    pub fn value(self, row: &GroupedRow) -> Option<f64> {
        match self {
            Statistic::TicketVolume => row.reply.map(|r| r.volume as f64),
            Statistic::ReplyMean => row.reply.and_then(|r| r.summary.mean),
            Statistic::ReplyMedian => row.reply.and_then(|r| r.summary.median),
            Statistic::ReplyP90 => row.reply.and_then(|r| r.summary.p90),
            Statistic::FirstResponseMedian => row.first_response.and_then(|d| d.median),
            Statistic::FirstResponseP90 => row.first_response.and_then(|d| d.p90),
            Statistic::HandlingMedian => row.handling.and_then(|d| d.median),
            Statistic::HandlingP90 => row.handling.and_then(|d| d.p90),
        }
    }
}

// ── Aggregator ────────────────────────────────────────────────────────────────

/// Groups a deduplicated view by (time bucket, dimension key).
#[derive(Debug, Clone, Copy)]
pub struct Aggregator {
    grain: TimeGrain,
}

impl Aggregator {
    pub fn new(grain: TimeGrain) -> Self {
        Self { grain }
    }

    /// Aggregate `view` into rows sorted by bucket, then dimension key.
    ///
    /// Records without a bucket, or missing any of the view's grouping
    /// values, belong to no group.
    pub fn aggregate(&self, view: &DedupView<'_>) -> Vec<GroupedRow> {
        let groups = self.group(view);
        outer_join(
            reply_family(&groups),
            duration_family(&groups, Metric::FirstResponseDuration),
            duration_family(&groups, Metric::HandlingDuration),
        )
    }

    fn group<'a>(&self, view: &DedupView<'a>) -> BTreeMap<GroupKey, Vec<&'a TicketRecord>> {
        let mut groups: BTreeMap<GroupKey, Vec<&'a TicketRecord>> = BTreeMap::new();
        for &record in &view.records {
            let Some(bucket) = record.bucket(self.grain) else {
                continue;
            };
            let Some(key) = record.dimension_key(&view.keys) else {
                continue;
            };
            groups.entry((bucket, key)).or_default().push(record);
        }
        groups
    }
}

/// Merge the three family tables on their group key, keeping every key that
/// appears in any of them.
pub fn outer_join(
    reply: BTreeMap<GroupKey, ReplyStats>,
    first_response: BTreeMap<GroupKey, DurationStats>,
    handling: BTreeMap<GroupKey, DurationStats>,
) -> Vec<GroupedRow> {
    let mut rows: BTreeMap<GroupKey, GroupedRow> = BTreeMap::new();

    for (key, stats) in reply {
        rows.entry(key.clone())
            .or_insert_with(|| GroupedRow::empty(key))
            .reply = Some(stats);
    }
    for (key, stats) in first_response {
        rows.entry(key.clone())
            .or_insert_with(|| GroupedRow::empty(key))
            .first_response = Some(stats);
    }
    for (key, stats) in handling {
        rows.entry(key.clone())
            .or_insert_with(|| GroupedRow::empty(key))
            .handling = Some(stats);
    }

    rows.into_values().collect()
}

// ── Private helpers ───────────────────────────────────────────────────────────

fn samples(records: &[&TicketRecord], metric: Metric) -> Vec<f64> {
    records.iter().filter_map(|r| r.metric(metric)).collect()
}

/// Every group has a volume, so the reply family covers every group.
fn reply_family(groups: &BTreeMap<GroupKey, Vec<&TicketRecord>>) -> BTreeMap<GroupKey, ReplyStats> {
    groups
        .iter()
        .map(|(key, records)| {
            let mut values = samples(records, Metric::ReplyCount);
            let stats = ReplyStats {
                volume: records.len(),
                summary: Summary::from_samples(&mut values),
            };
            (key.clone(), stats)
        })
        .collect()
}

fn duration_family(
    groups: &BTreeMap<GroupKey, Vec<&TicketRecord>>,
    metric: Metric,
) -> BTreeMap<GroupKey, DurationStats> {
    groups
        .iter()
        .filter_map(|(key, records)| {
            let mut values = samples(records, metric);
            if values.is_empty() {
                return None;
            }
            Some((key.clone(), DurationStats::from_samples(&mut values)))
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use report_core::config::Axis;
    use report_core::models::Dimension;

    fn ts(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn rec(when: Option<NaiveDateTime>, country: Option<&str>, reply: Option<f64>) -> TicketRecord {
        TicketRecord {
            created_at: when,
            country: country.map(str::to_string),
            reply_count: reply,
            ..Default::default()
        }
    }

    fn view<'a>(records: &'a [TicketRecord], axis: Axis, keys: &[Dimension]) -> DedupView<'a> {
        DedupView {
            axis,
            keys: keys.to_vec(),
            records: records.iter().collect(),
            unidentified: 0,
        }
    }

    fn approx(a: Option<f64>, b: f64) -> bool {
        a.map(|v| (v - b).abs() < 1e-9).unwrap_or(false)
    }

    // ── aggregate ─────────────────────────────────────────────────────────────

    #[test]
    fn test_monthly_overall_statistics() {
        let records: Vec<TicketRecord> = (1..=10)
            .map(|n| rec(Some(ts(2024, 1, n)), None, Some(n as f64)))
            .collect();
        let rows = Aggregator::new(TimeGrain::Month).aggregate(&view(&records, Axis::Overall, &[]));

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.bucket.to_string(), "2024-01");
        assert!(row.dimension.is_overall());
        let reply = row.reply.unwrap();
        assert_eq!(reply.volume, 10);
        assert!(approx(reply.summary.mean, 5.5));
        assert!(approx(reply.summary.median, 5.5));
        assert!(approx(reply.summary.p90, 9.1));
    }

    #[test]
    fn test_rows_sorted_by_bucket_then_dimension() {
        let records = vec![
            rec(Some(ts(2024, 2, 1)), Some("US"), Some(1.0)),
            rec(Some(ts(2023, 12, 1)), Some("US"), Some(1.0)),
            rec(Some(ts(2024, 2, 1)), Some("DE"), Some(1.0)),
            rec(Some(ts(2024, 10, 1)), Some("BR"), Some(1.0)),
        ];
        let rows = Aggregator::new(TimeGrain::Month)
            .aggregate(&view(&records, Axis::Country, &[Dimension::Country]));

        let keys: Vec<String> = rows
            .iter()
            .map(|r| format!("{} {}", r.bucket, r.dimension))
            .collect();
        assert_eq!(keys, vec!["2023-12 US", "2024-02 DE", "2024-02 US", "2024-10 BR"]);
    }

    #[test]
    fn test_year_grain() {
        let records = vec![
            rec(Some(ts(2023, 5, 1)), None, Some(2.0)),
            rec(Some(ts(2024, 1, 1)), None, Some(4.0)),
            rec(Some(ts(2024, 12, 1)), None, Some(6.0)),
        ];
        let rows = Aggregator::new(TimeGrain::Year).aggregate(&view(&records, Axis::Overall, &[]));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].bucket, Bucket::Year(2024));
        assert!(approx(rows[1].reply.unwrap().summary.median, 5.0));
    }

    #[test]
    fn test_unbucketed_and_keyless_records_excluded() {
        let records = vec![
            rec(None, Some("US"), Some(100.0)),
            rec(Some(ts(2024, 1, 1)), None, Some(100.0)),
            rec(Some(ts(2024, 1, 1)), Some("US"), Some(1.0)),
        ];
        let rows = Aggregator::new(TimeGrain::Month)
            .aggregate(&view(&records, Axis::Country, &[Dimension::Country]));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].reply.unwrap().volume, 1);
    }

    #[test]
    fn test_missing_values_excluded_per_metric() {
        let records = vec![
            TicketRecord {
                created_at: Some(ts(2024, 1, 1)),
                reply_count: Some(4.0),
                handling_duration: None,
                ..Default::default()
            },
            TicketRecord {
                created_at: Some(ts(2024, 1, 2)),
                reply_count: Some(6.0),
                handling_duration: Some(30.0),
                ..Default::default()
            },
        ];
        let rows = Aggregator::new(TimeGrain::Month).aggregate(&view(&records, Axis::Overall, &[]));
        let row = &rows[0];
        assert!(approx(row.reply.unwrap().summary.median, 5.0));
        let handling = row.handling.unwrap();
        assert_eq!(handling.samples, 1);
        assert!(approx(handling.median, 30.0));
    }

    #[test]
    fn test_group_with_no_samples_reports_missing_not_zero() {
        let records = vec![rec(Some(ts(2024, 1, 1)), None, None)];
        let rows = Aggregator::new(TimeGrain::Month).aggregate(&view(&records, Axis::Overall, &[]));
        let row = &rows[0];
        assert_eq!(Statistic::TicketVolume.value(row), Some(1.0));
        assert_eq!(Statistic::ReplyMedian.value(row), None);
        assert_eq!(Statistic::FirstResponseP90.value(row), None);
        assert!(row.first_response.is_none());
    }

    // ── outer_join ────────────────────────────────────────────────────────────

    #[test]
    fn test_outer_join_keeps_groups_from_any_family() {
        let jan = (Bucket::Month { year: 2024, month: 1 }, DimensionKey::overall());
        let feb = (Bucket::Month { year: 2024, month: 2 }, DimensionKey::overall());

        let reply = BTreeMap::from([(
            jan.clone(),
            ReplyStats {
                volume: 3,
                summary: Summary::default(),
            },
        )]);
        let response = BTreeMap::from([(
            feb.clone(),
            DurationStats {
                samples: 1,
                median: Some(2.0),
                p90: Some(2.0),
            },
        )]);

        let rows = outer_join(reply, response, BTreeMap::new());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].bucket, jan.0);
        assert!(rows[0].reply.is_some());
        assert!(rows[0].first_response.is_none());
        assert_eq!(rows[1].bucket, feb.0);
        assert!(rows[1].reply.is_none());
        assert_eq!(Statistic::FirstResponseMedian.value(&rows[1]), Some(2.0));
    }

    // ── Statistic ─────────────────────────────────────────────────────────────

    #[test]
    fn test_statistic_families() {
        assert_eq!(Statistic::TicketVolume.family(), Metric::ReplyCount);
        assert_eq!(Statistic::FirstResponseP90.family(), Metric::FirstResponseDuration);
        assert_eq!(Statistic::HandlingMedian.family(), Metric::HandlingDuration);
    }
}
