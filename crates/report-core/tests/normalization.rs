//! Cell normalization, statistics and configuration through the public API.

use chrono::Datelike;
use report_core::config::{Axis, DedupStrategy, ReportConfig};
use report_core::data_processors::{NumericCleaner, TimestampProcessor};
use report_core::formatting::format_change;
use report_core::models::{Bucket, Dimension, TimeGrain};
use report_core::stats::{fractional_change, Summary};
use report_core::ReportError;
use tempfile::TempDir;

// ── Cells ─────────────────────────────────────────────────────────────────────

#[test]
fn sentinel_cells_become_missing() {
    for raw in ["-", "—", "–", "--", "null", "NULL", "None", "nan", "", "   "] {
        assert_eq!(NumericCleaner::clean(raw), None, "{raw:?}");
    }
    assert_eq!(NumericCleaner::clean("1,234"), Some(1234.0));
    assert_eq!(NumericCleaner::clean(" 0 "), Some(0.0));
    assert_eq!(NumericCleaner::clean("abc"), None);
}

#[test]
fn month_and_year_buckets_come_from_one_timestamp() {
    let ts = TimestampProcessor::parse_str("2023-12-31 23:59:59").unwrap();
    assert_eq!(ts.year(), 2023);
    assert_eq!(
        Bucket::from_timestamp(&ts, TimeGrain::Month),
        Bucket::Month { year: 2023, month: 12 }
    );
    assert_eq!(Bucket::from_timestamp(&ts, TimeGrain::Year), Bucket::Year(2023));
}

#[test]
fn buckets_sort_chronologically() {
    let mut buckets = vec![
        Bucket::Month { year: 2024, month: 10 },
        Bucket::Month { year: 2024, month: 2 },
        Bucket::Month { year: 2023, month: 11 },
    ];
    buckets.sort();
    let keys: Vec<String> = buckets.iter().map(|b| b.to_string()).collect();
    assert_eq!(keys, vec!["2023-11", "2024-02", "2024-10"]);
}

// ── Statistics ────────────────────────────────────────────────────────────────

#[test]
fn p90_of_one_to_ten() {
    let mut values: Vec<f64> = (1..=10).rev().map(f64::from).collect();
    let summary = Summary::from_samples(&mut values);
    assert!((summary.p90.unwrap() - 9.1).abs() < 1e-9);
    assert_eq!(summary.samples, 10);
}

#[test]
fn change_of_one_hundred_to_one_fifty() {
    let change = fractional_change(Some(100.0), Some(150.0));
    assert_eq!(change, Some(0.5));
    assert_eq!(format_change(change), "50.0%");
    assert_eq!(format_change(fractional_change(None, Some(150.0))), "-");
    assert_eq!(fractional_change(Some(0.0), Some(150.0)), None);
}

// ── Configuration ─────────────────────────────────────────────────────────────

#[test]
fn partial_config_file_fills_defaults() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("config.json");
    std::fs::write(
        &path,
        r#"{
            "axes": { "country": ["country", "channel"] },
            "dedup_strategy": "legacy_rank",
            "columns": { "created_keyword": "创建时间" }
        }"#,
    )
    .unwrap();

    let config = ReportConfig::resolve(Some(&path)).unwrap();
    assert_eq!(
        config.grouping_keys(Axis::Country),
        vec![Dimension::Country, Dimension::Channel]
    );
    assert_eq!(config.grouping_keys(Axis::Channel), vec![Dimension::Channel]);
    assert_eq!(config.dedup_strategy, DedupStrategy::LegacyRank);
    assert_eq!(config.columns.created_keyword, "创建时间");
    assert!(config.restrict_to_closed);
}

#[test]
fn empty_axis_override_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("config.json");
    std::fs::write(&path, r#"{ "axes": { "channel": [] } }"#).unwrap();

    let err = ReportConfig::resolve(Some(&path)).unwrap_err();
    assert!(matches!(err, ReportError::Config(_)));
}
