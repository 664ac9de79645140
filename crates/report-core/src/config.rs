//! Pipeline configuration: column aliases, axis grouping keys and the
//! status / deduplication policy.
//!
//! Every field is optional in the JSON file; anything omitted falls back to
//! the built-in defaults below.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{ReportError, Result};
use crate::models::{Dimension, Metric};

// ── Axis ──────────────────────────────────────────────────────────────────────

/// A dimension set over which metrics are deduplicated and grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Overall,
    BrandLine,
    Country,
    Channel,
    IssueClassLevel1,
    IssueClassLevel2,
}

impl Axis {
    pub const ALL: [Axis; 6] = [
        Axis::Overall,
        Axis::BrandLine,
        Axis::Country,
        Axis::Channel,
        Axis::IssueClassLevel1,
        Axis::IssueClassLevel2,
    ];

    /// Built-in grouping keys.
    pub fn default_keys(self) -> &'static [Dimension] {
        match self {
            Axis::Overall => &[],
            Axis::BrandLine => &[Dimension::BusinessLine],
            Axis::Country => &[Dimension::Country],
            Axis::Channel => &[Dimension::Channel],
            Axis::IssueClassLevel1 => &[Dimension::ClassOne],
            Axis::IssueClassLevel2 => &[Dimension::ClassOne, Dimension::ClassTwo],
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Axis::Overall => "overall",
            Axis::BrandLine => "brand_line",
            Axis::Country => "country",
            Axis::Channel => "channel",
            Axis::IssueClassLevel1 => "issue_class_level1",
            Axis::IssueClassLevel2 => "issue_class_level2",
        };
        f.write_str(s)
    }
}

// ── ColumnAliases ─────────────────────────────────────────────────────────────

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Candidate source column names for each logical field. The first candidate
/// present in the merged record set wins; matching ignores ASCII case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnAliases {
    /// Substring identifying the creation-timestamp column.
    pub created_keyword: String,
    pub ticket_id: Vec<String>,
    pub status: Vec<String>,
    pub channel: Vec<String>,
    pub business_line: Vec<String>,
    pub country: Vec<String>,
    pub class_one: Vec<String>,
    pub class_two: Vec<String>,
    pub reply_count: Vec<String>,
    pub first_response_duration: Vec<String>,
    pub handling_duration: Vec<String>,
    pub rank: Vec<String>,
}

impl Default for ColumnAliases {
    fn default() -> Self {
        Self {
            created_keyword: "ticket_created".to_string(),
            ticket_id: names(&["ticket_id", "工单ID", "工单编号"]),
            status: names(&["ticket_status", "status", "工单状态"]),
            channel: names(&["ticket_channel", "channel", "渠道"]),
            business_line: names(&["business_line", "品牌线"]),
            country: names(&["site_code", "country", "国家"]),
            class_one: names(&["class_one", "一级分类"]),
            class_two: names(&["class_two", "二级分类"]),
            reply_count: names(&["message_count", "reply_count", "回复次数"]),
            first_response_duration: names(&["首次响应时长", "first_response_duration"]),
            handling_duration: names(&["处理时长", "handling_duration"]),
            rank: names(&["rn"]),
        }
    }
}

impl ColumnAliases {
    pub fn for_dimension(&self, dim: Dimension) -> &[String] {
        match dim {
            Dimension::Channel => &self.channel,
            Dimension::BusinessLine => &self.business_line,
            Dimension::Country => &self.country,
            Dimension::ClassOne => &self.class_one,
            Dimension::ClassTwo => &self.class_two,
        }
    }

    pub fn for_metric(&self, metric: Metric) -> &[String] {
        match metric {
            Metric::ReplyCount => &self.reply_count,
            Metric::FirstResponseDuration => &self.first_response_duration,
            Metric::HandlingDuration => &self.handling_duration,
        }
    }
}

// ── DedupStrategy ─────────────────────────────────────────────────────────────

/// How one representative row per ticket is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupStrategy {
    /// First occurrence per (ticket id, axis grouping keys).
    #[default]
    TicketId,
    /// Keep rows whose precomputed `rn` rank equals 1. Only correct when the
    /// rank was computed with the same grouping as the axis.
    LegacyRank,
}

// ── ReportConfig ──────────────────────────────────────────────────────────────

/// Complete pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub columns: ColumnAliases,
    /// Per-axis grouping key overrides. Axes not listed use
    /// [`Axis::default_keys`].
    pub axes: BTreeMap<Axis, Vec<Dimension>>,
    /// Status values (case-insensitive) that count as closed.
    pub closed_statuses: Vec<String>,
    /// Restrict every statistic to closed tickets when a status column exists.
    pub restrict_to_closed: bool,
    pub dedup_strategy: DedupStrategy,
    /// Drop the trailing summary row export systems append to each table.
    pub drop_footer_row: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            columns: ColumnAliases::default(),
            axes: BTreeMap::new(),
            closed_statuses: names(&["closed", "已关闭"]),
            restrict_to_closed: true,
            dedup_strategy: DedupStrategy::TicketId,
            drop_footer_row: true,
        }
    }
}

impl ReportConfig {
    /// `~/.ticket-report/config.json`.
    pub fn default_path() -> PathBuf {
        Self::path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Config path rooted at `base_dir` (used for testing).
    pub fn path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(".ticket-report").join("config.json")
    }

    /// Load from an explicit path and validate.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ReportError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ReportConfig = serde_json::from_str(&content)
            .map_err(|e| ReportError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `explicit` when given, otherwise the default path if it exists,
    /// otherwise the built-in defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => {
                let path = Self::default_path();
                if path.exists() {
                    Self::load_from(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Reject grouping-key overrides that cannot describe an axis.
    pub fn validate(&self) -> Result<()> {
        for (axis, keys) in &self.axes {
            match axis {
                Axis::Overall if !keys.is_empty() => {
                    return Err(ReportError::Config(
                        "axis overall cannot have grouping keys".to_string(),
                    ));
                }
                Axis::Overall => {}
                _ if keys.is_empty() => {
                    return Err(ReportError::Config(format!(
                        "axis {} has no grouping keys",
                        axis
                    )));
                }
                _ => {}
            }
        }
        if self.columns.created_keyword.trim().is_empty() {
            return Err(ReportError::Config(
                "columns.created_keyword must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Effective grouping keys for `axis`.
    pub fn grouping_keys(&self, axis: Axis) -> Vec<Dimension> {
        self.axes
            .get(&axis)
            .cloned()
            .unwrap_or_else(|| axis.default_keys().to_vec())
    }

    /// `true` when `status` is one of the configured closed values.
    pub fn is_closed(&self, status: &str) -> bool {
        let status = status.trim();
        self.closed_statuses
            .iter()
            .any(|c| c.trim().eq_ignore_ascii_case(status))
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
