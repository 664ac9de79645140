use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

// ── Raw input ─────────────────────────────────────────────────────────────────

/// One decoded input table, exactly as it came out of the file decoder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    /// Human-readable origin (usually the file name), used in warnings.
    pub source_name: String,
    /// Column names in file order, untrimmed.
    pub headers: Vec<String>,
    /// Data rows. A row may be shorter or longer than `headers`.
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(source_name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            source_name: source_name.into(),
            headers,
            rows,
        }
    }
}

/// Several raw tables merged into one column-aligned record set.
///
/// `columns` is the first-seen-order union of every input table's trimmed
/// headers; every row has exactly `columns.len()` cells, empty where the
/// originating table lacked that column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RecordSet {
    /// Index of the column named exactly `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// First column whose lower-cased name contains `keyword` (lower-cased).
    pub fn find_column_containing(&self, keyword: &str) -> Option<&str> {
        let needle = keyword.to_lowercase();
        self.columns
            .iter()
            .find(|c| c.to_lowercase().contains(&needle))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ── Dimensions and metrics ────────────────────────────────────────────────────

/// A categorical field a record can be grouped or filtered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Channel,
    BusinessLine,
    Country,
    ClassOne,
    ClassTwo,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::Channel,
        Dimension::BusinessLine,
        Dimension::Country,
        Dimension::ClassOne,
        Dimension::ClassTwo,
    ];

    /// Column heading used in assembled result tables.
    pub fn display_name(self) -> &'static str {
        match self {
            Dimension::Channel => "Channel",
            Dimension::BusinessLine => "Brand line",
            Dimension::Country => "Country",
            Dimension::ClassOne => "Issue class L1",
            Dimension::ClassTwo => "Issue class L2",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Dimension::Channel => "channel",
            Dimension::BusinessLine => "business_line",
            Dimension::Country => "country",
            Dimension::ClassOne => "class_one",
            Dimension::ClassTwo => "class_two",
        };
        f.write_str(s)
    }
}

/// A numeric per-ticket measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    ReplyCount,
    FirstResponseDuration,
    HandlingDuration,
}

impl Metric {
    pub const ALL: [Metric; 3] = [
        Metric::ReplyCount,
        Metric::FirstResponseDuration,
        Metric::HandlingDuration,
    ];
}

// ── Time buckets ──────────────────────────────────────────────────────────────

/// Calendar granularity used to bucket tickets by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeGrain {
    Month,
    Year,
}

impl TimeGrain {
    /// Column heading for the bucket column.
    pub fn display_name(self) -> &'static str {
        match self {
            TimeGrain::Month => "Month",
            TimeGrain::Year => "Year",
        }
    }
}

/// A calendar month or year key. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Bucket {
    Year(i32),
    Month { year: i32, month: u32 },
}

impl Bucket {
    /// Bucket `ts` at the given grain. Month and year always come from the
    /// same timestamp.
    pub fn from_timestamp(ts: &NaiveDateTime, grain: TimeGrain) -> Self {
        match grain {
            TimeGrain::Month => Bucket::Month {
                year: ts.year(),
                month: ts.month(),
            },
            TimeGrain::Year => Bucket::Year(ts.year()),
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bucket::Year(y) => write!(f, "{:04}", y),
            Bucket::Month { year, month } => write!(f, "{:04}-{:02}", year, month),
        }
    }
}

impl Serialize for Bucket {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// The non-time part of a group key: one value per grouping dimension, empty
/// for the overall axis. Orders lexically, component by component.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct DimensionKey(pub Vec<String>);

impl DimensionKey {
    pub fn overall() -> Self {
        Self(Vec::new())
    }

    pub fn is_overall(&self) -> bool {
        self.0.is_empty()
    }

    pub fn values(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for DimensionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("overall");
        }
        f.write_str(&self.0.join(" / "))
    }
}

// ── TicketRecord ──────────────────────────────────────────────────────────────

/// One normalized row of the merged export.
///
/// Numeric fields are either a finite number or `None` (true-missing); they
/// are never zero-filled.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TicketRecord {
    pub ticket_id: Option<String>,
    /// `None` when the source value could not be parsed.
    pub created_at: Option<NaiveDateTime>,
    pub status: Option<String>,
    pub channel: Option<String>,
    pub business_line: Option<String>,
    pub country: Option<String>,
    pub class_one: Option<String>,
    pub class_two: Option<String>,
    pub reply_count: Option<f64>,
    pub first_response_duration: Option<f64>,
    pub handling_duration: Option<f64>,
    /// Legacy per-ticket rank column, present in some schema variants.
    pub rn: Option<i64>,
}

impl TicketRecord {
    /// Value of a categorical dimension.
    pub fn dimension(&self, dim: Dimension) -> Option<&str> {
        match dim {
            Dimension::Channel => self.channel.as_deref(),
            Dimension::BusinessLine => self.business_line.as_deref(),
            Dimension::Country => self.country.as_deref(),
            Dimension::ClassOne => self.class_one.as_deref(),
            Dimension::ClassTwo => self.class_two.as_deref(),
        }
    }

    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::ReplyCount => self.reply_count,
            Metric::FirstResponseDuration => self.first_response_duration,
            Metric::HandlingDuration => self.handling_duration,
        }
    }

    /// Time bucket, or `None` when `created_at` is unparsable.
    pub fn bucket(&self, grain: TimeGrain) -> Option<Bucket> {
        self.created_at
            .as_ref()
            .map(|ts| Bucket::from_timestamp(ts, grain))
    }

    /// Values of `dims`, or `None` as soon as one of them is missing.
    pub fn dimension_key(&self, dims: &[Dimension]) -> Option<DimensionKey> {
        dims.iter()
            .map(|&d| self.dimension(d).map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .map(DimensionKey)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
