//! Result assembly: one wide, display-ready table per named output.

use report_core::config::{Axis, ReportConfig};
use report_core::formatting::{format_change, format_stat, MISSING_PLACEHOLDER};
use report_core::models::{Dimension, TimeGrain};
use serde::ser::{Serialize, Serializer};

use crate::aggregator::Statistic;
use crate::change::ChangeRow;
use crate::normalizer::ColumnResolution;

// ── TableSpec ─────────────────────────────────────────────────────────────────

/// A named output: which axis is aggregated at which time grain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSpec {
    pub name: &'static str,
    pub axis: Axis,
    pub grain: TimeGrain,
}

/// Every named output, in export order.
pub const TABLE_SPECS: [TableSpec; 7] = [
    TableSpec {
        name: "overall_by_month",
        axis: Axis::Overall,
        grain: TimeGrain::Month,
    },
    TableSpec {
        name: "overall_by_year",
        axis: Axis::Overall,
        grain: TimeGrain::Year,
    },
    TableSpec {
        name: "by_brand_line",
        axis: Axis::BrandLine,
        grain: TimeGrain::Month,
    },
    TableSpec {
        name: "by_country",
        axis: Axis::Country,
        grain: TimeGrain::Month,
    },
    TableSpec {
        name: "by_channel",
        axis: Axis::Channel,
        grain: TimeGrain::Month,
    },
    TableSpec {
        name: "issue_class_level1_by_year",
        axis: Axis::IssueClassLevel1,
        grain: TimeGrain::Year,
    },
    TableSpec {
        name: "issue_class_level2_by_year",
        axis: Axis::IssueClassLevel2,
        grain: TimeGrain::Year,
    },
];

// ── Cell / ResultTable ────────────────────────────────────────────────────────

/// One value of an assembled table.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    /// Fractional change, `0.5` meaning +50%.
    Change(f64),
    Missing,
}

impl Cell {
    fn stat(value: Option<f64>) -> Self {
        value.map(Cell::Number).unwrap_or(Cell::Missing)
    }

    fn change(value: Option<f64>) -> Self {
        value.map(Cell::Change).unwrap_or(Cell::Missing)
    }

    /// Human-readable rendering, `-` for missing.
    pub fn display(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(v) => format_stat(Some(*v)),
            Cell::Change(c) => format_change(Some(*c)),
            Cell::Missing => MISSING_PLACEHOLDER.to_string(),
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Text(s) => serializer.serialize_str(s),
            Cell::Number(v) | Cell::Change(v) => serializer.serialize_f64(*v),
            Cell::Missing => serializer.serialize_none(),
        }
    }
}

/// A named, fully assembled output table.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ResultTable {
    pub name: String,
    pub axis: Axis,
    pub grain: TimeGrain,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl ResultTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

// ── ResultAssembler ───────────────────────────────────────────────────────────

/// Decides which outputs the data supports and lays out their columns.
pub struct ResultAssembler<'c> {
    config: &'c ReportConfig,
    columns: &'c ColumnResolution,
}

impl<'c> ResultAssembler<'c> {
    pub fn new(config: &'c ReportConfig, columns: &'c ColumnResolution) -> Self {
        Self { config, columns }
    }

    /// An axis is available when every one of its grouping columns exists.
    pub fn is_available(&self, axis: Axis) -> bool {
        self.columns.has_dimensions(&self.config.grouping_keys(axis))
    }

    /// The subset of [`TABLE_SPECS`] the data supports.
    pub fn available_specs(&self) -> Vec<TableSpec> {
        TABLE_SPECS
            .iter()
            .filter(|spec| self.is_available(spec.axis))
            .copied()
            .collect()
    }

    /// Lay out `rows` as the wide table for `spec`: time bucket, grouping
    /// values, then each statistic followed by its change column.
    pub fn assemble(&self, spec: &TableSpec, rows: &[ChangeRow]) -> ResultTable {
        let keys = self.config.grouping_keys(spec.axis);
        ResultTable {
            name: spec.name.to_string(),
            axis: spec.axis,
            grain: spec.grain,
            columns: header(spec.grain, &keys),
            rows: rows.iter().map(|r| assemble_row(r, keys.len())).collect(),
        }
    }
}

fn header(grain: TimeGrain, keys: &[Dimension]) -> Vec<String> {
    let suffix = match grain {
        TimeGrain::Month => "MoM",
        TimeGrain::Year => "YoY",
    };
    let mut columns = vec![grain.display_name().to_string()];
    columns.extend(keys.iter().map(|d| d.display_name().to_string()));
    for stat in Statistic::ALL {
        columns.push(stat.label().to_string());
        columns.push(format!("{} {}", stat.label(), suffix));
    }
    columns
}

fn assemble_row(change_row: &ChangeRow, key_count: usize) -> Vec<Cell> {
    let row = &change_row.row;
    let mut cells = Vec::with_capacity(1 + key_count + Statistic::ALL.len() * 2);
    cells.push(Cell::Text(row.bucket.to_string()));
    cells.extend(row.dimension.values().iter().cloned().map(Cell::Text));
    for stat in Statistic::ALL {
        cells.push(Cell::stat(stat.value(row)));
        cells.push(Cell::change(change_row.change(stat)));
    }
    cells
}

// ── Tests ─────────────────────────────────────────────────────────────────────
