//! One CSV file per result table.

use std::path::{Path, PathBuf};

use report_core::error::{ReportError, Result};
use report_core::formatting::{format_change, MISSING_PLACEHOLDER};
use report_data::assembler::{Cell, ResultTable};

use crate::is_count_column;

/// Write `<output_dir>/<table name>.csv` for every table.
pub fn write_tables(tables: &[ResultTable], output_dir: &Path) -> Result<Vec<PathBuf>> {
    tables
        .iter()
        .map(|table| {
            let path = output_dir.join(format!("{}.csv", table.name));
            write_table(table, &path)?;
            Ok(path)
        })
        .collect()
}

/// Write one table. Numbers are plain (no thousands separators) so the file
/// stays machine-readable; changes are percentages.
pub fn write_table(table: &ResultTable, path: &Path) -> Result<()> {
    let export_err = |e: csv::Error| ReportError::Export(format!("{}: {}", path.display(), e));

    let mut writer = csv::Writer::from_path(path).map_err(export_err)?;
    writer.write_record(&table.columns).map_err(export_err)?;
    for row in &table.rows {
        let fields: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(col, cell)| render(cell, is_count_column(table, col)))
            .collect();
        writer.write_record(&fields).map_err(export_err)?;
    }
    writer
        .flush()
        .map_err(|e| ReportError::Export(format!("{}: {}", path.display(), e)))
}

fn render(cell: &Cell, is_count: bool) -> String {
    match cell {
        Cell::Text(s) => s.clone(),
        Cell::Number(v) if is_count => format!("{:.0}", v),
        Cell::Number(v) => format!("{:.2}", v),
        Cell::Change(c) => format_change(Some(*c)),
        Cell::Missing => MISSING_PLACEHOLDER.to_string(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use report_core::config::Axis;
    use report_core::models::TimeGrain;
    use tempfile::TempDir;

    fn sample() -> ResultTable {
        ResultTable {
            name: "by_channel".into(),
            axis: Axis::Channel,
            grain: TimeGrain::Month,
            columns: vec![
                "Month".into(),
                "Channel".into(),
                "Tickets".into(),
                "Replies median".into(),
                "Replies median MoM".into(),
            ],
            rows: vec![
                vec![
                    Cell::Text("2024-01".into()),
                    Cell::Text("email".into()),
                    Cell::Number(1200.0),
                    Cell::Number(3.5),
                    Cell::Missing,
                ],
                vec![
                    Cell::Text("2024-02".into()),
                    Cell::Text("email".into()),
                    Cell::Number(1300.0),
                    Cell::Number(7.0),
                    Cell::Change(1.0),
                ],
            ],
        }
    }

    #[test]
    fn test_write_table_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("by_channel.csv");
        write_table(&sample(), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "Month,Channel,Tickets,Replies median,Replies median MoM");
        assert_eq!(lines[1], "2024-01,email,1200,3.50,-");
        assert_eq!(lines[2], "2024-02,email,1300,7.00,100.0%");
    }

    #[test]
    fn test_write_tables_one_file_each() {
        let dir = TempDir::new().unwrap();
        let mut other = sample();
        other.name = "overall_by_month".into();

        let paths = write_tables(&[sample(), other], dir.path()).unwrap();
        assert_eq!(paths.len(), 2);
        assert!(dir.path().join("by_channel.csv").exists());
        assert!(dir.path().join("overall_by_month.csv").exists());
    }
}
