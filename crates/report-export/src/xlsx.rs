//! Workbook export: one worksheet per result table.

use std::path::Path;

use report_core::error::{ReportError, Result};
use report_core::formatting::MISSING_PLACEHOLDER;
use report_data::assembler::{Cell, ResultTable};
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};

use crate::is_count_column;

fn xlsx_err(e: XlsxError) -> ReportError {
    ReportError::Export(e.to_string())
}

// ── Formats ───────────────────────────────────────────────────────────────────

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_background_color("1F4E78")
        .set_font_color("FFFFFF")
        .set_border(FormatBorder::Thin)
        .set_text_wrap()
}

fn number_format() -> Format {
    Format::new().set_num_format("#,##0.00")
}

fn integer_format() -> Format {
    Format::new().set_num_format("#,##0")
}

fn percent_format() -> Format {
    Format::new().set_num_format("0.0%")
}

fn missing_format() -> Format {
    Format::new().set_align(FormatAlign::Center)
}

// ── Public function ───────────────────────────────────────────────────────────

/// Write every table to its own sheet of the workbook at `path`.
pub fn write_workbook(tables: &[ResultTable], path: &Path) -> Result<()> {
    let bytes = workbook_bytes(tables)?;
    std::fs::write(path, bytes).map_err(|e| ReportError::Export(format!("{}: {}", path.display(), e)))
}

/// Render the workbook in memory.
pub fn workbook_bytes(tables: &[ResultTable]) -> Result<Vec<u8>> {
    let mut wb = Workbook::new();
    for table in tables {
        write_sheet(&mut wb, table).map_err(xlsx_err)?;
    }
    if tables.is_empty() {
        // A workbook needs at least one sheet.
        wb.add_worksheet().set_name("empty").map_err(xlsx_err)?;
    }
    wb.save_to_buffer().map_err(xlsx_err)
}

// ── Private helpers ───────────────────────────────────────────────────────────

fn write_sheet(wb: &mut Workbook, table: &ResultTable) -> std::result::Result<(), XlsxError> {
    let ws = wb.add_worksheet();
    ws.set_name(&table.name)?;

    let hdr = header_format();
    for (col, name) in table.columns.iter().enumerate() {
        ws.write_with_format(0, col as u16, name.as_str(), &hdr)?;
    }

    let formats = CellFormats {
        number: number_format(),
        integer: integer_format(),
        percent: percent_format(),
        missing: missing_format(),
    };
    for (i, row) in table.rows.iter().enumerate() {
        let r = (i + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            write_cell(ws, r, col as u16, cell, is_count_column(table, col), &formats)?;
        }
    }

    ws.set_freeze_panes(1, 0)?;
    for col in 0..table.columns.len() {
        let width = if col == 0 { 10 } else { 16 };
        ws.set_column_width(col as u16, width)?;
    }
    Ok(())
}

struct CellFormats {
    number: Format,
    integer: Format,
    percent: Format,
    missing: Format,
}

fn write_cell(
    ws: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &Cell,
    is_count: bool,
    formats: &CellFormats,
) -> std::result::Result<(), XlsxError> {
    match cell {
        Cell::Text(s) => {
            ws.write(row, col, s.as_str())?;
        }
        Cell::Number(v) => {
            let fmt = if is_count {
                &formats.integer
            } else {
                &formats.number
            };
            ws.write_with_format(row, col, *v, fmt)?;
        }
        Cell::Change(c) => {
            ws.write_with_format(row, col, *c, &formats.percent)?;
        }
        Cell::Missing => {
            ws.write_with_format(row, col, MISSING_PLACEHOLDER, &formats.missing)?;
        }
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
