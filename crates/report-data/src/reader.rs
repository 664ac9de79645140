//! Export file discovery and CSV decoding.
//!
//! Turns the user-supplied paths into [`RawTable`]s, one per file. A file
//! that cannot be decoded yields an error for that file only; the caller
//! decides what to do with partial success.

use std::io::Read;
use std::path::{Path, PathBuf};

use report_core::error::{ReportError, Result};
use report_core::models::RawTable;
use tracing::{debug, warn};

/// Extensions picked up when scanning a directory.
const INPUT_EXTENSIONS: &[&str] = &["csv", "xlsx", "xls"];

// ── Public API ────────────────────────────────────────────────────────────────

/// Expand `inputs` into a sorted, de-duplicated list of files.
///
/// Plain file paths are kept as given (even if they do not exist, so that the
/// read error is reported against them); directories are walked recursively
/// for export files.
pub fn find_input_files(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = walkdir::WalkDir::new(input)
                .follow_links(true)
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_file() && has_input_extension(entry.path()))
                .map(|entry| entry.into_path())
                .collect();
            found.sort();
            if found.is_empty() {
                warn!("No export files found in {}", input.display());
            }
            files.extend(found);
        } else {
            files.push(input.clone());
        }
    }

    let mut seen = std::collections::HashSet::new();
    files.retain(|p| seen.insert(p.clone()));
    files
}

/// Read every file in `paths`, in order. Each entry is either a decoded table
/// or the error that prevented decoding it.
pub fn load_tables(paths: &[PathBuf]) -> Vec<Result<RawTable>> {
    paths.iter().map(|p| read_table(p)).collect()
}

/// Read one export file.
pub fn read_table(path: &Path) -> Result<RawTable> {
    let name = source_name(path);

    match extension(path).as_deref() {
        Some("xlsx") | Some("xls") => {
            return Err(ReportError::source_format(
                name,
                "workbook decoding is not supported, export the sheet as CSV",
            ));
        }
        _ => {}
    }

    let file = std::fs::File::open(path).map_err(|source| ReportError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    read_csv(name, std::io::BufReader::new(file))
}

/// Decode CSV text from any reader.
///
/// The delimiter is sniffed from the header line (`,`, `;` or tab). Records
/// may have a different number of fields than the header.
pub fn read_csv<R: Read>(source_name: impl Into<String>, mut reader: R) -> Result<RawTable> {
    let source_name = source_name.into();

    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| ReportError::source_format(&source_name, e))?;
    let text = String::from_utf8(bytes)
        .map_err(|_| ReportError::source_format(&source_name, "file is not valid UTF-8"))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

    if text.trim().is_empty() {
        return Err(ReportError::source_format(&source_name, "file is empty"));
    }

    let delimiter = sniff_delimiter(text.lines().next().unwrap_or_default());
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .double_quote(true)
        .quoting(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| ReportError::source_format(&source_name, e))?
        .iter()
        .map(str::to_string)
        .collect();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(ReportError::source_format(&source_name, "no header row"));
    }

    let mut rows = Vec::new();
    for (idx, record) in rdr.records().enumerate() {
        let record = record.map_err(|e| {
            ReportError::source_format(&source_name, format!("record {}: {}", idx + 1, e))
        })?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    debug!(
        "Read {} rows x {} columns from {}",
        rows.len(),
        headers.len(),
        source_name
    );

    Ok(RawTable::new(source_name, headers, rows))
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

fn has_input_extension(path: &Path) -> bool {
    extension(path)
        .map(|ext| INPUT_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Pick the most frequent candidate delimiter in the header line. Ties go to
/// the earlier candidate, so `,` wins over `;` and tab.
fn sniff_delimiter(header_line: &str) -> u8 {
    let count = |c: char| header_line.matches(c).count();
    let candidates = [(b',', count(',')), (b';', count(';')), (b'\t', count('\t'))];
    candidates
        .iter()
        .fold((b',', 0), |best, &(d, n)| if n > best.1 { (d, n) } else { best })
        .0
}

// ── Tests ─────────────────────────────────────────────────────────────────────
