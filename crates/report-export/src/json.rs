//! Single JSON document holding every table plus run metadata.

use std::path::Path;

use report_core::error::{ReportError, Result};
use report_data::analysis::AnalysisResult;

/// Build the document. Missing cells become `null`; changes stay fractional.
pub fn to_document(result: &AnalysisResult) -> serde_json::Value {
    serde_json::json!({
        "metadata": result.metadata,
        "failures": result.failures,
        "tables": result.tables,
    })
}

/// Write the pretty-printed document to `path`.
pub fn write_document(result: &AnalysisResult, path: &Path) -> Result<()> {
    let text = serde_json::to_string_pretty(&to_document(result))?;
    std::fs::write(path, text).map_err(|e| ReportError::Export(format!("{}: {}", path.display(), e)))
}
