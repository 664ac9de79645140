use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the ticket report pipeline.
#[derive(Error, Debug)]
pub enum ReportError {
    /// One input table could not be decoded. Recovered per file.
    #[error("Failed to parse source {source_name}: {reason}")]
    SourceFormat { source_name: String, reason: String },

    /// A required column is missing from the merged record set.
    #[error("Schema error: {0}")]
    Schema(String),

    /// Nothing left to analyse (no readable input, or an empty selection).
    #[error("No data: {0}")]
    NoData(String),

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Writing a result table to its destination failed.
    #[error("Export error: {0}")]
    Export(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReportError {
    /// Build a [`ReportError::SourceFormat`] from anything displayable.
    pub fn source_format(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Self::SourceFormat {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }
}

/// Convenience alias used throughout the report crates.
pub type Result<T> = std::result::Result<T, ReportError>;
