//! Domain model and shared plumbing for the ticket service-level report.
//!
//! Holds the record and bucket types, the error taxonomy, configuration and
//! CLI settings, the field normalizers, and the statistics helpers used by
//! the aggregation pipeline in `report-data`.

pub mod config;
pub mod data_processors;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod stats;

pub use error::{ReportError, Result};
