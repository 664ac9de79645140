//! Aggregation pipeline for the ticket report.
//!
//! Responsible for discovering and decoding export files, merging them into
//! one record set, normalizing and filtering records, deduplicating them per
//! analysis axis, computing grouped statistics with period-over-period change,
//! and assembling the named result tables.

pub mod aggregator;
pub mod analysis;
pub mod assembler;
pub mod change;
pub mod dedup;
pub mod filter;
pub mod ingest;
pub mod normalizer;
pub mod reader;

pub use report_core as core;
