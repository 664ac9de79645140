//! User-chosen inclusion sets over categorical dimensions, composed into one
//! immutable predicate before any aggregation runs.

use std::collections::{BTreeMap, BTreeSet};

use report_core::error::{ReportError, Result};
use report_core::models::{Dimension, TicketRecord};
use tracing::{info, warn};

use crate::normalizer::ColumnResolution;

/// Conjunction of "dimension value ∈ set" clauses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPredicate {
    clauses: BTreeMap<Dimension, BTreeSet<String>>,
}

impl FilterPredicate {
    /// Build the predicate from the requested `selections`.
    ///
    /// A selection on a dimension the source files do not carry is skipped
    /// with a warning. Blank values are ignored.
    ///
    /// # Errors
    /// [`ReportError::NoData`] when a selection on a present dimension is
    /// empty: the caller asked for nothing, which is different from the field
    /// being absent.
    pub fn compose(
        selections: &BTreeMap<Dimension, Vec<String>>,
        columns: &ColumnResolution,
    ) -> Result<Self> {
        let mut clauses = BTreeMap::new();

        for (&dim, values) in selections {
            if !columns.has_dimension(dim) {
                warn!("No {} column in the data, skipping {} filter", dim, dim);
                continue;
            }
            let set: BTreeSet<String> = values
                .iter()
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect();
            if set.is_empty() {
                return Err(ReportError::NoData(format!(
                    "no {} selected, nothing to analyse",
                    dim
                )));
            }
            clauses.insert(dim, set);
        }

        Ok(Self { clauses })
    }

    pub fn is_unrestricted(&self) -> bool {
        self.clauses.is_empty()
    }

    /// `true` when `record` satisfies every clause. Records with no value
    /// for a filtered dimension never match.
    pub fn matches(&self, record: &TicketRecord) -> bool {
        self.clauses.iter().all(|(&dim, set)| {
            record
                .dimension(dim)
                .map(|v| set.contains(v))
                .unwrap_or(false)
        })
    }

    /// Keep the records that match, preserving order.
    pub fn apply(&self, records: &[TicketRecord]) -> Vec<TicketRecord> {
        if self.is_unrestricted() {
            return records.to_vec();
        }
        let kept: Vec<TicketRecord> = records.iter().filter(|r| self.matches(r)).cloned().collect();
        for (dim, set) in &self.clauses {
            let values: Vec<&str> = set.iter().map(String::as_str).collect();
            info!("Filter {}: {}", dim, values.join(", "));
        }
        info!("{} of {} records remain after filtering", kept.len(), records.len());
        kept
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use report_core::config::ColumnAliases;
    use report_core::models::RecordSet;

    fn columns(names: &[&str]) -> ColumnResolution {
        let set = RecordSet {
            columns: names.iter().map(|s| s.to_string()).collect(),
            rows: vec![],
        };
        ColumnResolution::resolve(&set, "ticket_created", &ColumnAliases::default())
    }

    fn rec(channel: Option<&str>, line: Option<&str>) -> TicketRecord {
        TicketRecord {
            channel: channel.map(str::to_string),
            business_line: line.map(str::to_string),
            ..Default::default()
        }
    }

    fn select(pairs: &[(Dimension, &[&str])]) -> BTreeMap<Dimension, Vec<String>> {
        pairs
            .iter()
            .map(|(d, vs)| (*d, vs.iter().map(|s| s.to_string()).collect()))
            .collect()
    }

    #[test]
    fn test_filter_retains_selected_values() {
        let cols = columns(&["ticket_created", "ticket_channel"]);
        let pred = FilterPredicate::compose(&select(&[(Dimension::Channel, &["email", "chat"])]), &cols)
            .unwrap();
        let records = vec![
            rec(Some("email"), None),
            rec(Some("phone"), None),
            rec(None, None),
            rec(Some("chat"), None),
        ];

        let kept = pred.apply(&records);
        let channels: Vec<&str> = kept.iter().filter_map(|r| r.channel.as_deref()).collect();
        assert_eq!(channels, vec!["email", "chat"]);
    }

    #[test]
    fn test_filter_composes_dimensions_with_and() {
        let cols = columns(&["ticket_created", "ticket_channel", "business_line"]);
        let pred = FilterPredicate::compose(
            &select(&[
                (Dimension::Channel, &["email"]),
                (Dimension::BusinessLine, &["B2C"]),
            ]),
            &cols,
        )
        .unwrap();

        assert!(pred.matches(&rec(Some("email"), Some("B2C"))));
        assert!(!pred.matches(&rec(Some("email"), Some("B2B"))));
        assert!(!pred.matches(&rec(Some("chat"), Some("B2C"))));
    }

    #[test]
    fn test_filter_empty_selection_is_no_data() {
        let cols = columns(&["ticket_created", "ticket_channel"]);
        let err = FilterPredicate::compose(&select(&[(Dimension::Channel, &[])]), &cols).unwrap_err();
        assert!(matches!(err, ReportError::NoData(_)));

        let err = FilterPredicate::compose(&select(&[(Dimension::Channel, &["  "])]), &cols)
            .unwrap_err();
        assert!(matches!(err, ReportError::NoData(_)));
    }

    #[test]
    fn test_filter_absent_column_is_noop() {
        let cols = columns(&["ticket_created"]);
        let pred = FilterPredicate::compose(&select(&[(Dimension::Channel, &[])]), &cols).unwrap();
        assert!(pred.is_unrestricted());

        let records = vec![rec(None, None), rec(Some("x"), None)];
        assert_eq!(pred.apply(&records).len(), 2);
    }

    #[test]
    fn test_unrestricted_predicate_accepts_everything() {
        let pred = FilterPredicate::default();
        assert!(pred.matches(&rec(None, None)));
    }
}
