//! Aggregation Module
//!
//! Folds authentication records into summary statistics. Summation and
//! grouping are commutative and associative, so the result is independent of
//! the order in which files or records are consumed.
//!
//! A record counts as passed iff its SPF or DKIM policy verdict is `pass`
//! (DMARC alignment: either mechanism aligning is sufficient). Everything
//! else counts as failed and is attributed to the record's header-from domain.

use crate::models::AuthRecord;
use serde::Serialize;
use std::collections::BTreeMap;

/// Accumulated totals for one analysis run.
///
/// Invariants: `pass_count + fail_count == total_messages`, and the values of
/// `domain_failures` sum to `fail_count`. Domains seen only in passing
/// records never appear in `domain_failures`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub total_messages: u64,
    pub pass_count: u64,
    pub fail_count: u64,
    pub domain_failures: BTreeMap<String, u64>,
}

impl Summary {
    /// Folds all records into a summary. An empty input yields the zero
    /// summary rather than an error.
    pub fn from_records(records: &[AuthRecord]) -> Self {
        let mut summary = Summary::default();
        for record in records {
            summary.add(record);
        }
        summary
    }

    fn add(&mut self, record: &AuthRecord) {
        let count = u64::from(record.count);
        self.total_messages += count;
        if record.passed() {
            self.pass_count += count;
        } else {
            self.fail_count += count;
            *self
                .domain_failures
                .entry(record.header_from.clone())
                .or_insert(0) += count;
        }
    }

    pub fn pass_rate(&self) -> f64 {
        if self.total_messages == 0 {
            0.0
        } else {
            self.pass_count as f64 / self.total_messages as f64 * 100.0
        }
    }

    pub fn fail_rate(&self) -> f64 {
        if self.total_messages == 0 {
            0.0
        } else {
            self.fail_count as f64 / self.total_messages as f64 * 100.0
        }
    }

    /// Domain failure counts ranked by failure count descending. Domains with
    /// equal counts are ordered by name ascending, so chart output is
    /// reproducible across runs on identical input.
    pub fn ranked_failures(&self) -> Vec<(String, u64)> {
        // BTreeMap iterates name-ascending; the stable sort preserves that
        // order within equal counts.
        let mut ranked: Vec<(String, u64)> = self
            .domain_failures
            .iter()
            .map(|(domain, count)| (domain.clone(), *count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }
}
