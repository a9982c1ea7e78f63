//! Per-stage execution summaries.
//!
//! Each transform stage returns a summary of what it kept and what it
//! recovered from ([`CleanSummary`], [`EnrichSummary`],
//! [`AggregateSummary`]). Data-quality recoveries are visible here rather
//! than swallowed: every dropped row is counted.

use serde::{Deserialize, Serialize};

/// Counters for a completed cleaning pass over the raw events table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanSummary {
    pub rows_in: u64,
    /// Rows dropped because `user_id` was null or empty.
    pub dropped_missing_user_id: u64,
    /// Rows dropped because the timestamp was null or unparsable.
    pub dropped_invalid_timestamp: u64,
    /// Rows dropped because their `event_id` was already seen.
    pub dropped_duplicate: u64,
    pub rows_out: u64,
}

impl CleanSummary {
    /// Total rows removed by the cleaning pass.
    pub fn dropped_total(&self) -> u64 {
        self.dropped_missing_user_id + self.dropped_invalid_timestamp + self.dropped_duplicate
    }
}

/// Counters for a completed enrichment join.
///
/// `rows` always equals the cleaned-event row count (left-join guarantee);
/// `matched + unmatched == rows`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichSummary {
    pub rows: u64,
    /// Events whose `user_id` had a dimension row.
    pub matched: u64,
    /// Events carrying the sentinel in every enrichment column.
    pub unmatched: u64,
}

/// Counters for a completed daily aggregation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateSummary {
    pub rows_in: u64,
    /// Distinct `(user_id, event_date)` groups, i.e. output rows.
    pub groups: u64,
}
