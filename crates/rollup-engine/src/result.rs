//! Pipeline execution result types and timing breakdowns.

use rollup_types::summary::{AggregateSummary, CleanSummary, EnrichSummary};

/// Per-phase wall-clock breakdown for a pipeline run.
#[derive(Debug, Clone, Copy, Default)]
pub struct StageTimings {
    pub extract_secs: f64,
    pub transform_secs: f64,
    pub load_secs: f64,
}

/// Result of a pipeline run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Rows in the raw events table, before cleaning.
    pub raw_events: u64,
    /// Rows in the user dimension.
    pub users: u64,
    pub clean: CleanSummary,
    pub enrich: EnrichSummary,
    pub aggregate: AggregateSummary,
    /// Rows written to the daily aggregate file.
    pub rows_written: u64,
    /// Rows written to the optional enriched events file.
    pub enriched_rows_written: Option<u64>,
    pub timings: StageTimings,
    pub duration_secs: f64,
}
