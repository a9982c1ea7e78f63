//! Pipeline runner: composes extract -> clean -> enrich -> aggregate -> load.

use std::time::Instant;

use crate::config::types::PipelineConfig;
use crate::errors::PipelineError;
use crate::result::{RunSummary, StageTimings};
use crate::{aggregate, clean, enrich, extract, load};

/// Run the full pipeline described by `config`.
///
/// Single-threaded and single-pass: each stage consumes the previous
/// stage's table and produces a new one. Any stage failure propagates and
/// terminates the run with no aggregate file written.
///
/// # Errors
///
/// Returns the first stage error encountered (input, schema, integrity, or
/// output).
pub fn run_pipeline(config: &PipelineConfig) -> Result<RunSummary, PipelineError> {
    let started = Instant::now();

    let events = extract::read_events(&config.source.events_path)?;
    let users = extract::read_users(&config.source.users_path)?;
    let extract_secs = started.elapsed().as_secs_f64();
    tracing::info!(
        events = events.num_rows(),
        users = users.num_rows(),
        "Extracted raw tables"
    );

    let transform_start = Instant::now();
    let (cleaned, clean_summary) = clean::clean_events(&events)?;
    let (enriched, enrich_summary) = enrich::enrich_events(&cleaned, &users)?;
    let (daily, aggregate_summary) = aggregate::aggregate_daily(&enriched)?;
    let transform_secs = transform_start.elapsed().as_secs_f64();

    let load_start = Instant::now();
    // The optional enriched output goes first: the primary aggregate file
    // must not appear unless the whole run succeeds.
    let enriched_rows_written = match &config.output.enriched_path {
        Some(path) => Some(load::write_parquet(
            &enriched,
            path,
            config.output.compression,
        )?),
        None => None,
    };
    let rows_written = load::write_parquet(&daily, &config.output.path, config.output.compression)?;
    let load_secs = load_start.elapsed().as_secs_f64();

    Ok(RunSummary {
        raw_events: events.num_rows() as u64,
        users: users.num_rows() as u64,
        clean: clean_summary,
        enrich: enrich_summary,
        aggregate: aggregate_summary,
        rows_written,
        enriched_rows_written,
        timings: StageTimings {
            extract_secs,
            transform_secs,
            load_secs,
        },
        duration_secs: started.elapsed().as_secs_f64(),
    })
}
