use std::path::Path;

use anyhow::{Context, Result};

use rollup_engine::config::parser;
use rollup_engine::config::validator;
use rollup_engine::result::RunSummary;
use rollup_engine::runner;

/// Execute the `run` command: parse, validate, and run the pipeline.
pub fn execute(pipeline_path: &Path, json: bool) -> Result<()> {
    // 1. Parse pipeline YAML
    let config = parser::parse_pipeline(pipeline_path)
        .with_context(|| format!("Failed to parse pipeline: {}", pipeline_path.display()))?;

    // 2. Validate
    validator::validate_pipeline(&config)?;

    tracing::info!(
        pipeline = config.pipeline,
        events = %config.source.events_path.display(),
        users = %config.source.users_path.display(),
        output = %config.output.path.display(),
        "Pipeline validated"
    );

    // 3. Run
    let summary = runner::run_pipeline(&config)
        .map_err(|e| anyhow::anyhow!("Pipeline '{}' failed: {e}", config.pipeline))?;

    if json {
        println!("{}", summary_json(&summary));
        return Ok(());
    }

    println!("Pipeline '{}' completed successfully.", config.pipeline);
    println!("  Raw events:        {}", summary.raw_events);
    println!("  Users:             {}", summary.users);
    println!(
        "  Cleaned events:    {} ({} dropped: {} missing user, {} bad timestamp, {} duplicate)",
        summary.clean.rows_out,
        summary.clean.dropped_total(),
        summary.clean.dropped_missing_user_id,
        summary.clean.dropped_invalid_timestamp,
        summary.clean.dropped_duplicate,
    );
    println!(
        "  Enriched events:   {} ({} matched, {} unknown)",
        summary.enrich.rows, summary.enrich.matched, summary.enrich.unmatched,
    );
    println!("  Aggregate rows:    {}", summary.aggregate.groups);
    println!("  Rows written:      {}", summary.rows_written);
    if let Some(enriched_rows) = summary.enriched_rows_written {
        println!("  Enriched written:  {}", enriched_rows);
    }
    println!("  Duration:          {:.2}s", summary.duration_secs);
    println!("    Extract:         {:.3}s", summary.timings.extract_secs);
    println!("    Transform:       {:.3}s", summary.timings.transform_secs);
    println!("    Load:            {:.3}s", summary.timings.load_secs);

    Ok(())
}

fn summary_json(summary: &RunSummary) -> serde_json::Value {
    serde_json::json!({
        "raw_events": summary.raw_events,
        "users": summary.users,
        "clean": summary.clean,
        "enrich": summary.enrich,
        "aggregate": summary.aggregate,
        "rows_written": summary.rows_written,
        "enriched_rows_written": summary.enriched_rows_written,
        "duration_secs": summary.duration_secs,
        "extract_secs": summary.timings.extract_secs,
        "transform_secs": summary.timings.transform_secs,
        "load_secs": summary.timings.load_secs,
    })
}
