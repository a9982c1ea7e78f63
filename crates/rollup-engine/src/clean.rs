//! Event cleaning: validation, timestamp normalization, de-duplication.

use std::collections::HashSet;
use std::sync::Arc;

use arrow::array::{Array, TimestampMicrosecondArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

use rollup_types::error::StageError;
use rollup_types::summary::CleanSummary;

use crate::arrow_utils::{col_index, col_str, select_rows};
use crate::errors::PipelineError;

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Schema of the cleaned events table: `user_id` and `timestamp` are
/// guaranteed non-null, the timestamp column holds the source's wall-clock
/// reading as naive microseconds.
pub fn cleaned_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("event_id", DataType::Utf8, true),
        Field::new("user_id", DataType::Utf8, false),
        Field::new("event_type", DataType::Utf8, true),
        Field::new(
            "timestamp",
            DataType::Timestamp(TimeUnit::Microsecond, None),
            false,
        ),
    ]))
}

/// Parse a raw timestamp string into naive wall-clock microseconds.
///
/// RFC 3339 offsets are read and then discarded: the local clock reading is
/// kept unchanged, so downstream date truncation buckets events by the
/// source's own calendar.
fn parse_timestamp(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_local().and_utc().timestamp_micros());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.and_utc().timestamp_micros());
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_micros())
}

/// Clean the raw events table.
///
/// Drops rows with a null/empty `user_id` or an unparsable timestamp, and
/// de-duplicates exactly on `event_id` (first-seen in input order survives;
/// rows without an `event_id` cannot collide and are always kept). Drops
/// are data-quality recoveries, counted in the returned [`CleanSummary`]
/// and logged, never fatal. The input batch is not mutated.
///
/// # Errors
///
/// Returns a schema error if the expected raw columns are missing or
/// mistyped.
pub fn clean_events(raw: &RecordBatch) -> Result<(RecordBatch, CleanSummary), PipelineError> {
    let event_id = col_str(raw, "event_id")?;
    let user_id = col_str(raw, "user_id")?;
    let event_type = col_str(raw, "event_type")?;
    let timestamp = col_str(raw, "timestamp")?;

    let mut keep: Vec<u32> = Vec::with_capacity(raw.num_rows());
    let mut parsed: Vec<i64> = Vec::with_capacity(raw.num_rows());
    let mut seen_ids: HashSet<&str> = HashSet::with_capacity(raw.num_rows());
    let mut summary = CleanSummary {
        rows_in: raw.num_rows() as u64,
        ..CleanSummary::default()
    };

    for row in 0..raw.num_rows() {
        if user_id.is_null(row) || user_id.value(row).trim().is_empty() {
            summary.dropped_missing_user_id += 1;
            continue;
        }
        let micros = if timestamp.is_null(row) {
            None
        } else {
            parse_timestamp(timestamp.value(row))
        };
        let Some(micros) = micros else {
            summary.dropped_invalid_timestamp += 1;
            continue;
        };
        if !event_id.is_null(row) {
            let id = event_id.value(row);
            if !id.trim().is_empty() && !seen_ids.insert(id) {
                summary.dropped_duplicate += 1;
                continue;
            }
        }
        keep.push(row as u32);
        parsed.push(micros);
    }
    summary.rows_out = keep.len() as u64;

    tracing::info!(
        rows_in = summary.rows_in,
        dropped_missing_user_id = summary.dropped_missing_user_id,
        dropped_invalid_timestamp = summary.dropped_invalid_timestamp,
        dropped_duplicate = summary.dropped_duplicate,
        rows_out = summary.rows_out,
        "Cleaned raw events"
    );

    let subset = select_rows(raw, &keep)?;
    let cleaned = RecordBatch::try_new(
        cleaned_schema(),
        vec![
            Arc::clone(subset.column(col_index(raw, "event_id")?)),
            Arc::clone(subset.column(col_index(raw, "user_id")?)),
            Arc::clone(subset.column(col_index(raw, "event_type")?)),
            Arc::new(TimestampMicrosecondArray::from(parsed)),
        ],
    )
    .map_err(|e| {
        StageError::schema(
            "CLEAN_BUILD",
            format!("failed to build cleaned events table: {e}"),
        )
    })?;

    Ok((cleaned, summary))
}
