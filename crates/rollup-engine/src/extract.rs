//! Raw table extraction: JSON event dumps and CSV user dimensions.
//!
//! Events arrive as a JSON array of objects; the four fields the pipeline
//! consumes are projected as nullable strings. Users arrive as CSV with a
//! header row; every column is decoded as `Utf8`, since dimension
//! attributes are opaque enrichment labels.

use std::fs::File;
use std::io::{Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

use arrow::array::StringArray;
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use serde_json::Value;

use rollup_types::error::StageError;

use crate::errors::PipelineError;

const SCHEMA_INFER_MAX_RECORDS: usize = 100;

/// Schema of the raw events table. All columns nullable: validation is the
/// cleaner's job, not the extractor's.
pub fn raw_events_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("event_id", DataType::Utf8, true),
        Field::new("user_id", DataType::Utf8, true),
        Field::new("event_type", DataType::Utf8, true),
        Field::new("timestamp", DataType::Utf8, true),
    ]))
}

fn string_field(record: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    match record.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        // Non-string scalars (numeric ids and the like) are stringified.
        Some(other) => Some(other.to_string()),
    }
}

/// Read the raw events dump into an in-memory table.
///
/// # Errors
///
/// Returns an input error if the file is unreadable, is not a JSON array
/// of objects, or contains no records.
pub fn read_events(path: &Path) -> Result<RecordBatch, PipelineError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        StageError::input(
            "EVENTS_READ",
            format!("failed to read events file {}: {e}", path.display()),
        )
    })?;
    let value: Value = serde_json::from_str(&text).map_err(|e| {
        StageError::input(
            "EVENTS_PARSE",
            format!("events file {} is not valid JSON: {e}", path.display()),
        )
    })?;
    let records = value.as_array().ok_or_else(|| {
        StageError::input(
            "EVENTS_SHAPE",
            format!(
                "events file {} must contain a top-level JSON array",
                path.display()
            ),
        )
    })?;
    if records.is_empty() {
        return Err(StageError::input(
            "EMPTY_INPUT",
            format!("events file {} contains no records", path.display()),
        )
        .into());
    }

    let mut event_ids = Vec::with_capacity(records.len());
    let mut user_ids = Vec::with_capacity(records.len());
    let mut event_types = Vec::with_capacity(records.len());
    let mut timestamps = Vec::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        let obj = record.as_object().ok_or_else(|| {
            StageError::input(
                "EVENTS_SHAPE",
                format!("event record {i} is not a JSON object"),
            )
        })?;
        event_ids.push(string_field(obj, "event_id"));
        user_ids.push(string_field(obj, "user_id"));
        event_types.push(string_field(obj, "event_type"));
        timestamps.push(string_field(obj, "timestamp"));
    }

    let batch = RecordBatch::try_new(
        raw_events_schema(),
        vec![
            Arc::new(StringArray::from_iter(event_ids)),
            Arc::new(StringArray::from_iter(user_ids)),
            Arc::new(StringArray::from_iter(event_types)),
            Arc::new(StringArray::from_iter(timestamps)),
        ],
    )
    .map_err(|e| {
        StageError::input("EVENTS_BUILD", format!("failed to build events table: {e}"))
    })?;
    Ok(batch)
}

/// Read the user dimension CSV into an in-memory table.
///
/// The header row is used only to discover column names; every column is
/// then decoded as `Utf8`.
///
/// # Errors
///
/// Returns an input error if the file is unreadable or malformed, has no
/// `user_id` column, or contains no rows.
pub fn read_users(path: &Path) -> Result<RecordBatch, PipelineError> {
    let mut file = File::open(path).map_err(|e| {
        StageError::input(
            "USERS_READ",
            format!("failed to open users file {}: {e}", path.display()),
        )
    })?;

    let format = Format::default().with_header(true);
    let (inferred, _) = format
        .infer_schema(&mut file, Some(SCHEMA_INFER_MAX_RECORDS))
        .map_err(|e| {
            StageError::input(
                "USERS_PARSE",
                format!("failed to read users CSV {}: {e}", path.display()),
            )
        })?;
    file.seek(SeekFrom::Start(0)).map_err(|e| {
        StageError::input(
            "USERS_READ",
            format!("failed to rewind users file {}: {e}", path.display()),
        )
    })?;

    if inferred.index_of("user_id").is_err() {
        return Err(StageError::input(
            "MISSING_COLUMN",
            format!("users file {} has no 'user_id' column", path.display()),
        )
        .into());
    }

    let schema: SchemaRef = Arc::new(Schema::new(
        inferred
            .fields()
            .iter()
            .map(|f| Field::new(f.name().clone(), DataType::Utf8, true))
            .collect::<Vec<_>>(),
    ));
    let reader = ReaderBuilder::new(Arc::clone(&schema))
        .with_header(true)
        .build(file)
        .map_err(|e| {
            StageError::input(
                "USERS_PARSE",
                format!("failed to open users CSV {}: {e}", path.display()),
            )
        })?;

    let mut batches = Vec::new();
    for batch in reader {
        batches.push(batch.map_err(|e| {
            StageError::input(
                "USERS_PARSE",
                format!("failed to decode users CSV {}: {e}", path.display()),
            )
        })?);
    }
    let users = arrow::compute::concat_batches(&schema, &batches).map_err(|e| {
        StageError::input("USERS_BUILD", format!("failed to build users table: {e}"))
    })?;

    if users.num_rows() == 0 {
        return Err(StageError::input(
            "EMPTY_INPUT",
            format!("users file {} contains no rows", path.display()),
        )
        .into());
    }
    Ok(users)
}
