//! Enrichment: left equi-join of cleaned events against the user dimension.

use std::collections::HashMap;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, StringBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;

use rollup_types::error::StageError;
use rollup_types::summary::EnrichSummary;

use crate::arrow_utils::{col_str, col_str_at};
use crate::errors::PipelineError;

/// Value written into every enrichment column of an event whose `user_id`
/// has no dimension row.
pub const UNKNOWN_SENTINEL: &str = "unknown";

const JOIN_KEY: &str = "user_id";

/// Join cleaned events with the user dimension on `user_id`.
///
/// The join is left-preserving from the events side: every cleaned event
/// appears exactly once in the output, carrying either the matching
/// dimension row's attributes or the [`UNKNOWN_SENTINEL`] in every
/// enrichment column. A null attribute on a matched row stays null.
///
/// # Errors
///
/// Returns an integrity error if the users table has a duplicate or
/// null/empty `user_id` (the at-most-one-row-per-key precondition is never
/// resolved by picking an arbitrary match), or a schema error if either
/// table is missing its join column.
pub fn enrich_events(
    events: &RecordBatch,
    users: &RecordBatch,
) -> Result<(RecordBatch, EnrichSummary), PipelineError> {
    let event_keys = col_str(events, JOIN_KEY)?;
    let dim_keys = col_str(users, JOIN_KEY)?;

    let mut dim_index: HashMap<&str, usize> = HashMap::with_capacity(users.num_rows());
    for row in 0..users.num_rows() {
        if dim_keys.is_null(row) || dim_keys.value(row).trim().is_empty() {
            return Err(StageError::integrity(
                "NULL_USER_KEY",
                format!("users table row {row} has a null or empty user_id"),
            )
            .into());
        }
        let key = dim_keys.value(row);
        if dim_index.insert(key, row).is_some() {
            return Err(StageError::integrity(
                "DUPLICATE_USER_ID",
                format!("user_id '{key}' appears more than once in the users table"),
            )
            .into());
        }
    }

    let mut matched: u64 = 0;
    for row in 0..events.num_rows() {
        if dim_index.contains_key(event_keys.value(row)) {
            matched += 1;
        }
    }

    let mut fields: Vec<Field> = events
        .schema()
        .fields()
        .iter()
        .map(|f| f.as_ref().clone())
        .collect();
    let mut columns: Vec<ArrayRef> = events.columns().to_vec();

    for (col_idx, field) in users.schema().fields().iter().enumerate() {
        if field.name() == JOIN_KEY {
            continue;
        }
        let attr = col_str_at(users, col_idx)?;
        let mut builder = StringBuilder::with_capacity(events.num_rows(), events.num_rows() * 8);
        for row in 0..events.num_rows() {
            match dim_index.get(event_keys.value(row)) {
                Some(&dim_row) => {
                    if attr.is_null(dim_row) {
                        builder.append_null();
                    } else {
                        builder.append_value(attr.value(dim_row));
                    }
                }
                None => builder.append_value(UNKNOWN_SENTINEL),
            }
        }
        fields.push(Field::new(field.name().clone(), DataType::Utf8, true));
        columns.push(Arc::new(builder.finish()));
    }

    let enriched = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns).map_err(|e| {
        StageError::schema(
            "ENRICH_BUILD",
            format!("failed to build enriched events table: {e}"),
        )
    })?;

    let summary = EnrichSummary {
        rows: events.num_rows() as u64,
        matched,
        unmatched: events.num_rows() as u64 - matched,
    };

    tracing::info!(
        rows = summary.rows,
        matched = summary.matched,
        unmatched = summary.unmatched,
        "Enriched events with user attributes"
    );

    Ok((enriched, summary))
}
