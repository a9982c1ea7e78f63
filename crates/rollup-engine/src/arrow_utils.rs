//! Typed column accessors and row-subset helpers shared by the stages.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, StringArray, TimestampMicrosecondArray, UInt32Array};
use arrow::record_batch::RecordBatch;

use rollup_types::error::StageError;

/// Resolve a column name to its index.
pub(crate) fn col_index(batch: &RecordBatch, name: &str) -> Result<usize, StageError> {
    batch
        .schema()
        .index_of(name)
        .map_err(|_| StageError::schema("MISSING_COLUMN", format!("missing column '{name}'")))
}

/// Look up a `Utf8` column by name.
pub(crate) fn col_str<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray, StageError> {
    let idx = col_index(batch, name)?;
    col_str_at(batch, idx)
}

/// Downcast the column at `idx` to `Utf8`.
pub(crate) fn col_str_at(batch: &RecordBatch, idx: usize) -> Result<&StringArray, StageError> {
    let name = batch.schema().field(idx).name().clone();
    batch
        .column(idx)
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| {
            StageError::schema("COLUMN_TYPE", format!("column '{name}' is not Utf8"))
        })
}

/// Look up a `Timestamp(Microsecond, None)` column by name.
pub(crate) fn col_timestamp<'a>(
    batch: &'a RecordBatch,
    name: &str,
) -> Result<&'a TimestampMicrosecondArray, StageError> {
    let idx = col_index(batch, name)?;
    batch
        .column(idx)
        .as_any()
        .downcast_ref::<TimestampMicrosecondArray>()
        .ok_or_else(|| {
            StageError::schema(
                "COLUMN_TYPE",
                format!("column '{name}' is not a microsecond timestamp"),
            )
        })
}

/// Select a subset of rows from every column of `batch`, in `indices` order.
pub(crate) fn select_rows(batch: &RecordBatch, indices: &[u32]) -> Result<RecordBatch, StageError> {
    let idx = UInt32Array::from(indices.to_vec());
    let idx_ref = &idx as &dyn Array;
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(batch.num_columns());
    for column in batch.columns() {
        let filtered = arrow::compute::take(column.as_ref(), idx_ref, None).map_err(|e| {
            StageError::schema("ROW_SELECT", format!("failed to select rows: {e}"))
        })?;
        arrays.push(filtered);
    }
    RecordBatch::try_new(Arc::clone(&batch.schema()), arrays).map_err(|e| {
        StageError::schema(
            "ROW_SELECT",
            format!("failed to build filtered record batch: {e}"),
        )
    })
}
