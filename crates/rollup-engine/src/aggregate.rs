//! Daily aggregation: event counts per (user, calendar date).

use std::collections::BTreeMap;
use std::sync::Arc;

use arrow::array::{Array, Date32Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;

use rollup_types::error::StageError;
use rollup_types::summary::AggregateSummary;

use crate::arrow_utils::{col_str, col_timestamp};
use crate::errors::PipelineError;

const MICROS_PER_DAY: i64 = 86_400_000_000;

/// Schema of the daily aggregate table.
pub fn daily_aggregate_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("user_id", DataType::Utf8, false),
        Field::new("event_date", DataType::Date32, false),
        Field::new("event_count", DataType::Int64, false),
    ]))
}

/// Group enriched events by `(user_id, event_date)` and count them.
///
/// `event_date` truncates the normalized wall-clock timestamp to its
/// calendar date; no timezone conversion happens here or upstream, so the
/// date boundary is the source clock's midnight. The output is sparse
/// (`event_count >= 1` on every row) and sorted by key, so a re-run over
/// identical input produces an identical table.
///
/// # Errors
///
/// Returns a schema error if the grouping columns are missing, mistyped,
/// or null (the cleaner guarantees both non-null).
pub fn aggregate_daily(
    enriched: &RecordBatch,
) -> Result<(RecordBatch, AggregateSummary), PipelineError> {
    let user_ids = col_str(enriched, "user_id")?;
    let timestamps = col_timestamp(enriched, "timestamp")?;

    let mut groups: BTreeMap<(&str, i32), i64> = BTreeMap::new();
    for row in 0..enriched.num_rows() {
        if user_ids.is_null(row) || timestamps.is_null(row) {
            return Err(StageError::schema(
                "NULL_GROUP_KEY",
                format!("enriched row {row} has a null user_id or timestamp"),
            )
            .into());
        }
        let days = timestamps.value(row).div_euclid(MICROS_PER_DAY) as i32;
        *groups.entry((user_ids.value(row), days)).or_insert(0) += 1;
    }

    let mut out_users = Vec::with_capacity(groups.len());
    let mut out_dates = Vec::with_capacity(groups.len());
    let mut out_counts = Vec::with_capacity(groups.len());
    for ((user, day), count) in &groups {
        out_users.push(*user);
        out_dates.push(*day);
        out_counts.push(*count);
    }

    let summary = AggregateSummary {
        rows_in: enriched.num_rows() as u64,
        groups: groups.len() as u64,
    };

    let batch = RecordBatch::try_new(
        daily_aggregate_schema(),
        vec![
            Arc::new(StringArray::from(out_users)),
            Arc::new(Date32Array::from(out_dates)),
            Arc::new(Int64Array::from(out_counts)),
        ],
    )
    .map_err(|e| {
        StageError::schema(
            "AGGREGATE_BUILD",
            format!("failed to build daily aggregate table: {e}"),
        )
    })?;

    tracing::info!(
        rows_in = summary.rows_in,
        groups = summary.groups,
        "Aggregated events per user per day"
    );

    Ok((batch, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::TimestampMicrosecondArray;
    use arrow::datatypes::TimeUnit;
    use chrono::NaiveDate;

    fn micros(y: i32, m: u32, d: u32, h: u32) -> i64 {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
            .and_utc()
            .timestamp_micros()
    }

    fn day(y: i32, m: u32, d: u32) -> i32 {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .signed_duration_since(epoch)
            .num_days() as i32
    }

    fn enriched_batch(rows: &[(&str, i64)]) -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("user_id", DataType::Utf8, false),
            Field::new(
                "timestamp",
                DataType::Timestamp(TimeUnit::Microsecond, None),
                false,
            ),
        ]));
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(
                    rows.iter().map(|r| r.0).collect::<Vec<_>>(),
                )),
                Arc::new(TimestampMicrosecondArray::from(
                    rows.iter().map(|r| r.1).collect::<Vec<_>>(),
                )),
            ],
        )
        .expect("enriched batch should build")
    }

    #[test]
    fn groups_by_user_and_date() {
        let batch = enriched_batch(&[
            ("u1", micros(2024, 1, 1, 10)),
            ("u1", micros(2024, 1, 1, 23)),
            ("u2", micros(2024, 1, 2, 0)),
        ]);
        let (daily, summary) = aggregate_daily(&batch).unwrap();
        assert_eq!(daily.num_rows(), 2);
        assert_eq!(summary.groups, 2);
        assert_eq!(summary.rows_in, 3);

        let users = col_str(&daily, "user_id").unwrap();
        let dates = daily
            .column(1)
            .as_any()
            .downcast_ref::<Date32Array>()
            .unwrap();
        let counts = daily
            .column(2)
            .as_any()
            .downcast_ref::<Int64Array>()
            .unwrap();
        assert_eq!(users.value(0), "u1");
        assert_eq!(dates.value(0), day(2024, 1, 1));
        assert_eq!(counts.value(0), 2);
        assert_eq!(users.value(1), "u2");
        assert_eq!(dates.value(1), day(2024, 1, 2));
        assert_eq!(counts.value(1), 1);
    }

    #[test]
    fn same_user_different_dates_are_distinct_groups() {
        let batch = enriched_batch(&[
            ("u1", micros(2024, 1, 1, 23)),
            ("u1", micros(2024, 1, 2, 0)),
        ]);
        let (daily, _) = aggregate_daily(&batch).unwrap();
        assert_eq!(daily.num_rows(), 2);
    }

    #[test]
    fn count_conservation() {
        let batch = enriched_batch(&[
            ("u1", micros(2024, 1, 1, 1)),
            ("u2", micros(2024, 1, 1, 2)),
            ("u1", micros(2024, 1, 1, 3)),
            ("u3", micros(2024, 1, 5, 4)),
        ]);
        let (daily, _) = aggregate_daily(&batch).unwrap();
        let counts = daily
            .column(2)
            .as_any()
            .downcast_ref::<Int64Array>()
            .unwrap();
        let total: i64 = (0..counts.len()).map(|i| counts.value(i)).sum();
        assert_eq!(total, batch.num_rows() as i64);
    }

    #[test]
    fn output_is_order_independent() {
        let forward = enriched_batch(&[
            ("u1", micros(2024, 1, 1, 10)),
            ("u2", micros(2024, 1, 2, 11)),
            ("u1", micros(2024, 1, 1, 12)),
        ]);
        let reversed = enriched_batch(&[
            ("u1", micros(2024, 1, 1, 12)),
            ("u2", micros(2024, 1, 2, 11)),
            ("u1", micros(2024, 1, 1, 10)),
        ]);
        let (a, _) = aggregate_daily(&forward).unwrap();
        let (b, _) = aggregate_daily(&reversed).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn pre_epoch_timestamps_truncate_toward_past() {
        // 1969-12-31T23:00 must land on 1969-12-31 (day -1), not day 0.
        let batch = enriched_batch(&[("u1", micros(1969, 12, 31, 23))]);
        let (daily, _) = aggregate_daily(&batch).unwrap();
        let dates = daily
            .column(1)
            .as_any()
            .downcast_ref::<Date32Array>()
            .unwrap();
        assert_eq!(dates.value(0), -1);
    }

    #[test]
    fn empty_input_produces_empty_aggregate() {
        let batch = enriched_batch(&[]);
        let (daily, summary) = aggregate_daily(&batch).unwrap();
        assert_eq!(daily.num_rows(), 0);
        assert_eq!(summary.groups, 0);
    }
}
