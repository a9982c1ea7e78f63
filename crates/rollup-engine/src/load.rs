//! Parquet serialization of the pipeline outputs.
//!
//! Writes go to a `.tmp` sibling first and are renamed into place, so a
//! failed run never leaves a partial output file at the destination.

use std::fs::File;
use std::path::{Path, PathBuf};

use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::properties::WriterProperties;

use rollup_types::error::StageError;

use crate::config::types::OutputCompression;
use crate::errors::PipelineError;

fn codec(compression: OutputCompression) -> Compression {
    match compression {
        OutputCompression::None => Compression::UNCOMPRESSED,
        OutputCompression::Snappy => Compression::SNAPPY,
        OutputCompression::Zstd => Compression::ZSTD(ZstdLevel::default()),
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_else(|| std::ffi::OsString::from("output"));
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_file(batch: &RecordBatch, tmp: &Path, compression: OutputCompression) -> Result<(), StageError> {
    let file = File::create(tmp).map_err(|e| {
        StageError::output(
            "OUTPUT_CREATE",
            format!("failed to create {}: {e}", tmp.display()),
        )
    })?;
    let props = WriterProperties::builder()
        .set_compression(codec(compression))
        .build();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props)).map_err(|e| {
        StageError::output("PARQUET_INIT", format!("parquet writer init failed: {e}"))
    })?;
    writer
        .write(batch)
        .map_err(|e| StageError::output("PARQUET_WRITE", format!("parquet write failed: {e}")))?;
    writer
        .close()
        .map_err(|e| StageError::output("PARQUET_CLOSE", format!("parquet close failed: {e}")))?;
    Ok(())
}

/// Serialize `batch` to a Parquet file at `path`, atomically.
///
/// Parent directories are created as needed. Returns the number of rows
/// written.
///
/// # Errors
///
/// Returns an output error on any file-system or Parquet failure; the
/// staging file is removed, and the destination path is left untouched.
pub fn write_parquet(
    batch: &RecordBatch,
    path: &Path,
    compression: OutputCompression,
) -> Result<u64, PipelineError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StageError::output(
                    "OUTPUT_DIR",
                    format!("failed to create output directory {}: {e}", parent.display()),
                )
            })?;
        }
    }

    let tmp = staging_path(path);
    if let Err(e) = write_file(batch, &tmp, compression) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(StageError::output(
            "OUTPUT_RENAME",
            format!("failed to move {} into place: {e}", path.display()),
        )
        .into());
    }

    tracing::info!(rows = batch.num_rows(), path = %path.display(), "Wrote Parquet output");
    Ok(batch.num_rows() as u64)
}
