use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub version: String,
    pub pipeline: String,
    pub source: SourceConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Raw events dump: a JSON array of event objects.
    pub events_path: PathBuf,
    /// User dimension: CSV with a header row, keyed by `user_id`.
    pub users_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Destination of the daily aggregate Parquet file.
    pub path: PathBuf,
    #[serde(default)]
    pub compression: OutputCompression,
    /// Optional second output: the full enriched events table.
    #[serde(default)]
    pub enriched_path: Option<PathBuf>,
}

/// Parquet compression codec for the output files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputCompression {
    None,
    #[default]
    Snappy,
    Zstd,
}
