//! Pipeline error model.

use rollup_types::error::StageError;

// ---------------------------------------------------------------------------
// PipelineError — categorised stage errors vs. opaque infrastructure errors
// ---------------------------------------------------------------------------

/// Top-level pipeline error.
///
/// `Stage` wraps a typed [`StageError`] (input, schema, integrity, output).
/// `Infrastructure` wraps opaque host-side errors that carry no category.
/// Every variant is fatal: the run terminates and no output file is left
/// behind.
#[derive(Debug)]
pub enum PipelineError {
    /// Typed stage error.
    Stage(StageError),
    /// Infrastructure error (file system, allocation, etc.)
    Infrastructure(anyhow::Error),
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stage(e) => write!(f, "{}", e),
            Self::Infrastructure(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<StageError> for PipelineError {
    fn from(e: StageError) -> Self {
        Self::Stage(e)
    }
}

impl From<anyhow::Error> for PipelineError {
    fn from(e: anyhow::Error) -> Self {
        Self::Infrastructure(e)
    }
}

impl PipelineError {
    /// Returns the typed stage error if this is a `Stage` variant.
    pub fn as_stage_error(&self) -> Option<&StageError> {
        match self {
            Self::Stage(e) => Some(e),
            Self::Infrastructure(_) => None,
        }
    }
}
