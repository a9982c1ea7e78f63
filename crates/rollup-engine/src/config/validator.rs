//! Semantic validation for parsed pipeline configuration values.

use anyhow::{bail, Result};

use crate::config::types::PipelineConfig;

/// Validate a parsed pipeline configuration.
/// Returns `Ok(())` if valid, Err with all validation errors if not.
///
/// # Errors
///
/// Returns an error listing all validation failures found in the pipeline
/// config.
pub fn validate_pipeline(config: &PipelineConfig) -> Result<()> {
    let mut errors = Vec::new();

    if config.version != "1.0" {
        errors.push(format!(
            "Unsupported pipeline version '{}', expected '1.0'",
            config.version
        ));
    }

    if config.pipeline.trim().is_empty() {
        errors.push("Pipeline name must not be empty".to_string());
    }

    if config.source.events_path.as_os_str().is_empty() {
        errors.push("source.events_path must not be empty".to_string());
    }

    if config.source.users_path.as_os_str().is_empty() {
        errors.push("source.users_path must not be empty".to_string());
    }

    if config.source.events_path == config.source.users_path
        && !config.source.events_path.as_os_str().is_empty()
    {
        errors.push("source.events_path and source.users_path must differ".to_string());
    }

    if config.output.path.as_os_str().is_empty() {
        errors.push("output.path must not be empty".to_string());
    }

    if let Some(enriched) = &config.output.enriched_path {
        if enriched.as_os_str().is_empty() {
            errors.push("output.enriched_path must not be empty when set".to_string());
        } else if *enriched == config.output.path {
            errors.push("output.enriched_path must differ from output.path".to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        bail!("Pipeline validation failed:\n  - {}", errors.join("\n  - "));
    }
}
