use std::path::Path;

use anyhow::{Context, Result};

use rollup_engine::config::parser;
use rollup_engine::config::types::PipelineConfig;
use rollup_engine::config::validator;

/// Execute the `check` command: validate pipeline config and input files
/// without running the pipeline or writing anything.
pub fn execute(pipeline_path: &Path) -> Result<()> {
    // 1. Parse pipeline YAML
    let config = parser::parse_pipeline(pipeline_path)
        .with_context(|| format!("Failed to parse pipeline: {}", pipeline_path.display()))?;

    // 2. Validate pipeline structure
    validator::validate_pipeline(&config)?;
    println!("Pipeline structure: OK");

    // 3. Check input files
    let events_ok = check_input("Events file", &config.source.events_path);
    let users_ok = check_input("Users file", &config.source.users_path);
    let output_ok = check_output(&config);

    if events_ok && users_ok && output_ok {
        println!("\nAll checks passed.");
        Ok(())
    } else {
        anyhow::bail!("One or more checks failed")
    }
}

fn check_input(label: &str, path: &Path) -> bool {
    if path.is_file() {
        println!("{:18} OK", format!("{}:", label));
        true
    } else {
        println!("{:18} FAILED", format!("{}:", label));
        println!("  {} is not a readable file", path.display());
        false
    }
}

fn check_output(config: &PipelineConfig) -> bool {
    // The output file need not exist; its parent just has to be creatable,
    // which create_dir_all decides at run time. Only flag the obvious case
    // of the destination being an existing directory.
    if config.output.path.is_dir() {
        println!("{:18} FAILED", "Output path:");
        println!("  {} is a directory", config.output.path.display());
        false
    } else {
        println!("{:18} OK", "Output path:");
        true
    }
}
