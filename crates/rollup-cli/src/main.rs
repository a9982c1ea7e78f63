mod commands;
mod logging;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "rollup",
    version,
    about = "Batch pipeline computing per-user daily activity rollups"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline end-to-end
    Run {
        /// Path to pipeline YAML file
        pipeline: PathBuf,
        /// Print the run summary as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Validate pipeline configuration and input files without writing
    Check {
        /// Path to pipeline YAML file
        pipeline: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init(&cli.log_level);

    match cli.command {
        Commands::Run { pipeline, json } => commands::run::execute(&pipeline, json),
        Commands::Check { pipeline } => commands::check::execute(&pipeline),
    }
}
