#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the lead-map sync job.

use clap::{Parser, Subcommand};
use lead_map_ingest::config::SkidConfig;
use lead_map_ingest::{process, secrets};

#[derive(Parser)]
#[command(name = "lead_map_ingest", about = "Lead service line map sync job")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one full sync: points, areas, and the summary mail
    Run,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            // Secrets load before any network call; a missing file is fatal.
            let loaded_secrets = secrets::load()?;
            let config = SkidConfig::embedded()?;
            process(&loaded_secrets, &config).await?;
        }
    }

    Ok(())
}
