//! Reel Renamer CLI
//!
//! Gives video files catchy names based on what they show.
//!
//! # Usage
//!
//! ```bash
//! reel-renamer rename --in ./clips --out ./renamed
//! reel-renamer suggest --in clip.mov --format json
//! reel-renamer sanitize --title "Cat Fails Epic Jump #LOL" --ext .mov
//! ```

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use reel_renamer::adapters::TracingLogAdapter;
use reel_renamer::app::container::DefaultAppContainer;
use reel_renamer::cli::{commands, Cli, Commands};
use reel_renamer::config_initialization::initialize_configuration_hierarchy;
use reel_renamer::ports::{LogLevel, LogPort};

/// Main entry point for the Reel Renamer CLI application
#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    let level = LogLevel::parse(&cli.log_level)?;
    let log_port: Arc<dyn LogPort> = Arc::new(TracingLogAdapter::install(level, cli.json_logs)?);

    info!("Starting Reel Renamer");

    // Sanitizing needs neither configuration nor media libraries
    if let Commands::Sanitize(args) = &cli.command {
        return commands::sanitize(args);
    }

    let config = initialize_configuration_hierarchy(&cli)?;
    let container = DefaultAppContainer::new(config, log_port)?;

    // Execute the requested command
    match cli.command {
        Commands::Rename(args) => commands::rename(&container, args).await?,
        Commands::Suggest(args) => commands::suggest(&container, args).await?,
        Commands::Frame(args) => commands::frame(&container, args).await?,
        Commands::Logo(args) => commands::logo(&container, args)?,
        Commands::Sanitize(args) => commands::sanitize(&args)?,
    }

    info!("Reel Renamer completed successfully");
    Ok(())
}
