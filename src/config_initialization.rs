//! Configuration initialization and hierarchy management

use anyhow::{Context, Result};
use tracing::info;

use crate::adapters::{AppConfig, TomlConfigAdapter};
use crate::cli::{Cli, Commands};

/// Build the effective configuration following precedence: CLI > Env > File > Defaults
pub fn initialize_configuration_hierarchy(cli: &Cli) -> Result<AppConfig> {
    info!("Initializing configuration hierarchy");

    // Steps 1-3: defaults, then the first config file found, then environment
    let mut config = TomlConfigAdapter::new()
        .load(cli.config.as_deref())
        .context("Failed to load configuration")?;

    // Step 4: Override with CLI arguments
    apply_cli_configuration_overrides(&mut config, &cli.command);
    config.validate().context("Invalid configuration")?;

    info!("Configuration hierarchy initialized successfully");
    Ok(config)
}

/// Apply CLI argument overrides to configuration
pub fn apply_cli_configuration_overrides(config: &mut AppConfig, command: &Commands) {
    let mut cli_overrides = 0;

    let at = match command {
        Commands::Rename(args) => {
            if let Some(out) = &args.out {
                info!("CLI override: output_dir = {}", out.display());
                config.output_dir = out.clone();
                cli_overrides += 1;
            }
            if args.auto_download {
                info!("CLI override: auto_download = true");
                config.auto_download = true;
                cli_overrides += 1;
            }
            args.at
        }
        Commands::Suggest(args) => args.at,
        Commands::Frame(args) => args.at,
        Commands::Sanitize(_) | Commands::Logo(_) => None,
    };

    if let Some(at) = at {
        info!("CLI override: frame_at_seconds = {}", at);
        config.frame_at_seconds = Some(at);
        cli_overrides += 1;
    }

    if cli_overrides > 0 {
        info!("Applied {} CLI configuration overrides", cli_overrides);
    }
}
