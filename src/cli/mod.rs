//! CLI module for Reel Renamer
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

/// Reel Renamer
///
/// Looks at a frame of each video, asks a vision model for a catchy title
/// and saves the video under that title.
#[derive(Parser, Debug)]
#[command(name = "reel-renamer")]
#[command(about = "Reel Renamer - AI titles for your video files")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Logging level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true, env = "RENAMER_LOG_LEVEL")]
    pub log_level: String,

    /// Configuration file (defaults to reel_renamer.toml, then the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze videos and save them under their suggested titles
    Rename(args::RenameArgs),
    /// Analyze videos and print the suggested titles without saving
    Suggest(args::SuggestArgs),
    /// Save the frame that would be sent for analysis
    Frame(args::FrameArgs),
    /// Print the file name a title would be saved under
    Sanitize(args::SanitizeArgs),
    /// Manage the stored logo
    Logo(args::LogoArgs),
}
