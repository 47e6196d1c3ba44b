//! Command-line argument definitions

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

/// How results are printed on stdout
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Yaml,
}

/// Arguments for the rename command
#[derive(Args, Debug)]
pub struct RenameArgs {
    /// Video files or directories to rename
    #[arg(short, long = "in", required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,

    /// Directory the renamed copies are saved to
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Capture the frame at this many seconds (default: middle of the video)
    #[arg(long)]
    pub at: Option<f64>,

    /// Save each file as soon as its title is ready
    #[arg(long)]
    pub auto_download: bool,

    /// Save every analyzed file without asking
    #[arg(short, long)]
    pub yes: bool,

    /// Only process files with these names
    #[arg(long)]
    pub only: Vec<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Arguments for the suggest command
#[derive(Args, Debug)]
pub struct SuggestArgs {
    /// Video files or directories to analyze
    #[arg(short, long = "in", required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,

    /// Capture the frame at this many seconds (default: middle of the video)
    #[arg(long)]
    pub at: Option<f64>,

    /// Only process files with these names
    #[arg(long)]
    pub only: Vec<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Arguments for the frame command
#[derive(Args, Debug)]
pub struct FrameArgs {
    /// Input video file path
    #[arg(short, long = "in")]
    pub input: PathBuf,

    /// Capture time in seconds (default: middle of the video)
    #[arg(long)]
    pub at: Option<f64>,

    /// Where to write the JPEG
    #[arg(short, long)]
    pub out: PathBuf,
}

/// Arguments for the sanitize command
#[derive(Args, Debug)]
pub struct SanitizeArgs {
    /// Title to turn into a file name
    #[arg(short, long, allow_hyphen_values = true)]
    pub title: String,

    /// Extension to append, with or without the dot
    #[arg(short, long, default_value = "")]
    pub ext: String,
}

/// Arguments for the logo command
#[derive(Args, Debug)]
pub struct LogoArgs {
    #[command(subcommand)]
    pub action: LogoAction,
}

#[derive(Subcommand, Debug)]
pub enum LogoAction {
    /// Store an image as the logo
    Set {
        /// Image file (PNG, JPEG, GIF, WebP...)
        image: PathBuf,
    },
    /// Print the stored logo
    Show {
        /// Print the whole data URI instead of a summary
        #[arg(long)]
        uri: bool,
    },
    /// Forget the stored logo
    Remove,
}
