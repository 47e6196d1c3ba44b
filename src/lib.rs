//! Reel Renamer Library
//!
//! Names video files after what they show: a frame is taken from each
//! video, a vision model suggests a catchy title, and the unmodified
//! video is saved under the sanitized title.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use domain::errors::{DomainError, ExtractionError, ProviderError};
pub use domain::model::{FileId, FileRecord, FileStatus, FrameImage, VideoSource};
pub use domain::rules::sanitize_filename;

/// Initialize the media libraries used for frame extraction
pub fn init() -> Result<(), DomainError> {
    ffmpeg_next::init()
        .map_err(|e| DomainError::InternalError(format!("FFmpeg initialization failed: {}", e)))
}
