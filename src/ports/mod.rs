// Ports - Interface definitions (contracts)

use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::errors::*;
use crate::domain::model::*;

/// Port for taking a representative still out of a video
#[async_trait]
pub trait FrameExtractPort: Send + Sync {
    /// Capture the frame at `at_seconds` (clamped to the duration), or the
    /// middle frame when no time is given
    async fn extract_frame(
        &self,
        source: &VideoSource,
        at_seconds: Option<f64>,
    ) -> Result<FrameImage, ExtractionError>;
}

/// Port for the generative vision model
#[async_trait]
pub trait VisionPort: Send + Sync {
    /// Send one image and one prompt, returning the trimmed reply text
    async fn describe_frame(&self, frame: &FrameImage, prompt: &str) -> Result<String, ProviderError>;
}

/// Port for handing a file's original bytes to the host under a new name
pub trait ExportPort: Send + Sync {
    /// Save `source` unmodified as `file_name`, returning where it landed
    fn export(&self, source: &VideoSource, file_name: &str) -> Result<PathBuf, DomainError>;
}

/// Port for small persisted key-value state
pub trait KeyValuePort: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, DomainError>;

    fn set(&self, key: &str, value: &str) -> Result<(), DomainError>;

    fn remove(&self, key: &str) -> Result<(), DomainError>;
}

/// Port for logging and observability
pub trait LogPort: Send + Sync {
    /// Log info message
    fn info(&self, message: &str);

    /// Log warning message
    fn warn(&self, message: &str);

    /// Log error message
    fn error(&self, message: &str);

    /// Log debug message
    fn debug(&self, message: &str);
}

/// Receives every record state change made by the pipeline
pub trait PipelineObserver: Send + Sync {
    fn record_changed(&self, record: &FileRecord);

    /// A record was removed from the working set
    fn record_removed(&self, _id: FileId) {}
}

/// Observer that ignores every notification
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {
    fn record_changed(&self, _record: &FileRecord) {}
}

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Parse log level from string
    pub fn parse(level_str: &str) -> Result<Self, DomainError> {
        match level_str.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(DomainError::BadArgs(format!(
                "Invalid log level: {}. Valid levels: trace, debug, info, warn, error",
                level_str
            ))),
        }
    }

    /// Directive understood by `tracing_subscriber::EnvFilter`
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
