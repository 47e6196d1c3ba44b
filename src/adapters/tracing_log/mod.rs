// Tracing log adapter - Structured logging using tracing crate

use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::domain::errors::*;
use crate::ports::*;

/// Tracing log adapter
pub struct TracingLogAdapter {
    current_level: LogLevel,
}

impl TracingLogAdapter {
    /// Create new tracing log adapter filtering below `level`
    pub fn new(level: LogLevel) -> Self {
        Self { current_level: level }
    }

    /// Install the global subscriber.
    ///
    /// `RUST_LOG` wins over `level` when set. Installing twice is harmless,
    /// the second call keeps the first subscriber.
    pub fn install(level: LogLevel, json_output: bool) -> Result<Self, DomainError> {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("reel_renamer={}", level.as_filter())));

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false);

        // Ignore the error: a subscriber may already be set (tests, embedding)
        let _ = if json_output {
            builder.json().try_init()
        } else {
            builder.try_init()
        };

        Ok(Self::new(level))
    }

    /// Check if log level should be logged
    fn should_log(&self, level: LogLevel) -> bool {
        level >= self.current_level
    }
}

impl LogPort for TracingLogAdapter {
    fn info(&self, message: &str) {
        if self.should_log(LogLevel::Info) {
            info!("{}", message);
        }
    }

    fn warn(&self, message: &str) {
        if self.should_log(LogLevel::Warn) {
            warn!("{}", message);
        }
    }

    fn error(&self, message: &str) {
        if self.should_log(LogLevel::Error) {
            error!("{}", message);
        }
    }

    fn debug(&self, message: &str) {
        if self.should_log(LogLevel::Debug) {
            debug!("{}", message);
        }
    }
}
