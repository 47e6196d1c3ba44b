// TOML config adapter - Configuration management using TOML files and environment

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::errors::*;
use crate::domain::rules::DEFAULT_PROMPT;

/// Gemini endpoint used when none is configured
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
/// Model asked for titles when none is configured
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
/// Environment variables that may carry the provider credential, in lookup order
pub const CREDENTIAL_VARS: &[&str] = &["API_KEY", "GEMINI_API_KEY"];

/// Message shown once when no credential is available
pub const MISSING_CREDENTIAL_MESSAGE: &str =
    "Gemini API Key is missing. Please ensure it's set in your environment variables.";

/// Effective application settings
#[derive(Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub prompt: String,
    pub output_dir: PathBuf,
    pub auto_download: bool,
    pub frame_at_seconds: Option<f64>,
    pub jpeg_quality: u8,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            prompt: DEFAULT_PROMPT.to_string(),
            output_dir: PathBuf::from("renamed"),
            auto_download: false,
            frame_at_seconds: None,
            jpeg_quality: 100,
        }
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("output_dir", &self.output_dir)
            .field("auto_download", &self.auto_download)
            .field("frame_at_seconds", &self.frame_at_seconds)
            .field("jpeg_quality", &self.jpeg_quality)
            .finish()
    }
}

impl AppConfig {
    /// The credential, or the configuration error that disables analysis
    pub fn credential(&self) -> Result<&str, DomainError> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| DomainError::Configuration(MISSING_CREDENTIAL_MESSAGE.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.model.trim().is_empty() {
            return Err(DomainError::BadArgs("Model name cannot be empty".to_string()));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(DomainError::BadArgs(format!(
                "Base URL must be http(s): {}",
                self.base_url
            )));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(DomainError::BadArgs(format!(
                "JPEG quality must be between 1 and 100, got {}",
                self.jpeg_quality
            )));
        }
        if let Some(at) = self.frame_at_seconds {
            if !at.is_finite() || at < 0.0 {
                return Err(DomainError::BadArgs(format!(
                    "Frame time must be a non-negative number of seconds, got {}",
                    at
                )));
            }
        }
        Ok(())
    }
}

/// On-disk layout: everything lives under `[renamer]`
#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    renamer: AppConfig,
}

/// TOML configuration adapter
pub struct TomlConfigAdapter {
    search_paths: Vec<PathBuf>,
}

impl TomlConfigAdapter {
    /// Create new TOML config adapter with the default search path
    pub fn new() -> Self {
        let mut search_paths = vec![PathBuf::from("reel_renamer.toml")];
        search_paths.push(Self::default_config_path());
        Self { search_paths }
    }

    /// Adapter that only looks at the given files
    pub fn with_search_paths(search_paths: Vec<PathBuf>) -> Self {
        Self { search_paths }
    }

    /// Per-user config file, falling back to the current directory
    pub fn default_config_path() -> PathBuf {
        match dirs::config_dir() {
            Some(dir) => dir.join("reel-renamer").join("config.toml"),
            None => PathBuf::from("reel_renamer_config.toml"),
        }
    }

    /// Defaults, then the first config file found (or `explicit`, which must
    /// exist), then process environment overrides
    pub fn load(&self, explicit: Option<&Path>) -> Result<AppConfig, DomainError> {
        let mut config = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(DomainError::FsFail(format!(
                        "Config file does not exist: {}",
                        path.display()
                    )));
                }
                Self::read_file(path)?
            }
            None => match self.search_paths.iter().find(|path| path.exists()) {
                Some(path) => Self::read_file(path)?,
                None => {
                    tracing::debug!("No config file found, using defaults");
                    AppConfig::default()
                }
            },
        };

        Self::apply_env(&mut config, |key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Read one TOML config file
    pub fn read_file(path: &Path) -> Result<AppConfig, DomainError> {
        tracing::info!("Loading configuration from: {}", path.display());
        let content = std::fs::read_to_string(path)
            .map_err(|e| DomainError::FsFail(format!("Failed to read config file: {}", e)))?;
        Self::parse(&content)
    }

    /// Deserialize config from TOML string
    pub fn parse(toml_content: &str) -> Result<AppConfig, DomainError> {
        let parsed: ConfigFile = toml::from_str(toml_content)
            .map_err(|e| DomainError::BadArgs(format!("Failed to parse TOML config: {}", e)))?;
        Ok(parsed.renamer)
    }

    /// Serialize config to TOML string (the credential is never written)
    pub fn serialize(config: &AppConfig) -> Result<String, DomainError> {
        toml::to_string_pretty(&ConfigFile {
            renamer: config.clone(),
        })
        .map_err(|e| DomainError::InternalError(format!("Failed to serialize config: {}", e)))
    }

    /// Override settings from environment variables looked up through `lookup`
    pub fn apply_env<F>(config: &mut AppConfig, lookup: F) -> Result<(), DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut overrides = 0;

        if let Some(key) = CREDENTIAL_VARS.iter().find_map(|var| lookup(var)) {
            config.api_key = Some(key);
        }
        if let Some(model) = lookup("RENAMER_MODEL") {
            config.model = model;
            overrides += 1;
        }
        if let Some(base_url) = lookup("RENAMER_BASE_URL") {
            config.base_url = base_url.trim_end_matches('/').to_string();
            overrides += 1;
        }
        if let Some(prompt) = lookup("RENAMER_PROMPT") {
            config.prompt = prompt;
            overrides += 1;
        }
        if let Some(dir) = lookup("RENAMER_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(dir);
            overrides += 1;
        }
        if let Some(flag) = lookup("RENAMER_AUTO_DOWNLOAD") {
            config.auto_download = flag.trim().parse::<bool>().map_err(|e| {
                DomainError::BadArgs(format!("Invalid boolean value for RENAMER_AUTO_DOWNLOAD: {}", e))
            })?;
            overrides += 1;
        }

        if overrides > 0 {
            tracing::info!("Applied {} environment variable overrides", overrides);
        }
        Ok(())
    }
}

impl Default for TomlConfigAdapter {
    fn default() -> Self {
        Self::new()
    }
}
