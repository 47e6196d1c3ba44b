// Domain errors - Error types for the domain layer

use thiserror::Error;

use crate::domain::model::FileId;

/// Domain-specific error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Provider credential missing or otherwise unusable configuration
    #[error("{0}")]
    Configuration(String),
    /// Invalid arguments provided
    #[error("Bad arguments: {0}")]
    BadArgs(String),
    /// Nothing in the working set is eligible for a bulk action
    #[error("{0}")]
    NothingEligible(String),
    /// No record with the given id
    #[error("No file with id {0}")]
    UnknownRecord(FileId),
    /// Frame extraction failed
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    /// Vision provider call failed
    #[error(transparent)]
    Provider(#[from] ProviderError),
    /// Exporting the renamed file failed
    #[error("Export failed: {0}")]
    Export(String),
    /// File system failure outside of export
    #[error("File system error: {0}")]
    FsFail(String),
    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Why a representative frame could not be taken from a video
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Video playback aborted.")]
    Aborted,
    #[error("A network error caused video download to fail.")]
    Network,
    #[error("Video playback aborted due to a corruption problem or because the video used features your browser did not support.")]
    Decode,
    #[error("The video could not be loaded, either because the server or network failed or because the format is not supported.")]
    FormatUnsupported,
    #[error("An unknown video error occurred.")]
    Unknown,
    /// The stream decoded but produced no picture to capture
    #[error("Could not extract frame.")]
    NoFrame,
}

/// Failures talking to the vision model
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Gemini API Key is not configured.")]
    MissingCredential,
    #[error("Invalid Gemini API Key. Please check your configuration.")]
    InvalidCredential,
    #[error("No text content in Gemini API response.")]
    EmptyResponse,
    #[error("Gemini API request failed: {0}")]
    Request(String),
    #[error("An unknown error occurred while communicating with the Gemini API.")]
    Unknown,
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::FsFail(err.to_string())
    }
}
