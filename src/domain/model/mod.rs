// Domain models - Core types and data structures

use std::borrow::Cow;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::errors::DomainError;

/// Progress reported when a record enters analysis
pub const PROGRESS_STARTED: u8 = 10;
/// Progress reported while the frame is being extracted
pub const PROGRESS_EXTRACTING: u8 = 30;
/// Progress reported while the model is being prompted
pub const PROGRESS_PROMPTING: u8 = 60;
/// Progress of a finished record
pub const PROGRESS_DONE: u8 = 100;

/// Opaque record identifier, unique within a working set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct FileId(Uuid);

impl FileId {
    /// Allocate a fresh identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identifier from its hyphenated form
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        Uuid::parse_str(value.trim())
            .map(Self)
            .map_err(|e| DomainError::BadArgs(format!("Invalid file id '{}': {}", value, e)))
    }

    /// First block of the identifier, enough to tell rows apart on screen
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for FileId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a record is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FileStatus {
    Pending,
    Analyzing,
    Analyzed,
    Renamed,
    Error,
}

impl FileStatus {
    /// Human-readable label shown next to each row
    pub fn label(&self) -> &'static str {
        match self {
            FileStatus::Pending => "Pending Analysis",
            FileStatus::Analyzing => "Analyzing",
            FileStatus::Analyzed => "Analysis Complete",
            FileStatus::Renamed => "Downloaded",
            FileStatus::Error => "Error",
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where the content of a [`VideoSource`] lives
#[derive(Debug, Clone)]
enum SourceContent {
    /// Bytes already in memory, shared between clones
    Memory(Arc<[u8]>),
    /// A file on disk, read only when extracting or exporting
    File(PathBuf),
}

/// User-supplied video content and the name it arrived under.
///
/// Sources backed by a file are lazy handles: intake records the path
/// and size, and the content is streamed from disk when needed. The
/// content is never written to.
#[derive(Debug, Clone)]
pub struct VideoSource {
    name: String,
    content_type: String,
    size: u64,
    content: SourceContent,
}

impl VideoSource {
    /// Create a source from its original name, MIME type and in-memory content
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        let bytes: Arc<[u8]> = bytes.into();
        Self {
            name: name.into(),
            content_type: content_type.into(),
            size: bytes.len() as u64,
            content: SourceContent::Memory(bytes),
        }
    }

    /// Create a source for a file on disk without reading it
    pub fn from_file(
        name: impl Into<String>,
        content_type: impl Into<String>,
        path: impl Into<PathBuf>,
        size: u64,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            size,
            content: SourceContent::File(path.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Path of the backing file, `None` for in-memory sources
    pub fn path(&self) -> Option<&Path> {
        match &self.content {
            SourceContent::File(path) => Some(path),
            SourceContent::Memory(_) => None,
        }
    }

    /// Stream the content from the start
    pub fn open(&self) -> Result<Box<dyn Read + Send + '_>, DomainError> {
        match &self.content {
            SourceContent::Memory(bytes) => Ok(Box::new(&bytes[..])),
            SourceContent::File(path) => {
                let file = File::open(path)
                    .map_err(|e| DomainError::FsFail(format!("Failed to open {}: {}", path.display(), e)))?;
                Ok(Box::new(BufReader::new(file)))
            }
        }
    }

    /// Whole content; borrowed for in-memory sources, read from disk otherwise
    pub fn read_bytes(&self) -> Result<Cow<'_, [u8]>, DomainError> {
        match &self.content {
            SourceContent::Memory(bytes) => Ok(Cow::Borrowed(&bytes[..])),
            SourceContent::File(path) => std::fs::read(path)
                .map(Cow::Owned)
                .map_err(|e| DomainError::FsFail(format!("Failed to read {}: {}", path.display(), e))),
        }
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// True when the content type announces a video
    pub fn is_video(&self) -> bool {
        self.content_type.starts_with("video/")
    }
}

/// Per-uploaded-file unit of state tracked through the pipeline
#[derive(Debug, Clone, Serialize)]
pub struct FileRecord {
    pub id: FileId,
    #[serde(skip)]
    pub source: VideoSource,
    pub original_name: String,
    pub suggested_name: String,
    pub status: FileStatus,
    pub progress: u8,
    pub is_selected: bool,
    pub size_bytes: u64,
    pub added_at: DateTime<Utc>,
    pub exported_to: Option<PathBuf>,
}

impl FileRecord {
    /// Create a pending, selected record for a freshly accepted source
    pub fn new(source: VideoSource) -> Self {
        Self {
            id: FileId::new(),
            original_name: source.name().to_string(),
            size_bytes: source.size(),
            source,
            suggested_name: String::new(),
            status: FileStatus::Pending,
            progress: 0,
            is_selected: true,
            added_at: Utc::now(),
            exported_to: None,
        }
    }

    /// Apply a status transition, keeping fields the caller leaves out
    pub fn transition(&mut self, status: FileStatus, progress: Option<u8>, suggested_name: Option<String>) {
        self.status = status;
        if let Some(progress) = progress {
            self.progress = progress.min(PROGRESS_DONE);
        }
        if let Some(name) = suggested_name {
            self.suggested_name = name;
        }
    }

    /// Mark the record failed with a human-readable message
    pub fn fail(&mut self, message: impl fmt::Display) {
        self.transition(FileStatus::Error, Some(0), Some(format!("Error: {}", message)));
    }

    pub fn has_suggested_name(&self) -> bool {
        !self.suggested_name.trim().is_empty()
    }
}

/// A still image encoded as a data URI (`data:<mime>;base64,<payload>`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameImage {
    uri: String,
    header_len: usize,
}

impl FrameImage {
    /// Encode raw image bytes under the given MIME type
    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        let header = format!("data:{};base64,", mime_type);
        let header_len = header.len();
        let mut uri = header;
        STANDARD.encode_string(bytes, &mut uri);
        Self { uri, header_len }
    }

    /// Validate an existing data URI
    pub fn parse(uri: impl Into<String>) -> Result<Self, DomainError> {
        let uri = uri.into();
        let comma = uri
            .find(',')
            .ok_or_else(|| DomainError::BadArgs("Data URI has no payload separator".to_string()))?;
        let header = &uri[..comma];
        if !header.starts_with("data:") || !header.ends_with(";base64") {
            return Err(DomainError::BadArgs(format!("Not a base64 data URI: {}", header)));
        }
        if header.len() <= "data:;base64".len() {
            return Err(DomainError::BadArgs("Data URI has no MIME type".to_string()));
        }
        Ok(Self {
            header_len: comma + 1,
            uri,
        })
    }

    /// The MIME type announced in the header
    pub fn mime_type(&self) -> &str {
        &self.uri["data:".len()..self.header_len - ";base64,".len()]
    }

    /// Base64 payload with the header stripped
    pub fn payload(&self) -> &str {
        &self.uri[self.header_len..]
    }

    /// Decode the payload back to raw image bytes
    pub fn decode(&self) -> Result<Vec<u8>, DomainError> {
        STANDARD
            .decode(self.payload())
            .map_err(|e| DomainError::BadArgs(format!("Invalid base64 payload: {}", e)))
    }

    pub fn as_uri(&self) -> &str {
        &self.uri
    }
}

impl fmt::Display for FrameImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri)
    }
}
