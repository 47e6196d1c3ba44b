// Filesystem intake adapter - Turns user-supplied paths into video sources

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::content_type_for;

/// Collects files from paths given on the command line.
///
/// Directories are walked recursively in name order. Content types come
/// from the file extension; filtering to videos is left to the pipeline
/// so it can report what it skipped.
pub struct FsIntakeAdapter {
    follow_links: bool,
}

impl FsIntakeAdapter {
    pub fn new() -> Self {
        Self { follow_links: false }
    }

    pub fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Every regular file below `inputs`, in a stable order
    pub fn collect_paths(&self, inputs: &[PathBuf]) -> Result<Vec<PathBuf>, DomainError> {
        let mut files = Vec::new();
        for input in inputs {
            if !input.exists() {
                return Err(DomainError::FsFail(format!("Input does not exist: {}", input.display())));
            }
            if input.is_file() {
                files.push(input.clone());
                continue;
            }
            for entry in WalkDir::new(input)
                .follow_links(self.follow_links)
                .sort_by_file_name()
            {
                let entry = entry.map_err(|e| DomainError::FsFail(format!("Failed to walk {}: {}", input.display(), e)))?;
                if entry.file_type().is_file() && !is_hidden(entry.path()) {
                    files.push(entry.into_path());
                }
            }
        }
        Ok(files)
    }

    /// Describe one file without reading its content
    pub fn read_source(&self, path: &Path) -> Result<VideoSource, DomainError> {
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| DomainError::BadArgs(format!("Unusable file name: {}", path.display())))?
            .to_string();
        let metadata =
            fs::metadata(path).map_err(|e| DomainError::FsFail(format!("Failed to read {}: {}", path.display(), e)))?;
        if !metadata.is_file() {
            return Err(DomainError::FsFail(format!("Not a regular file: {}", path.display())));
        }
        let content_type = content_type_for(&name);
        tracing::debug!("Found {} ({} bytes, {})", name, metadata.len(), content_type);
        Ok(VideoSource::from_file(name, content_type, path, metadata.len()))
    }

    /// Walk `inputs` and describe every file found
    pub fn read_all(&self, inputs: &[PathBuf]) -> Result<Vec<VideoSource>, DomainError> {
        self.collect_paths(inputs)?
            .iter()
            .map(|path| self.read_source(path))
            .collect()
    }
}

impl Default for FsIntakeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}
