// Filesystem export adapter - Streams original content to a new name

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::extension_of;
use crate::ports::*;

/// Highest ` (n)` suffix tried before giving up on a free name
const MAX_COLLISION_SUFFIX: u32 = 9999;

/// Writes exported files into one output directory
pub struct FsExportAdapter {
    output_dir: PathBuf,
}

impl FsExportAdapter {
    /// Create new export adapter writing into `output_dir` (created on first export)
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Reject names that would escape the output directory
    fn validate_file_name(file_name: &str) -> Result<(), DomainError> {
        if file_name.trim().is_empty() {
            return Err(DomainError::Export("File name is empty".to_string()));
        }
        if file_name.contains(['/', '\\']) || file_name == "." || file_name == ".." {
            return Err(DomainError::Export(format!(
                "File name must not contain path separators: {}",
                file_name
            )));
        }
        Ok(())
    }

    /// First free path for `file_name`, adding ` (1)`, ` (2)`... before the extension
    fn free_path(&self, file_name: &str) -> Result<PathBuf, DomainError> {
        let candidate = self.output_dir.join(file_name);
        if !candidate.exists() {
            return Ok(candidate);
        }

        let extension = extension_of(file_name);
        let stem = &file_name[..file_name.len() - extension.len()];
        (1..=MAX_COLLISION_SUFFIX)
            .map(|n| self.output_dir.join(format!("{} ({}){}", stem, n, extension)))
            .find(|path| !path.exists())
            .ok_or_else(|| DomainError::Export(format!("No free name left for {}", file_name)))
    }
}

impl ExportPort for FsExportAdapter {
    fn export(&self, source: &VideoSource, file_name: &str) -> Result<PathBuf, DomainError> {
        Self::validate_file_name(file_name)?;

        let mut content = source.open()?;
        fs::create_dir_all(&self.output_dir)
            .map_err(|e| DomainError::Export(format!("Failed to create output directory: {}", e)))?;

        // Write next to the target then move into place so readers never see a partial file
        let mut staging = tempfile::Builder::new()
            .prefix(".reel-renamer-")
            .tempfile_in(&self.output_dir)
            .map_err(|e| DomainError::Export(format!("Failed to create temp file: {}", e)))?;
        io::copy(&mut content, &mut staging)
            .and_then(|_| staging.flush())
            .map_err(|e| DomainError::Export(format!("Failed to write {}: {}", file_name, e)))?;

        let target = self.free_path(file_name)?;
        staging
            .persist_noclobber(&target)
            .map_err(|e| DomainError::Export(format!("Failed to save {}: {}", target.display(), e.error)))?;

        tracing::info!("Saved {} as {}", source.name(), target.display());
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn source(bytes: &[u8]) -> VideoSource {
        VideoSource::new("clip.mov", "video/quicktime", bytes.to_vec())
    }

    #[test]
    fn test_export_writes_identical_bytes() {
        let dir = TempDir::new().unwrap();
        let adapter = FsExportAdapter::new(dir.path().join("out"));

        let path = adapter.export(&source(b"original bytes"), "Cat Fails Epic Jump.mov").unwrap();

        assert_eq!(path, dir.path().join("out").join("Cat Fails Epic Jump.mov"));
        assert_eq!(fs::read(&path).unwrap(), b"original bytes");
    }

    #[test]
    fn test_export_never_overwrites() {
        let dir = TempDir::new().unwrap();
        let adapter = FsExportAdapter::new(dir.path());

        let first = adapter.export(&source(b"one"), "Same.mov").unwrap();
        let second = adapter.export(&source(b"two"), "Same.mov").unwrap();
        let third = adapter.export(&source(b"three"), "Same.mov").unwrap();

        assert_eq!(first.file_name().unwrap(), "Same.mov");
        assert_eq!(second.file_name().unwrap(), "Same (1).mov");
        assert_eq!(third.file_name().unwrap(), "Same (2).mov");
        assert_eq!(fs::read(&first).unwrap(), b"one");
    }

    #[test]
    fn test_export_leaves_no_staging_files() {
        let dir = TempDir::new().unwrap();
        let adapter = FsExportAdapter::new(dir.path());
        adapter.export(&source(b"x"), "Only.mov").unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("Only.mov")]);
    }

    #[test]
    fn test_export_streams_file_backed_sources() {
        let dir = TempDir::new().unwrap();
        let original = dir.path().join("clip.mov");
        let content: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        fs::write(&original, &content).unwrap();
        let source = VideoSource::from_file("clip.mov", "video/quicktime", &original, content.len() as u64);

        let adapter = FsExportAdapter::new(dir.path().join("out"));
        let path = adapter.export(&source, "Renamed.mov").unwrap();

        assert_eq!(fs::read(&path).unwrap(), content);
        assert_eq!(fs::read(&original).unwrap(), content);
    }

    #[test]
    fn test_export_of_a_vanished_source_fails_cleanly() {
        let dir = TempDir::new().unwrap();
        let source = VideoSource::from_file("gone.mov", "video/quicktime", dir.path().join("gone.mov"), 3);
        let adapter = FsExportAdapter::new(dir.path().join("out"));

        assert!(adapter.export(&source, "Renamed.mov").is_err());
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_export_rejects_path_like_names() {
        let dir = TempDir::new().unwrap();
        let adapter = FsExportAdapter::new(dir.path());
        assert!(adapter.export(&source(b"x"), "../escape.mov").is_err());
        assert!(adapter.export(&source(b"x"), "  ").is_err());
    }
}
