// JSON key-value adapter - Small persisted settings in one JSON file

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::errors::*;
use crate::ports::*;

/// Key-value store backed by a JSON object on disk.
///
/// Every call reads the file fresh, so separate processes see each
/// other's writes. A missing file is an empty store.
pub struct JsonKeyValueAdapter {
    path: PathBuf,
}

impl JsonKeyValueAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store file in the per-user config directory
    pub fn default_path() -> PathBuf {
        match dirs::config_dir() {
            Some(dir) => dir.join("reel-renamer").join("storage.json"),
            None => PathBuf::from("reel_renamer_storage.json"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, DomainError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)
            .map_err(|e| DomainError::FsFail(format!("Failed to read {}: {}", self.path.display(), e)))?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content)
            .map_err(|e| DomainError::FsFail(format!("Corrupt store {}: {}", self.path.display(), e)))
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), DomainError> {
        let dir = self
            .path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir)?;

        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| DomainError::InternalError(format!("Failed to serialize store: {}", e)))?;
        let staging = tempfile::NamedTempFile::new_in(dir)?;
        fs::write(staging.path(), json)?;
        staging
            .persist(&self.path)
            .map_err(|e| DomainError::FsFail(format!("Failed to save {}: {}", self.path.display(), e.error)))?;
        Ok(())
    }
}

impl KeyValuePort for JsonKeyValueAdapter {
    fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), DomainError> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), DomainError> {
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonKeyValueAdapter::new(dir.path().join("store.json"));
        assert_eq!(store.get("appLogo").unwrap(), None);
        assert!(store.remove("appLogo").is_ok());
    }

    #[test]
    fn test_set_get_remove() {
        let dir = TempDir::new().unwrap();
        let store = JsonKeyValueAdapter::new(dir.path().join("nested").join("store.json"));

        store.set("appLogo", "data:image/png;base64,AAAA").unwrap();
        store.set("other", "1").unwrap();
        assert_eq!(store.get("appLogo").unwrap().as_deref(), Some("data:image/png;base64,AAAA"));

        store.remove("appLogo").unwrap();
        assert_eq!(store.get("appLogo").unwrap(), None);
        assert_eq!(store.get("other").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn test_values_survive_new_instances() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        JsonKeyValueAdapter::new(&path).set("k", "v").unwrap();
        assert_eq!(JsonKeyValueAdapter::new(&path).get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "{not json").unwrap();
        assert!(JsonKeyValueAdapter::new(&path).get("k").is_err());
    }
}
