// Logo interactor - Keeps the user's branding image between sessions

use std::path::Path;
use std::sync::Arc;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// Storage key of the persisted logo
pub const LOGO_KEY: &str = "appLogo";

pub const INVALID_IMAGE_MESSAGE: &str = "Please select a valid image file.";
pub const READ_FAILED_MESSAGE: &str = "Failed to read the selected file.";
pub const SAVE_FAILED_MESSAGE: &str = "Failed to save logo. Local storage might be full.";

/// Interactor for the persisted logo.
///
/// Storage failures never stop the tool: reads fall back to "no logo"
/// and every failure is logged.
pub struct LogoInteractor {
    store: Arc<dyn KeyValuePort>,
    log_port: Arc<dyn LogPort>,
}

impl LogoInteractor {
    pub fn new(store: Arc<dyn KeyValuePort>, log_port: Arc<dyn LogPort>) -> Self {
        Self { store, log_port }
    }

    /// Read an image file and persist it as a data URI
    pub fn set_from_file(&self, path: &Path) -> Result<FrameImage, DomainError> {
        let bytes = std::fs::read(path).map_err(|e| {
            self.log_port
                .error(&format!("Could not read logo {}: {}", path.display(), e));
            DomainError::FsFail(READ_FAILED_MESSAGE.to_string())
        })?;
        self.set_from_bytes(&bytes)
    }

    /// Persist raw image bytes; the format is sniffed from the content
    pub fn set_from_bytes(&self, bytes: &[u8]) -> Result<FrameImage, DomainError> {
        let format = image::guess_format(bytes).map_err(|e| {
            self.log_port.warn(&format!("Rejected logo: {}", e));
            DomainError::BadArgs(INVALID_IMAGE_MESSAGE.to_string())
        })?;

        let logo = FrameImage::from_bytes(format.to_mime_type(), bytes);
        self.store.set(LOGO_KEY, logo.as_uri()).map_err(|e| {
            self.log_port
                .error(&format!("Could not save logo to storage: {}", e));
            DomainError::FsFail(SAVE_FAILED_MESSAGE.to_string())
        })?;

        self.log_port
            .info(&format!("Saved {} logo ({} bytes)", logo.mime_type(), bytes.len()));
        Ok(logo)
    }

    /// The stored logo, or `None` when absent, unreadable or malformed
    pub fn current(&self) -> Option<FrameImage> {
        let stored = match self.store.get(LOGO_KEY) {
            Ok(stored) => stored?,
            Err(e) => {
                self.log_port.error(&format!("Could not load logo: {}", e));
                return None;
            }
        };
        match FrameImage::parse(stored) {
            Ok(logo) => Some(logo),
            Err(e) => {
                self.log_port.warn(&format!("Ignoring stored logo: {}", e));
                None
            }
        }
    }

    /// Forget the stored logo; returns false when removal failed
    pub fn remove(&self) -> bool {
        match self.store.remove(LOGO_KEY) {
            Ok(()) => true,
            Err(e) => {
                self.log_port
                    .error(&format!("Could not remove logo from storage: {}", e));
                false
            }
        }
    }
}
