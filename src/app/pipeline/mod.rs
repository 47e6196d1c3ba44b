// Rename pipeline - Drives records from intake through analysis to export

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::ports::*;

/// Shown when a bulk analyze finds nothing to do
pub const NOTHING_TO_ANALYZE: &str = "No files selected or all selected files already analyzed/failed.";
/// Shown when a bulk download finds nothing to do
pub const NOTHING_TO_DOWNLOAD: &str = "No analyzed files selected with suggested names to rename.";
/// Record message while the frame is extracted
pub const EXTRACTING_LABEL: &str = "Extracting frame...";
/// Record message while the model is prompted
pub const PROMPTING_LABEL: &str = "Brainstorming title...";
/// Failure reason when exporting a record without a name
pub const NO_NAME_MESSAGE: &str = "No name to download with.";
/// Record message after a failed export
pub const DOWNLOAD_FAILED_MESSAGE: &str = "Error during download.";

/// Whether the analyze and rename actions are available
#[derive(Clone)]
pub enum Capability {
    Enabled(Arc<dyn VisionPort>),
    /// Disabled until the configuration is fixed, with the reason to show
    Disabled(String),
}

impl Capability {
    pub fn is_enabled(&self) -> bool {
        matches!(self, Capability::Enabled(_))
    }
}

impl std::fmt::Debug for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::Enabled(_) => f.write_str("Enabled"),
            Capability::Disabled(reason) => f.debug_tuple("Disabled").field(reason).finish(),
        }
    }
}

/// Knobs the pipeline reads on every analysis
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Prompt with a `{name}` placeholder for the original file name
    pub prompt_template: String,
    /// Capture time; `None` takes the middle of the video
    pub frame_at_seconds: Option<f64>,
    /// Export each record as soon as its analysis succeeds
    pub auto_download: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            prompt_template: DEFAULT_PROMPT.to_string(),
            frame_at_seconds: None,
            auto_download: false,
        }
    }
}

/// What happened to an intake batch
#[derive(Debug, Clone, Default, Serialize)]
pub struct IntakeReport {
    pub accepted: Vec<FileId>,
    pub skipped_non_video: Vec<String>,
    pub skipped_duplicates: Vec<String>,
}

/// Outcome of a bulk analyze
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalyzeSummary {
    /// Records that ended analysis without error
    pub analyzed: Vec<FileId>,
    /// Records left in Error, by analysis or by a failed auto-download
    pub failed: Vec<FileId>,
    /// Records exported right after analysis (auto-download)
    pub exported: Vec<FileId>,
}

/// Outcome of a bulk download
#[derive(Debug, Clone, Default, Serialize)]
pub struct DownloadSummary {
    pub exported: Vec<(FileId, PathBuf)>,
    pub failed: Vec<FileId>,
}

/// Owns the working set and runs every state transition on it.
///
/// Bulk operations take `&mut self`, so nothing else can touch the
/// records while one is in flight. Files are processed one at a time.
pub struct RenamePipeline {
    records: Vec<FileRecord>,
    frame_port: Arc<dyn FrameExtractPort>,
    export_port: Arc<dyn ExportPort>,
    log_port: Arc<dyn LogPort>,
    capability: Capability,
    settings: PipelineSettings,
    observers: Vec<Arc<dyn PipelineObserver>>,
    global_error: Option<String>,
}

impl RenamePipeline {
    /// Create new pipeline with injected ports
    pub fn new(
        frame_port: Arc<dyn FrameExtractPort>,
        export_port: Arc<dyn ExportPort>,
        log_port: Arc<dyn LogPort>,
        capability: Capability,
        settings: PipelineSettings,
    ) -> Self {
        if let Capability::Disabled(reason) = &capability {
            log_port.warn(reason);
        }
        Self {
            records: Vec::new(),
            frame_port,
            export_port,
            log_port,
            capability,
            settings,
            observers: Vec::new(),
            global_error: None,
        }
    }

    /// Register an observer notified after every record change
    pub fn add_observer(&mut self, observer: Arc<dyn PipelineObserver>) {
        self.observers.push(observer);
    }

    /// Accept new sources into the working set.
    ///
    /// Non-video sources and names already present (or repeated within the
    /// batch) are dropped. New records start pending and selected.
    pub fn intake(&mut self, batch: Vec<VideoSource>) -> IntakeReport {
        self.global_error = None;

        let mut report = IntakeReport::default();
        let mut known: HashSet<String> = self.records.iter().map(|r| r.original_name.clone()).collect();

        for source in batch {
            if !source.is_video() {
                self.log_port
                    .debug(&format!("Ignoring {} ({})", source.name(), source.content_type()));
                report.skipped_non_video.push(source.name().to_string());
                continue;
            }
            if !known.insert(source.name().to_string()) {
                self.log_port.debug(&format!("Ignoring duplicate {}", source.name()));
                report.skipped_duplicates.push(source.name().to_string());
                continue;
            }

            let record = FileRecord::new(source);
            report.accepted.push(record.id);
            self.notify(&record);
            self.records.push(record);
        }

        self.log_port.info(&format!(
            "Accepted {} file(s), skipped {} non-video and {} duplicate(s)",
            report.accepted.len(),
            report.skipped_non_video.len(),
            report.skipped_duplicates.len()
        ));
        report
    }

    /// Analyze every selected record that is neither analyzed nor failed.
    ///
    /// Per-file failures land on the record and never stop the loop.
    pub async fn analyze_selected(&mut self) -> Result<AnalyzeSummary, DomainError> {
        let vision = self.vision()?;

        let eligible: Vec<FileId> = self
            .records
            .iter()
            .filter(|r| is_eligible_for_analysis(r))
            .map(|r| r.id)
            .collect();
        if eligible.is_empty() {
            return Err(self.nothing_eligible(NOTHING_TO_ANALYZE));
        }

        self.global_error = None;
        self.log_port
            .info(&format!("Analyzing {} selected file(s)", eligible.len()));

        let mut summary = AnalyzeSummary::default();
        for id in eligible {
            if self.position(id).is_none() {
                self.log_port.debug(&format!("Record {} is gone, skipping", id));
                continue;
            }
            match self.analyze_record(id, vision.as_ref()).await {
                Ok(()) if !self.settings.auto_download => summary.analyzed.push(id),
                // A failed auto-download leaves the record in Error
                Ok(()) => match self.download(id) {
                    Ok(_) => {
                        summary.analyzed.push(id);
                        summary.exported.push(id);
                    }
                    Err(_) => summary.failed.push(id),
                },
                Err(_) => summary.failed.push(id),
            }
        }

        self.log_port.info(&format!(
            "Analysis finished: {} succeeded, {} failed",
            summary.analyzed.len(),
            summary.failed.len()
        ));
        Ok(summary)
    }

    /// Run analysis again for one record, whatever its selection.
    ///
    /// This is the only way out of `Error` back into analysis.
    pub async fn retry(&mut self, id: FileId) -> Result<(), DomainError> {
        let vision = self.vision()?;
        let record = self.record(id)?;
        if !is_retryable(record) {
            return Err(DomainError::BadArgs(format!(
                "{} is already being analyzed",
                record.original_name
            )));
        }

        self.log_port.info(&format!("Retrying {}", record.original_name));
        self.analyze_record(id, vision.as_ref()).await?;
        if self.settings.auto_download {
            self.download(id)?;
        }
        Ok(())
    }

    /// Export every selected, analyzed record that has a name
    pub fn download_selected(&mut self) -> Result<DownloadSummary, DomainError> {
        self.vision()?;

        let eligible: Vec<FileId> = self
            .records
            .iter()
            .filter(|r| is_eligible_for_download(r))
            .map(|r| r.id)
            .collect();
        if eligible.is_empty() {
            return Err(self.nothing_eligible(NOTHING_TO_DOWNLOAD));
        }

        self.global_error = None;
        let mut summary = DownloadSummary::default();
        for id in eligible {
            match self.download(id) {
                Ok(path) => summary.exported.push((id, path)),
                Err(_) => summary.failed.push(id),
            }
        }
        Ok(summary)
    }

    /// Export one record's original bytes under its sanitized suggested name
    pub fn download(&mut self, id: FileId) -> Result<PathBuf, DomainError> {
        let record = self.record(id)?;
        let source = record.source.clone();
        let original_name = record.original_name.clone();
        let suggested_name = record.suggested_name.clone();

        if suggested_name.trim().is_empty() {
            self.log_port
                .error(&format!("Download called for {} with no suggested name", original_name));
            self.update(id, |r| r.fail(NO_NAME_MESSAGE))?;
            return Err(DomainError::Export(NO_NAME_MESSAGE.to_string()));
        }

        let file_name = sanitize_filename(&suggested_name, extension_of(&original_name));
        match self.export_port.export(&source, &file_name) {
            Ok(path) => {
                self.log_port
                    .info(&format!("Renamed {} to {}", original_name, path.display()));
                let exported_to = path.clone();
                self.update(id, move |r| {
                    r.transition(FileStatus::Renamed, Some(PROGRESS_DONE), None);
                    r.exported_to = Some(exported_to);
                })?;
                Ok(path)
            }
            Err(e) => {
                self.log_port
                    .error(&format!("Error renaming file {}: {}", original_name, e));
                self.update(id, |r| {
                    r.transition(FileStatus::Error, Some(0), Some(DOWNLOAD_FAILED_MESSAGE.to_string()))
                })?;
                Err(e)
            }
        }
    }

    pub fn toggle_selection(&mut self, id: FileId) -> Result<bool, DomainError> {
        let selected = !self.record(id)?.is_selected;
        self.set_selected(id, selected)?;
        Ok(selected)
    }

    /// Deselect everything when all records are selected, otherwise select everything
    pub fn toggle_select_all(&mut self) -> bool {
        let select = !self.records.iter().all(|r| r.is_selected);
        let ids: Vec<FileId> = self.records.iter().map(|r| r.id).collect();
        for id in ids {
            // ids come from the working set, so the lookup cannot fail
            let _ = self.set_selected(id, select);
        }
        select
    }

    pub fn set_selected(&mut self, id: FileId, selected: bool) -> Result<(), DomainError> {
        self.update(id, |r| r.is_selected = selected)
    }

    /// Replace a record's suggested name; the status is left alone
    pub fn set_suggested_name(&mut self, id: FileId, name: impl Into<String>) -> Result<(), DomainError> {
        let name = name.into();
        self.update(id, move |r| r.suggested_name = name)
    }

    pub fn remove(&mut self, id: FileId) -> Result<FileRecord, DomainError> {
        let index = self.position(id).ok_or(DomainError::UnknownRecord(id))?;
        let record = self.records.remove(index);
        for observer in &self.observers {
            observer.record_removed(id);
        }
        Ok(record)
    }

    /// Drop the whole working set and any global error
    pub fn clear_all(&mut self) {
        for record in self.records.drain(..) {
            for observer in &self.observers {
                observer.record_removed(record.id);
            }
        }
        self.global_error = None;
    }

    pub fn set_auto_download(&mut self, enabled: bool) {
        self.settings.auto_download = enabled;
    }

    pub fn auto_download(&self) -> bool {
        self.settings.auto_download
    }

    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    pub fn record(&self, id: FileId) -> Result<&FileRecord, DomainError> {
        self.records
            .iter()
            .find(|r| r.id == id)
            .ok_or(DomainError::UnknownRecord(id))
    }

    /// Look a record up by its original file name
    pub fn find_by_name(&self, original_name: &str) -> Option<&FileRecord> {
        self.records.iter().find(|r| r.original_name == original_name)
    }

    pub fn selected_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_selected).count()
    }

    /// Last transient error from a bulk action, cleared by the next intake or bulk run
    pub fn global_error(&self) -> Option<&str> {
        self.global_error.as_deref()
    }

    /// Why analysis is unavailable, if it is
    pub fn configuration_error(&self) -> Option<&str> {
        match &self.capability {
            Capability::Enabled(_) => None,
            Capability::Disabled(reason) => Some(reason),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.capability.is_enabled()
    }

    async fn analyze_record(&mut self, id: FileId, vision: &dyn VisionPort) -> Result<(), DomainError> {
        let record = self.record(id)?;
        let source = record.source.clone();
        let prompt = build_prompt(&self.settings.prompt_template, &record.original_name);

        self.update(id, |r| r.transition(FileStatus::Analyzing, Some(PROGRESS_STARTED), None))?;
        self.update(id, |r| {
            r.transition(
                FileStatus::Analyzing,
                Some(PROGRESS_EXTRACTING),
                Some(EXTRACTING_LABEL.to_string()),
            )
        })?;

        let frame = match self
            .frame_port
            .extract_frame(&source, self.settings.frame_at_seconds)
            .await
        {
            Ok(frame) => frame,
            Err(e) => return self.settle(id, Err(e.into())),
        };

        self.update(id, |r| {
            r.transition(
                FileStatus::Analyzing,
                Some(PROGRESS_PROMPTING),
                Some(PROMPTING_LABEL.to_string()),
            )
        })?;

        let reply = vision.describe_frame(&frame, &prompt).await.map_err(DomainError::from);
        self.settle(id, reply)
    }

    /// Record the analysis outcome on the record
    fn settle(&mut self, id: FileId, outcome: Result<String, DomainError>) -> Result<(), DomainError> {
        match outcome {
            Ok(title) => {
                self.log_port.debug(&format!("Suggested title for {}: {}", id, title));
                self.update(id, move |r| r.transition(FileStatus::Analyzed, Some(PROGRESS_DONE), Some(title)))
            }
            Err(e) => {
                let name = self.record(id).map(|r| r.original_name.clone()).unwrap_or_default();
                self.log_port.error(&format!("Error analyzing file {}: {}", name, e));
                self.update(id, |r| r.fail(&e))?;
                Err(e)
            }
        }
    }

    fn vision(&self) -> Result<Arc<dyn VisionPort>, DomainError> {
        match &self.capability {
            Capability::Enabled(vision) => Ok(Arc::clone(vision)),
            Capability::Disabled(reason) => Err(DomainError::Configuration(reason.clone())),
        }
    }

    fn nothing_eligible(&mut self, message: &str) -> DomainError {
        self.log_port.warn(message);
        self.global_error = Some(message.to_string());
        DomainError::NothingEligible(message.to_string())
    }

    fn position(&self, id: FileId) -> Option<usize> {
        self.records.iter().position(|r| r.id == id)
    }

    fn update<F>(&mut self, id: FileId, apply: F) -> Result<(), DomainError>
    where
        F: FnOnce(&mut FileRecord),
    {
        let record = self
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(DomainError::UnknownRecord(id))?;
        apply(record);
        for observer in &self.observers {
            observer.record_changed(record);
        }
        Ok(())
    }

    fn notify(&self, record: &FileRecord) {
        for observer in &self.observers {
            observer.record_changed(record);
        }
    }
}
