use std::path::PathBuf;
use std::sync::Arc;

use crate::adapters::{
    AppConfig, FsExportAdapter, GeminiVisionAdapter, JsonKeyValueAdapter, LibavFrameAdapter,
};
use crate::app::{
    logo_interactor::LogoInteractor,
    pipeline::{Capability, PipelineSettings, RenamePipeline},
};
use crate::domain::errors::DomainError;
use crate::ports::{ExportPort, FrameExtractPort, KeyValuePort, LogPort, VisionPort};

pub trait AppContainer {
    /// Fresh pipeline with an empty working set
    fn rename_pipeline(&self) -> RenamePipeline;
    fn logo_interactor(&self) -> Arc<LogoInteractor>;
    fn frame_port(&self) -> Arc<dyn FrameExtractPort>;
    fn config(&self) -> &AppConfig;
}

pub struct DefaultAppContainer {
    config: AppConfig,
    frame_port: Arc<dyn FrameExtractPort>,
    export_port: Arc<dyn ExportPort>,
    log_port: Arc<dyn LogPort>,
    capability: Capability,
    logo_interactor: Arc<LogoInteractor>,
}

impl DefaultAppContainer {
    /// Wire the production adapters. A missing credential does not fail:
    /// it leaves the pipeline disabled with the reason attached.
    pub fn new(config: AppConfig, log_port: Arc<dyn LogPort>) -> Result<Self, DomainError> {
        Self::with_storage(config, log_port, JsonKeyValueAdapter::default_path())
    }

    pub fn with_storage(
        config: AppConfig,
        log_port: Arc<dyn LogPort>,
        storage_path: PathBuf,
    ) -> Result<Self, DomainError> {
        config.validate()?;

        let frame_port: Arc<dyn FrameExtractPort> = Arc::new(LibavFrameAdapter::new(config.jpeg_quality)?);
        let export_port: Arc<dyn ExportPort> = Arc::new(FsExportAdapter::new(config.output_dir.clone()));
        let store: Arc<dyn KeyValuePort> = Arc::new(JsonKeyValueAdapter::new(storage_path));

        let capability = match config.credential() {
            Ok(key) => {
                let vision = GeminiVisionAdapter::new(key, config.base_url.as_str(), config.model.as_str())?;
                Capability::Enabled(Arc::new(vision) as Arc<dyn VisionPort>)
            }
            Err(e) => Capability::Disabled(e.to_string()),
        };

        let logo_interactor = Arc::new(LogoInteractor::new(store, Arc::clone(&log_port)));

        Ok(Self {
            config,
            frame_port,
            export_port,
            log_port,
            capability,
            logo_interactor,
        })
    }
}

impl AppContainer for DefaultAppContainer {
    fn rename_pipeline(&self) -> RenamePipeline {
        RenamePipeline::new(
            Arc::clone(&self.frame_port),
            Arc::clone(&self.export_port),
            Arc::clone(&self.log_port),
            self.capability.clone(),
            PipelineSettings {
                prompt_template: self.config.prompt.clone(),
                frame_at_seconds: self.config.frame_at_seconds,
                auto_download: self.config.auto_download,
            },
        )
    }

    fn logo_interactor(&self) -> Arc<LogoInteractor> {
        Arc::clone(&self.logo_interactor)
    }

    fn frame_port(&self) -> Arc<dyn FrameExtractPort> {
        Arc::clone(&self.frame_port)
    }

    fn config(&self) -> &AppConfig {
        &self.config
    }
}
