// Application layer - Use case interactors

pub mod container;
pub mod logo_interactor;
pub mod pipeline;

// Re-export interactors
pub use container::{AppContainer, DefaultAppContainer};
pub use logo_interactor::LogoInteractor;
pub use pipeline::{Capability, PipelineSettings, RenamePipeline};
