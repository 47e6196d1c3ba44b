// Adapters - External system implementations

pub mod frame_libav;
pub mod fs_export;
pub mod fs_intake;
pub mod kv_json;
pub mod toml_config;
pub mod tracing_log;
pub mod vision_gemini;

// Re-export adapters
pub use frame_libav::LibavFrameAdapter;
pub use fs_export::FsExportAdapter;
pub use fs_intake::FsIntakeAdapter;
pub use kv_json::JsonKeyValueAdapter;
pub use toml_config::{AppConfig, TomlConfigAdapter};
pub use tracing_log::TracingLogAdapter;
pub use vision_gemini::GeminiVisionAdapter;
